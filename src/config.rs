use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemitConfig {
    pub node: NodeConfig,
    pub watcher: WatcherConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NodeConfig {
    pub rpc_url: String,
    pub contract_address: String,
    pub log_level: String,
    /// Origin embedded in QR deep links (send?username=...)
    #[serde(default = "default_origin")]
    pub app_origin: String,
}

fn default_origin() -> String {
    "https://remitpay.app".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    /// Vault balance poll cadence. The contract events still trigger extra
    /// reads in between; redundant reads are idempotent.
    pub poll_interval_secs: u64,
    /// Cadence of the background log scan feeding vault event subscribers.
    pub event_poll_ms: u64,
}

impl Default for RemitConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig {
                rpc_url: "http://localhost:8545".to_string(),
                contract_address: "0x7260b6470ea9ea1e089c6fb0c1c9eed2b0ed5eff".to_string(),
                log_level: "info".to_string(),
                app_origin: default_origin(),
            },
            watcher: WatcherConfig {
                poll_interval_secs: 10,
                event_poll_ms: 2000,
            },
        }
    }
}

impl RemitConfig {
    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => {
                        tracing::info!("Config loaded from {}", path);
                        c
                    }
                    Err(e) => {
                        eprintln!("Error parsing config: {}. Using Defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading config: {}. Using Defaults.", e);
                    Self::default()
                }
            }
        } else {
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }
}
