use clap::Parser;

use remitpay::cli::{self, Cli, Commands};
use remitpay::config::RemitConfig;
use remitpay::interactive;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let config = RemitConfig::load_or_default(&args.config);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.node.log_level)),
        )
        .init();

    let Some(command) = args.command else {
        // No subcommand: drop into the menu-driven client.
        interactive::start(config).await;
        return;
    };

    let (mut session, _provider) = cli::build_session(&config);
    if !cli::connect_or_exit(&mut session).await {
        return;
    }

    match command {
        Commands::Register { username, phone } => {
            cli::user::handle_register_command(&mut session, username, phone).await;
        }
        Commands::Send { to, amount } => {
            cli::tx::handle_send_command(&session, to, amount).await;
        }
        Commands::Receive { save } => {
            cli::user::handle_receive_command(&session, &config, save);
        }
        Commands::Dashboard => {
            cli::user::handle_dashboard_command(&session).await;
        }
        Commands::History {
            filter,
            sort_by,
            order,
        } => {
            cli::tx::handle_history_command(&session, filter, sort_by, order).await;
        }
        Commands::Vault { cmd } => {
            cli::ops::handle_vault_command(&session, &config, cmd).await;
        }
    }
}
