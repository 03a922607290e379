use crate::config::RemitConfig;
use crate::receive;
use crate::registration;
use crate::session::Session;
use crate::types::truncate_address;
use crate::units::format_ether;

pub async fn handle_register_command(session: &mut Session, username: String, phone: String) {
    if let Some(profile) = session.profile() {
        println!("Already registered as @{}", profile.username);
        return;
    }

    println!("Registering @{}...", username.trim());
    match registration::register(session, &username, &phone).await {
        Ok(()) => {
            println!("Registration confirmed.");
            if let Some(profile) = session.profile() {
                println!("  Username: @{}", profile.username);
                println!("  Phone:    {}", profile.phone_number);
            }
        }
        Err(e) => {
            println!("{}", e);
        }
    }
}

pub async fn handle_dashboard_command(session: &Session) {
    let Some(account) = session.account() else {
        println!("Not connected.");
        return;
    };

    println!("Wallet: {}", truncate_address(account));
    match session.provider().get_balance(account).await {
        Ok(wei) => println!("Balance: {} ETH", format_ether(wei)),
        Err(e) => println!("Balance: unavailable ({})", e),
    }

    match session.profile() {
        Some(profile) => {
            println!("Username: @{}", profile.username);
            println!("Phone:    {}", profile.phone_number);
        }
        None => {
            println!("No profile registered yet. Run `remitpay register` to claim a username.");
        }
    }
}

pub fn handle_receive_command(session: &Session, config: &RemitConfig, save: bool) {
    let Some(profile) = session.profile() else {
        println!("Register a username first; the payment link is built from it.");
        return;
    };

    let link = receive::deep_link(&config.node.app_origin, &profile.username);
    println!("Share this link to get paid:");
    println!("  {}", link);
    println!();

    match receive::qr_unicode(&link) {
        Ok(qr) => println!("{}", qr),
        Err(e) => println!("Could not render QR code: {}", e),
    }

    if save {
        match receive::save_qr_svg(&link, &profile.username) {
            Ok(path) => println!("QR code written to {}", path),
            Err(e) => println!("Could not save QR code: {}", e),
        }
    }
}
