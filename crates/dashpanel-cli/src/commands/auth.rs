use clap::Subcommand;
use dashpanel_core::storage::credentials;

use super::CmdResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store an API token in the system keyring
    Login {
        /// Auth token with broadcast and integration scopes
        #[arg(long)]
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Show where the active token comes from
    Status,
}

pub fn run(action: AuthAction) -> CmdResult {
    match action {
        AuthAction::Login { token } => {
            if token.trim().is_empty() {
                return Err("token must not be empty".into());
            }
            credentials::store_api_token(token.trim())?;
            println!("token stored");
        }
        AuthAction::Logout => {
            credentials::clear_api_token()?;
            println!("token removed");
        }
        AuthAction::Status => {
            if std::env::var(credentials::TOKEN_ENV).is_ok_and(|t| !t.is_empty()) {
                println!("authenticated (from {})", credentials::TOKEN_ENV);
            } else if credentials::api_token().is_some() {
                println!("authenticated (keyring)");
            } else {
                println!("not authenticated");
            }
        }
    }
    Ok(())
}
