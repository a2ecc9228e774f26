use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::ContentStore;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an admin account if it does not exist (SQLite)")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (defaults to ADMIN_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Replace an admin's password (SQLite)")]
    SetPassword {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "New password")]
        password: String,
    },

    #[command(about = "Check whether an identity is in the admin allow-list")]
    Check {
        #[arg(help = "Username, or email for Appwrite")]
        username: String,
    },
}

pub async fn handle(
    cmd: AdminCommands,
    store: &dyn ContentStore,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { username, password } => {
            if store.backend() == StoreBackend::Appwrite {
                bail!("Appwrite admins are created on their first successful login");
            }

            let password = password.unwrap_or_else(|| config.security.admin_password.clone());
            if password.is_empty() {
                bail!("Password must not be empty");
            }

            let created = store.ensure_admin(&username, &password).await?;
            let message = if created {
                format!("Admin '{}' created", username)
            } else {
                format!("Admin '{}' already exists", username)
            };
            output_success(
                &output_format,
                &message,
                Some(json!({ "username": username, "created": created })),
            )
        }
        AdminCommands::SetPassword { username, password } => {
            if password.is_empty() {
                bail!("Password must not be empty");
            }

            store.set_admin_password(&username, &password).await?;
            output_success(
                &output_format,
                &format!("Password updated for admin '{}'", username),
                Some(json!({ "username": username })),
            )
        }
        AdminCommands::Check { username } => match store.find_admin(&username).await? {
            Some(admin) => output_success(
                &output_format,
                &format!("'{}' is an admin", admin.username),
                Some(json!({ "admin": admin })),
            ),
            None => {
                output_error(&output_format, &format!("'{}' is not in the admin allow-list", username))?;
                bail!("not an admin: {}", username)
            }
        },
    }
}
