use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::Database;
use crate::observer::ObserverPipeline;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user (and its profile)")]
    Create {
        #[arg(long, help = "Login name")]
        username: String,
        #[arg(long, help = "Initial password")]
        password: String,
        #[arg(long, help = "Grant administrator rights")]
        admin: bool,
    },

    #[command(about = "Grant administrator rights to an existing user")]
    Promote {
        #[arg(help = "Login name")]
        username: String,
    },
}

pub async fn handle(
    cmd: UserCommands,
    db: &Database,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let observers = Arc::new(ObserverPipeline::with_defaults(&config.media));
    let users = UserService::new(db.clone(), observers);

    match cmd {
        UserCommands::Create {
            username,
            password,
            admin,
        } => {
            let user = users.create_user(&username, &password, admin).await?;
            output_success(
                output_format,
                &format!("Created user {}", user.username),
                Some(describe(&user)),
            )
        }
        UserCommands::Promote { username } => {
            let user = users.promote(&username).await?;
            output_success(
                output_format,
                &format!("{} is now an administrator", user.username),
                Some(describe(&user)),
            )
        }
    }
}

fn describe(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "is_staff": user.is_staff,
    })
}
