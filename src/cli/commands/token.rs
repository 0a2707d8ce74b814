use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, validate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::{Role, User};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a signed token for a user (uses JWT_SECRET)")]
    Mint {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Role, e.g. CREATOR or ADMIN")]
        role: String,
        #[arg(long, help = "User id (random when omitted)")]
        id: Option<Uuid>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and print its user")]
    Inspect {
        #[arg(help = "Token to verify")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    match cmd {
        TokenCommands::Mint { name, role, id, hours } => {
            let user = User {
                id: id.unwrap_or_else(Uuid::new_v4),
                name,
                role: Role::parse(&role),
            };
            let claims = Claims::new(&user, hours.unwrap_or(security.jwt_expiry_hours)).context("failed to mint token")?;
            let token = generate_jwt(&claims, &security.jwt_secret).context("failed to mint token")?;

            match output_format {
                OutputFormat::Json => println!("{}", json!({ "token": token, "user": user })),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
        TokenCommands::Inspect { token } => {
            let user = validate_jwt(&token, &security.jwt_secret)
                .context("token rejected")?
                .into_user();

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                OutputFormat::Text => println!("{} ({}) role={}", user.name, user.id, user.role),
            }
            Ok(())
        }
    }
}
