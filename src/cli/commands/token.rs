use anyhow::Context;
use chrono::Utc;
use clap::Args;
use serde_json::json;

use crate::auth::{ttl_from_hours, JwtKeys};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (sub claim) to embed in the token")]
    pub subject: String,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let keys = JwtKeys::new(&config.security.jwt_secret, hours).context("invalid JWT configuration")?;
    let token = keys.issue(&args.subject).context("failed to sign token")?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => {
            let expires_at = Utc::now().checked_add_signed(ttl_from_hours(hours)?);
            println!(
                "{}",
                json!({
                    "token": token,
                    "subject": args.subject,
                    "expires_at": expires_at,
                })
            );
        }
    }
    Ok(())
}
