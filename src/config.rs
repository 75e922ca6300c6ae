//! Configuration
//!
//! CLI arguments with environment variable fallbacks (clap). A `.env` file
//! is loaded by `main` before parsing.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Listing moderation service
#[derive(Parser, Debug, Clone)]
#[command(name = "listing-moderation")]
#[command(about = "Listing text screening and report escalation service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Development mode: falls back to the in-memory store and log
    /// notifications when MongoDB or NATS are unreachable
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "listings")]
    pub mongodb_db: String,

    /// NATS configuration
    #[command(flatten)]
    pub nats: NatsArgs,

    /// Where admin report notifications are delivered
    #[arg(long, env = "NOTIFIER", value_enum, default_value_t = NotifierKind::Log)]
    pub notifier: NotifierKind,

    /// JSON file replacing the built-in prohibited term list
    #[arg(long, env = "TERMS_FILE")]
    pub terms_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

/// NATS connection configuration
#[derive(Parser, Debug, Clone)]
pub struct NatsArgs {
    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    #[arg(long, env = "NATS_USER")]
    pub nats_user: Option<String>,

    #[arg(long, env = "NATS_PASSWORD")]
    pub nats_password: Option<String>,
}

/// Admin notification backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    /// Write events to the service log
    Log,
    /// Insert into the MongoDB notifications collection
    Mongo,
    /// Publish on NATS
    Nats,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        if self.nats.nats_user.is_some() != self.nats.nats_password.is_some() {
            return Err("NATS_USER and NATS_PASSWORD must be set together".to_string());
        }

        if let Some(ref path) = self.terms_file {
            if !path.is_file() {
                return Err(format!("TERMS_FILE {} does not exist", path.display()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["listing-moderation"]).unwrap();
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.notifier, NotifierKind::Log);
        assert!(!args.dev_mode);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_notifier_flag() {
        let args =
            Args::try_parse_from(["listing-moderation", "--notifier", "nats", "--dev-mode"]).unwrap();
        assert_eq!(args.notifier, NotifierKind::Nats);
        assert!(args.dev_mode);
    }

    #[test]
    fn test_validate_nats_credentials_pairing() {
        let args =
            Args::try_parse_from(["listing-moderation", "--nats-user", "admin"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_missing_terms_file() {
        let args = Args::try_parse_from([
            "listing-moderation",
            "--terms-file",
            "/nonexistent/terms.json",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }
}
