//! CLI argument parsing, validation, and startup helpers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::ServerConfig;
use crate::db::Database;
use crate::metrics::HitCounter;
use clap::Parser;
use tracing::{error, info, warn};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment platform. Destructive admin endpoints only run on `Dev`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    Dev,
    #[default]
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirpy", about = "Short message feed with token sessions")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DB_PATH", default_value = "chirpy.db")]
    pub database: String,

    /// Deployment platform; `dev` enables POST /admin/reset
    #[arg(long, env = "PLATFORM", value_enum, default_value = "production")]
    pub platform: Platform,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// API key expected from the Polka webhook
    #[arg(long, env = "POLKA_KEY", hide_env_values = true)]
    pub polka_key: String,

    /// Directory served under /app
    #[arg(long, env = "ASSETS_DIR", default_value = ".")]
    pub assets_dir: PathBuf,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    check_secret_length(secret)
}

fn check_secret_length(secret: String) -> Option<String> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }
    Some(secret)
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
/// Returns None and logs an error if a value is unusable.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    polka_key: String,
    platform: Platform,
    assets_dir: PathBuf,
) -> Option<ServerConfig> {
    let polka_key = polka_key.trim();
    if polka_key.is_empty() {
        error!("POLKA_KEY must not be empty");
        return None;
    }

    if !assets_dir.is_dir() {
        warn!(path = %assets_dir.display(), "Assets directory does not exist, /app will return 404");
    }

    if platform == Platform::Dev {
        warn!("Running on dev platform, POST /admin/reset is enabled");
    }

    Some(ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        polka_key: Arc::from(polka_key),
        platform,
        assets_dir,
        hits: Arc::new(HitCounter::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["chirpy", "--polka-key", "k"]).unwrap();
        assert_eq!(args.platform, Platform::Production);
        assert_eq!(args.assets_dir, PathBuf::from("."));
        assert_eq!(args.polka_key, "k");
    }

    #[test]
    fn test_parse_platform() {
        let args =
            Args::try_parse_from(["chirpy", "--polka-key", "k", "--platform", "dev"]).unwrap();
        assert_eq!(args.platform, Platform::Dev);

        assert!(
            Args::try_parse_from(["chirpy", "--polka-key", "k", "--platform", "staging"]).is_err()
        );
    }

    #[test]
    fn test_secret_length() {
        assert!(check_secret_length("short".to_string()).is_none());
        assert!(check_secret_length("a".repeat(MIN_JWT_SECRET_LENGTH)).is_some());
    }

    #[tokio::test]
    async fn test_build_config_rejects_empty_polka_key() {
        let db = Database::open(":memory:").await.unwrap();
        let secret = "a".repeat(MIN_JWT_SECRET_LENGTH);

        assert!(
            build_config(db.clone(), secret.clone(), "  ".into(), Platform::Dev, ".".into())
                .is_none()
        );

        let config = build_config(db, secret, "key".into(), Platform::Dev, ".".into()).unwrap();
        assert_eq!(&*config.polka_key, "key");
        assert_eq!(config.hits.get(), 0);
    }
}
