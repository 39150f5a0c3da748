//! Configuration module
//!
//! Environment-driven configuration for the API. Loaded once at startup,
//! validated before anything binds a port or touches storage.

use std::env;

/// Storage backend selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub session_cookie_name: String,
    // External APIs
    pub identity_api_url: String,
    pub email_api_url: String,
    pub email_api_key: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Generated document spool
    pub spool_dir: String,
    // Upload limits
    pub max_upload_files: usize,
    pub max_file_size_bytes: usize,
    // Notification recipients (role addresses)
    pub finance_email: String,
    pub board_email: String,
    pub sports_club_email: String,
}

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_UPLOAD_FILES: usize = 5;
const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;
const DEFAULT_SESSION_COOKIE: &str = "session";
const DEFAULT_SPOOL_DIR: &str = "spool";

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            "local" => StorageBackend::Local,
            other => {
                return Err(anyhow::anyhow!(
                    "STORAGE_BACKEND must be 's3' or 'local', got '{}'",
                    other
                ))
            }
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string()),
            identity_api_url: env::var("IDENTITY_API_URL")
                .map_err(|_| anyhow::anyhow!("IDENTITY_API_URL must be set"))?,
            email_api_url: env::var("EMAIL_API_URL")
                .map_err(|_| anyhow::anyhow!("EMAIL_API_URL must be set"))?,
            email_api_key: env::var("EMAIL_API_KEY")
                .map_err(|_| anyhow::anyhow!("EMAIL_API_KEY must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok().or(env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            spool_dir: env::var("SPOOL_DIR").unwrap_or_else(|_| DEFAULT_SPOOL_DIR.to_string()),
            max_upload_files: env::var("MAX_UPLOAD_FILES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_FILES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_FILES),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            finance_email: env::var("FINANCE_EMAIL")
                .unwrap_or_else(|_| "finansminister@tihlde.org".to_string()),
            board_email: env::var("BOARD_EMAIL").unwrap_or_else(|_| "hs@tihlde.org".to_string()),
            sports_club_email: env::var("SPORTS_CLUB_EMAIL")
                .unwrap_or_else(|_| "lederidkom@tihlde.org".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.max_upload_files == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_FILES must be at least 1"));
        }

        Ok(())
    }
}
