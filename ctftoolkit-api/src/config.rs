/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. A `.env` file in the working directory,
/// if present, overrides the process environment.
///
/// # Environment Variables
///
/// - `HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8080)
/// - `MONGO_URI`: MongoDB connection string (default: mongodb://localhost:27017/ctf_toolkit)
/// - `MONGO_DATABASE`: Database name (default: ctf_toolkit)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `UPLOAD_PATH`: Scratch and artifact directory (default: ./uploads)
/// - `SCRIPTS_DIR`: Root of the external tool scripts (default: scripts)
/// - `PYTHON_BIN`: Interpreter used to run the scripts (default: python3)
/// - `TOOL_TIMEOUT_SECS`: Per-invocation timeout (default: none)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `MAX_BODY_BYTES`: Request body limit (default: 104857600)
/// - `RUST_LOG`: Log level (default: ctftoolkit_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use ctftoolkit_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder secrets shipped in sample environment files
const PLACEHOLDER_SECRETS: &[&str] = &[
    "your-super-secret-jwt-key-change-in-production",
    "your-secret-key-change-in-production",
];

const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// External tool configuration
    pub tools: ToolsConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,

    /// Database name
    pub name: String,
}

/// JWT configuration
///
/// The secret is never serialized and is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Interpreter executable
    pub python_bin: String,

    /// Directory holding the tool scripts
    pub scripts_dir: PathBuf,

    /// Directory for uploads and generated artifacts
    pub upload_dir: PathBuf,

    /// Per-invocation timeout in seconds; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing, shorter than 32 characters, or a placeholder
    /// - A numeric variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // .env values win over the process environment
        dotenvy::dotenv_override().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = get_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let max_body_bytes = get_or("MAX_BODY_BYTES", "104857600")
            .parse::<usize>()
            .context("MAX_BODY_BYTES must be a byte count")?;

        let timeout_secs = get("TOOL_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("TOOL_TIMEOUT_SECS must be a number of seconds")?;

        let cors_origins = get_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        validate_secret(&jwt_secret)?;

        Ok(Self {
            api: ApiConfig {
                host: get_or("HOST", "0.0.0.0"),
                port,
                cors_origins,
                max_body_bytes,
            },
            database: DatabaseConfig {
                uri: get_or("MONGO_URI", "mongodb://localhost:27017/ctf_toolkit"),
                name: get_or("MONGO_DATABASE", "ctf_toolkit"),
            },
            jwt: JwtConfig { secret: jwt_secret },
            tools: ToolsConfig {
                python_bin: get_or("PYTHON_BIN", "python3"),
                scripts_dir: PathBuf::from(get_or("SCRIPTS_DIR", "scripts")),
                upload_dir: PathBuf::from(get_or("UPLOAD_PATH", "./uploads")),
                timeout_secs,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn validate_secret(secret: &str) -> anyhow::Result<()> {
    if PLACEHOLDER_SECRETS.contains(&secret) {
        anyhow::bail!("JWT_SECRET is still set to the sample placeholder value");
    }
    if secret.len() < MIN_SECRET_LEN {
        anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.api.max_body_bytes, 100 * 1024 * 1024);
        assert_eq!(config.database.uri, "mongodb://localhost:27017/ctf_toolkit");
        assert_eq!(config.database.name, "ctf_toolkit");
        assert_eq!(config.tools.python_bin, "python3");
        assert_eq!(config.tools.scripts_dir, PathBuf::from("scripts"));
        assert_eq!(config.tools.upload_dir, PathBuf::from("./uploads"));
        assert!(config.tools.timeout().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", SECRET),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("TOOL_TIMEOUT_SECS", "45"),
            ("UPLOAD_PATH", "/tmp/ctf"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.api.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.tools.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.tools.upload_dir, PathBuf::from("/tmp/ctf"));
    }

    #[test]
    fn test_secret_not_exposed() {
        let config = config_from(&[("JWT_SECRET", SECRET)]).unwrap();

        let serialized = serde_json::to_string(&config).unwrap();
        assert!(!serialized.contains(SECRET));
        assert!(!format!("{:?}", config).contains(SECRET));
        assert_eq!(config.jwt.secret, SECRET);
    }

    #[test]
    fn test_missing_secret() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_secret() {
        let err = config_from(&[("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for placeholder in PLACEHOLDER_SECRETS {
            assert!(config_from(&[("JWT_SECRET", placeholder)]).is_err());
        }
    }

    #[test]
    fn test_invalid_port() {
        assert!(config_from(&[("JWT_SECRET", SECRET), ("PORT", "http")]).is_err());
        assert!(config_from(&[("JWT_SECRET", SECRET), ("TOOL_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = config_from(&[("JWT_SECRET", SECRET), ("PORT", ""), ("HOST", " ")]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
