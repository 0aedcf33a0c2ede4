use clap::Parser;
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that overrides any configured session secret.
pub const SECRET_ENV_VAR: &str = "QUILL_SESSION_SECRET";

const SECRET_FILE: &str = "session.key";
const MIN_SECRET_LEN: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "quill", about = "A small self-hosted blog")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub bcrypt_cost: u32,
    pub secret: Option<SessionSecret>,
}

/// Key material for signing session tokens. Never printed.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionSecret(String);

impl SessionSecret {
    pub fn new(secret: impl Into<String>) -> anyhow::Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "session secret must be at least {} bytes long",
                MIN_SECRET_LEN
            );
        }
        Ok(Self(secret))
    }

    /// 32 random bytes, hex encoded.
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        Self(hex::encode(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(<redacted>)")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "quill_session".to_string(),
            bcrypt_cost: 10,
            secret: None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("quill.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".quill")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("quill.db"))
    }

    /// Pick the signing secret: environment first, then the config file, then
    /// a key file in the data directory (created on first start).
    pub fn session_secret(&self, data_dir: &Path) -> anyhow::Result<SessionSecret> {
        resolve_secret(
            std::env::var(SECRET_ENV_VAR).ok(),
            self.auth.secret.clone(),
            data_dir,
        )
    }
}

fn resolve_secret(
    from_env: Option<String>,
    from_config: Option<SessionSecret>,
    data_dir: &Path,
) -> anyhow::Result<SessionSecret> {
    if let Some(secret) = from_env.filter(|s| !s.is_empty()) {
        tracing::info!("Using session secret from {}", SECRET_ENV_VAR);
        return SessionSecret::new(secret);
    }

    if let Some(secret) = from_config {
        tracing::info!("Using session secret from config file");
        return SessionSecret::new(secret.0);
    }

    let key_path = data_dir.join(SECRET_FILE);
    if key_path.exists() {
        let content = std::fs::read_to_string(&key_path)?;
        return SessionSecret::new(content.trim());
    }

    std::fs::create_dir_all(data_dir)?;
    let secret = SessionSecret::generate();
    write_key_file(&key_path, &secret.0)?;
    tracing::info!("Generated new session secret at {}", key_path.display());
    Ok(secret)
}

/// Create the key file readable by the owner only.
fn write_key_file(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?.write_all(contents.as_bytes())
}
