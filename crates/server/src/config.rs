//! Server configuration
//!
//! Each setting resolves in order: command line flag, environment variable,
//! built-in default. Unparsable values are logged and skipped.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8000;

/// File name of the persisted board inside the data directory.
pub const STORE_FILE_NAME: &str = "labor_board.json";

/// Directory (inside the data directory) that keeps accepted uploads.
pub const UPLOAD_DIR_NAME: &str = "uploads";

const ENV_PORT: &str = "LABOR_BOARD_PORT";
const ENV_BIND: &str = "LABOR_BOARD_BIND";
const ENV_DATA_DIR: &str = "LABOR_BOARD_DATA_DIR";
const ENV_STATIC_DIR: &str = "LABOR_BOARD_STATIC_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Resolve from process arguments and the real environment.
    pub fn from_args(args: &[String]) -> Self {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an injectable environment lookup.
    pub fn resolve<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = setting(args, &["--port", "-p"], &env, ENV_PORT)
            .and_then(|s| parse_or_warn::<u16>("port", &s))
            .unwrap_or(DEFAULT_PORT);

        let bind = setting(args, &["--bind"], &env, ENV_BIND)
            .and_then(|s| parse_or_warn::<IpAddr>("bind address", &s))
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let data_dir = setting(args, &["--data-dir", "-d"], &env, ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let static_dir = setting(args, &["--static-dir"], &env, ENV_STATIC_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_static_dir);

        Self {
            bind,
            port,
            data_dir,
            static_dir,
        }
    }

    /// Config rooted at `data_dir` with every other setting at its default.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            data_dir: data_dir.as_ref().to_path_buf(),
            static_dir: default_static_dir(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOAD_DIR_NAME)
    }
}

fn setting<F>(args: &[String], flags: &[&str], env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    args.iter()
        .position(|a| flags.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
        .or_else(|| env(key))
        .filter(|s| !s.trim().is_empty())
}

fn parse_or_warn<T: std::str::FromStr>(what: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}: {:?}", what, raw);
            None
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("labor-board"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}
