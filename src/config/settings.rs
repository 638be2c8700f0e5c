use crate::error::{FactomError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

pub const DEFAULT_FACTOMD_SERVER: &str = "localhost:8088";
pub const DEFAULT_WALLETD_SERVER: &str = "localhost:8089";

const FACTOMD_SERVER_KEY: &str = "FACTOMD_SERVER";
const FACTOMD_USER_KEY: &str = "FACTOMD_USER";
const FACTOMD_PASSWORD_KEY: &str = "FACTOMD_PASSWORD";
const FACTOMD_TLS_KEY: &str = "FACTOMD_TLS";
const FACTOMD_CERT_KEY: &str = "FACTOMD_CERT";
const WALLETD_SERVER_KEY: &str = "WALLETD_SERVER";
const WALLETD_USER_KEY: &str = "WALLETD_USER";
const WALLETD_PASSWORD_KEY: &str = "WALLETD_PASSWORD";
const WALLETD_TLS_KEY: &str = "WALLETD_TLS";
const WALLETD_CERT_KEY: &str = "WALLETD_CERT";

/// HTTP basic auth pair
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: &str, password: &str) -> Credentials {
        Credentials {
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .finish()
    }
}

/// Everything the client needs to reach factomd and walletd
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub factomd_server: String,
    pub factomd_credentials: Option<Credentials>,
    pub factomd_tls: bool,
    pub factomd_cert: Option<PathBuf>,
    pub walletd_server: String,
    pub walletd_credentials: Option<Credentials>,
    pub walletd_tls: bool,
    pub walletd_cert: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            factomd_server: DEFAULT_FACTOMD_SERVER.to_string(),
            factomd_credentials: None,
            factomd_tls: false,
            factomd_cert: None,
            walletd_server: DEFAULT_WALLETD_SERVER.to_string(),
            walletd_credentials: None,
            walletd_tls: false,
            walletd_cert: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EndpointSection {
    server: Option<String>,
    user: Option<String>,
    password: Option<String>,
    tls: Option<bool>,
    cert: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    factomd: EndpointSection,
    #[serde(default)]
    walletd: EndpointSection,
}

fn credentials_from(user: Option<String>, password: Option<String>) -> Option<Credentials> {
    match (user, password) {
        (None, None) => None,
        (user, password) => Some(Credentials {
            user: user.unwrap_or_default(),
            password: password.unwrap_or_default(),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(FactomError::Config(format!("{key}: not a boolean: {other}"))),
    }
}

impl Settings {
    /// Overlay a TOML document with `[factomd]` and `[walletd]` sections
    pub fn apply_toml(&mut self, text: &str) -> Result<()> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| FactomError::Config(e.to_string()))?;

        if let Some(server) = file.factomd.server {
            self.factomd_server = server;
        }
        if let Some(creds) = credentials_from(file.factomd.user, file.factomd.password) {
            self.factomd_credentials = Some(creds);
        }
        if let Some(tls) = file.factomd.tls {
            self.factomd_tls = tls;
        }
        if let Some(cert) = file.factomd.cert {
            self.factomd_cert = Some(cert);
        }
        if let Some(server) = file.walletd.server {
            self.walletd_server = server;
        }
        if let Some(creds) = credentials_from(file.walletd.user, file.walletd.password) {
            self.walletd_credentials = Some(creds);
        }
        if let Some(tls) = file.walletd.tls {
            self.walletd_tls = tls;
        }
        if let Some(cert) = file.walletd.cert {
            self.walletd_cert = Some(cert);
        }
        Ok(())
    }

    /// Overlay values from `lookup`, normally the process environment
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = lookup(FACTOMD_SERVER_KEY) {
            self.factomd_server = server;
        }
        if let Some(creds) = credentials_from(lookup(FACTOMD_USER_KEY), lookup(FACTOMD_PASSWORD_KEY)) {
            self.factomd_credentials = Some(creds);
        }
        if let Some(tls) = lookup(FACTOMD_TLS_KEY) {
            self.factomd_tls = parse_bool(FACTOMD_TLS_KEY, &tls)?;
        }
        if let Some(cert) = lookup(FACTOMD_CERT_KEY) {
            self.factomd_cert = Some(PathBuf::from(cert));
        }
        if let Some(server) = lookup(WALLETD_SERVER_KEY) {
            self.walletd_server = server;
        }
        if let Some(creds) = credentials_from(lookup(WALLETD_USER_KEY), lookup(WALLETD_PASSWORD_KEY)) {
            self.walletd_credentials = Some(creds);
        }
        if let Some(tls) = lookup(WALLETD_TLS_KEY) {
            self.walletd_tls = parse_bool(WALLETD_TLS_KEY, &tls)?;
        }
        if let Some(cert) = lookup(WALLETD_CERT_KEY) {
            self.walletd_cert = Some(PathBuf::from(cert));
        }
        Ok(())
    }
}

pub struct Config {
    inner: RwLock<Settings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Config {
        Config {
            inner: RwLock::new(settings),
        }
    }

    /// Defaults overlaid with the environment. A malformed variable is logged
    /// and skipped.
    pub fn from_env() -> Config {
        let mut settings = Settings::default();
        if let Err(e) = settings.apply_env(|key| env::var(key).ok()) {
            log::warn!("Ignoring environment configuration: {e}");
        }
        Self::with_settings(settings)
    }

    /// Defaults, then the TOML file if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut settings = Settings::default();
        if let Some(path) = path {
            let text = std::fs::read_to_string(path)
                .map_err(|e| FactomError::Config(format!("{}: {e}", path.display())))?;
            settings.apply_toml(&text)?;
        }
        settings.apply_env(|key| env::var(key).ok())?;
        Ok(Self::with_settings(settings))
    }

    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Settings {
        self.read().clone()
    }

    pub fn get_factomd_server(&self) -> String {
        self.read().factomd_server.clone()
    }

    pub fn set_factomd_server(&self, server: &str) {
        self.write().factomd_server = server.to_string();
    }

    pub fn get_walletd_server(&self) -> String {
        self.read().walletd_server.clone()
    }

    pub fn set_walletd_server(&self, server: &str) {
        self.write().walletd_server = server.to_string();
    }

    pub fn get_factomd_credentials(&self) -> Option<Credentials> {
        self.read().factomd_credentials.clone()
    }

    pub fn set_factomd_credentials(&self, user: &str, password: &str) {
        self.write().factomd_credentials = Some(Credentials::new(user, password));
    }

    pub fn get_walletd_credentials(&self) -> Option<Credentials> {
        self.read().walletd_credentials.clone()
    }

    pub fn set_walletd_credentials(&self, user: &str, password: &str) {
        self.write().walletd_credentials = Some(Credentials::new(user, password));
    }

    pub fn is_factomd_tls(&self) -> bool {
        self.read().factomd_tls
    }

    pub fn get_factomd_cert(&self) -> Option<PathBuf> {
        self.read().factomd_cert.clone()
    }

    pub fn set_factomd_tls(&self, enabled: bool, cert: Option<PathBuf>) {
        let mut settings = self.write();
        settings.factomd_tls = enabled;
        settings.factomd_cert = cert;
    }

    pub fn is_walletd_tls(&self) -> bool {
        self.read().walletd_tls
    }

    pub fn get_walletd_cert(&self) -> Option<PathBuf> {
        self.read().walletd_cert.clone()
    }

    pub fn set_walletd_tls(&self, enabled: bool, cert: Option<PathBuf>) {
        let mut settings = self.write();
        settings.walletd_tls = enabled;
        settings.walletd_cert = cert;
    }
}
