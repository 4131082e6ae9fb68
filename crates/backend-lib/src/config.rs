// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Token signing and lifetime settings
    pub jwt: JwtSettings,
}

/// Token signing and lifetime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    /// Symmetric signing secret, loaded once at startup
    pub secret: String,
    /// Access token TTL in seconds
    pub access_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            jwt: JwtSettings::default(),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: "stayline-dev-secret-change-me".to_string(),
            access_ttl_secs: 60 * 15,             // 15 minutes
            refresh_ttl_secs: 60 * 60 * 24 * 7,   // 7 days
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `STAYLINE_`-prefixed env vars,
    /// falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit TOML file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("STAYLINE_").split("__"))
            .extract()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr.port(), 3000);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.jwt.access_ttl_secs, 900);
        assert_eq!(settings.jwt.refresh_ttl_secs, 604_800);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
bind_addr = "0.0.0.0:8080"
log_level = "debug"

[jwt]
secret = "test-secret"
access_ttl_secs = 60
refresh_ttl_secs = 120
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.bind_addr.port(), 8080);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.jwt.secret, "test-secret");
        assert_eq!(settings.jwt.access_ttl_secs, 60);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, r#"log_level = "warn""#).unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.log_level, "warn");
        // untouched sections fall back to defaults
        assert_eq!(settings.bind_addr.port(), 3000);
        assert_eq!(settings.jwt.refresh_ttl_secs, 604_800);
    }
}
