//! Resolved runtime settings (validated, defaults applied)

use crate::schema::RawConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use timegate_util::{DEFAULT_BYPASS_IDENTITY, IdentityId};

/// Default TCP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7733";

/// Default database path, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "timegate.db";

/// Default name-to-identity directory
pub const DEFAULT_RESOLVER_BASE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

/// Validated settings with all defaults applied
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: SocketAddr,
    pub db_path: PathBuf,
    pub bypass_identity: IdentityId,
    pub resolver_base_url: String,
    pub support_contact: Option<String>,
}

impl Settings {
    /// Build settings from a raw config. Assumes the raw config has already
    /// passed validation; unparseable fields fall back to defaults.
    pub fn from_raw(raw: RawConfig) -> Self {
        let listen_addr = raw
            .service
            .listen_addr
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                DEFAULT_LISTEN_ADDR
                    .parse()
                    .unwrap_or(SocketAddr::from(([127, 0, 0, 1], 7733)))
            });

        let bypass_identity = raw
            .service
            .bypass_identity
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BYPASS_IDENTITY);

        Self {
            listen_addr,
            db_path: raw
                .service
                .db_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            bypass_identity,
            resolver_base_url: raw
                .resolver
                .base_url
                .unwrap_or_else(|| DEFAULT_RESOLVER_BASE_URL.to_string()),
            support_contact: raw.messages.support_contact,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_config() {
        let settings = Settings::from_raw(RawConfig::default());
        assert_eq!(settings.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(settings.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(settings.bypass_identity, DEFAULT_BYPASS_IDENTITY);
        assert!(settings.support_contact.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let raw: RawConfig = toml::from_str(
            r#"
            config_version = 1

            [service]
            listen_addr = "0.0.0.0:9000"
            bypass_identity = "d48a2a43-1e17-4b56-a3c5-6a7e17cf2dbd"
        "#,
        )
        .unwrap();

        let settings = Settings::from_raw(raw);
        assert_eq!(settings.listen_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(
            settings.bypass_identity.to_string(),
            "d48a2a43-1e17-4b56-a3c5-6a7e17cf2dbd"
        );
    }
}
