//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Name resolution settings
    #[serde(default)]
    pub resolver: RawResolverConfig,

    /// Denial message settings
    #[serde(default)]
    pub messages: RawMessagesConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// TCP listen address (default: 127.0.0.1:7733)
    pub listen_addr: Option<String>,

    /// SQLite database path (default: timegate.db)
    pub db_path: Option<PathBuf>,

    /// Identity exempt from all access checks, as a UUID string.
    /// Defaults to the built-in bypass identity.
    pub bypass_identity: Option<String>,
}

/// Name resolution settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawResolverConfig {
    /// Base URL of the name-to-identity directory.
    /// A lookup fetches `{base_url}/{name}`.
    pub base_url: Option<String>,
}

/// Denial message settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMessagesConfig {
    /// Support line appended to every denial message
    pub support_contact: Option<String>,
}
