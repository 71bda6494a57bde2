//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;
use timegate_util::IdentityId;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid listen address '{value}': {message}")]
    InvalidListenAddr { value: String, message: String },

    #[error("Invalid bypass identity '{value}': expected a UUID")]
    InvalidBypassIdentity { value: String },

    #[error("Invalid resolver base URL '{value}': {message}")]
    InvalidResolverUrl { value: String, message: String },

    #[error("Database path cannot be empty")]
    EmptyDbPath,
}

/// Validate a raw configuration, collecting every error rather than stopping
/// at the first
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(addr) = &config.service.listen_addr
        && addr.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidListenAddr {
            value: addr.clone(),
            message: "expected host:port".into(),
        });
    }

    if let Some(id) = &config.service.bypass_identity
        && id.parse::<IdentityId>().is_err()
    {
        errors.push(ValidationError::InvalidBypassIdentity { value: id.clone() });
    }

    if let Some(path) = &config.service.db_path
        && path.as_os_str().is_empty()
    {
        errors.push(ValidationError::EmptyDbPath);
    }

    if let Some(url) = &config.resolver.base_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError::InvalidResolverUrl {
                value: url.clone(),
                message: "expected an http(s) URL".into(),
            });
        } else if url.ends_with('/') {
            errors.push(ValidationError::InvalidResolverUrl {
                value: url.clone(),
                message: "must not end with a slash".into(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(toml_str: &str) -> RawConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn valid_config_has_no_errors() {
        let config = raw(r#"
            config_version = 1

            [service]
            listen_addr = "127.0.0.1:7733"
            bypass_identity = "5269cc22-14b3-443a-9519-92ff373fd76c"

            [resolver]
            base_url = "https://api.mojang.com/users/profiles/minecraft"
        "#);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn bad_listen_addr_is_reported() {
        let config = raw(r#"
            config_version = 1

            [service]
            listen_addr = "not-an-address"
        "#);
        let errors = validate_config(&config);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidListenAddr { .. }))
        );
    }

    #[test]
    fn bad_bypass_identity_is_reported() {
        let config = raw(r#"
            config_version = 1

            [service]
            bypass_identity = "not-a-uuid"
        "#);
        let errors = validate_config(&config);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidBypassIdentity { .. }))
        );
    }

    #[test]
    fn non_http_resolver_url_is_reported() {
        let config = raw(r#"
            config_version = 1

            [resolver]
            base_url = "ftp://example.org/lookup"
        "#);
        let errors = validate_config(&config);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidResolverUrl { .. }))
        );
    }

    #[test]
    fn multiple_errors_collect() {
        let config = raw(r#"
            config_version = 1

            [service]
            listen_addr = "nope"
            bypass_identity = "also nope"
        "#);
        assert_eq!(validate_config(&config).len(), 2);
    }
}
