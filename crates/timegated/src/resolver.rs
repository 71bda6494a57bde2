//! Name-to-identity resolution over an HTTP directory
//!
//! The directory is expected to answer `GET {base_url}/{name}` with a JSON
//! body carrying the identity as an undashed UUID, e.g.
//! `{"id": "5269cc2214b3443a951992ff373fd76c", "name": "alice"}`.
//! An unknown name answers 404 or 204 with an empty body.

use async_trait::async_trait;
use serde::Deserialize;
use timegate_host_api::{IdentityResolver, ResolveError};
use timegate_util::IdentityId;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: String,
}

pub struct HttpResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl IdentityResolver for HttpResolver {
    async fn resolve(&self, name: &str) -> Result<IdentityId, ResolveError> {
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NO_CONTENT {
            return Err(ResolveError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(ResolveError::Lookup(format!(
                "Directory returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;
        if body.is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        let profile: ProfileResponse = serde_json::from_str(&body)
            .map_err(|e| ResolveError::Lookup(format!("Bad directory response: {}", e)))?;

        let identity: IdentityId = profile.id.parse().map_err(|_| {
            ResolveError::Lookup(format!("Bad identity in directory response: {}", profile.id))
        })?;

        debug!(name = %name, identity = %identity, "Name resolved");
        Ok(identity)
    }
}
