//! Runtime settings for an integration run.

use std::time::Duration;

/// Entity type reported for polled servers
pub const DEFAULT_ENTITY_TYPE: &str = "web-server";

/// One polled endpoint and the entity it reports as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Entity name, unique within a run
    pub entity: String,

    /// Entity type
    pub entity_type: String,

    /// Status URL to poll
    pub url: String,
}

impl Endpoint {
    pub fn new(entity: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            entity_type: DEFAULT_ENTITY_TYPE.to_string(),
            url: url.into(),
        }
    }
}

/// Settings passed into [`crate::runner::run`]
#[derive(Debug, Clone)]
pub struct Settings {
    /// Integration name reported in the payload
    pub integration_name: String,

    /// Integration version reported in the payload
    pub integration_version: String,

    /// Endpoints in polling order
    pub endpoints: Vec<Endpoint>,

    /// Whole-request timeout, `None` keeps the transport default
    pub probe_timeout: Option<Duration>,

    /// Maximum number of endpoint cycles in flight at once
    pub max_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            integration_name: "com.new-relic.sdk-workshop".to_string(),
            integration_version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: vec![
                Endpoint::new("instance-a", "http://localhost:8081/health"),
                Endpoint::new("instance-b", "http://localhost:8082/health"),
            ],
            probe_timeout: None,
            max_concurrency: 1,
        }
    }
}
