//! Integration identity, entity registration and the final publish.

use crate::entity::{Entity, EntityMetadata, Event, Inventory, MetricSet};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

/// Version of the payload format written by [`Integration::publish`]
pub const PROTOCOL_VERSION: &str = "3";

/// Fatal integration errors
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("initialization failed: {0}")]
    Init(String),

    #[error("failed to write payload: {0}")]
    Publish(#[from] std::io::Error),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<IntegrationError> for common::Error {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::Init(msg) => common::Error::init(msg),
            IntegrationError::Publish(e) => common::Error::publish(e),
            IntegrationError::Serialize(e) => common::Error::Serialization(e),
        }
    }
}

/// Which payload sections to publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Pretty-print the payload instead of writing a single line
    pub pretty: bool,
    pub metrics: bool,
    pub inventory: bool,
    pub events: bool,
}

impl PublishOptions {
    /// No section selected means every section is published
    fn all(&self) -> bool {
        !self.metrics && !self.inventory && !self.events
    }

    fn include_metrics(&self) -> bool {
        self.all() || self.metrics
    }

    fn include_inventory(&self) -> bool {
        self.all() || self.inventory
    }

    fn include_events(&self) -> bool {
        self.all() || self.events
    }
}

/// Serialized form of the whole run
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    pub name: &'a str,
    pub protocol_version: &'static str,
    pub integration_version: &'a str,
    pub data: Vec<EntityPayload<'a>>,
}

/// Serialized form of one entity
#[derive(Debug, Serialize)]
pub struct EntityPayload<'a> {
    pub entity: &'a EntityMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<&'a [MetricSet]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<&'a Inventory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<&'a [Event]>,
}

/// A single integration run and the entities it reports on
#[derive(Debug)]
pub struct Integration {
    name: String,
    version: String,
    registered: HashSet<String>,
    entities: Vec<Entity>,
}

impl Integration {
    /// Create an integration with the given identity
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, IntegrationError> {
        let name = name.into();
        let version = version.into();

        if name.trim().is_empty() {
            return Err(IntegrationError::Init("integration name is empty".into()));
        }
        if version.trim().is_empty() {
            return Err(IntegrationError::Init("integration version is empty".into()));
        }

        debug!(name = %name, version = %version, "Integration created");

        Ok(Self {
            name,
            version,
            registered: HashSet::new(),
            entities: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new entity. Names must be unique within the integration.
    pub fn register(&mut self, name: &str, entity_type: &str) -> Result<Entity, IntegrationError> {
        if name.trim().is_empty() {
            return Err(IntegrationError::Init("entity name is empty".into()));
        }
        if !self.registered.insert(name.to_string()) {
            return Err(IntegrationError::Init(format!(
                "entity {:?} is already registered",
                name
            )));
        }

        debug!(entity = name, entity_type, "Entity registered");
        Ok(Entity::new(name, entity_type))
    }

    /// Add a registered entity to the payload
    pub fn attach(&mut self, entity: Entity) -> Result<(), IntegrationError> {
        if !self.registered.contains(entity.name()) {
            return Err(IntegrationError::Init(format!(
                "entity {:?} was never registered",
                entity.name()
            )));
        }
        if self.entities.iter().any(|e| e.name() == entity.name()) {
            return Err(IntegrationError::Init(format!(
                "entity {:?} is already attached",
                entity.name()
            )));
        }

        self.entities.push(entity);
        Ok(())
    }

    /// Build the payload view for the selected sections
    pub fn payload(&self, options: &PublishOptions) -> Payload<'_> {
        let data = self
            .entities
            .iter()
            .map(|entity| EntityPayload {
                entity: entity.metadata(),
                metrics: options.include_metrics().then(|| entity.metrics()),
                inventory: options.include_inventory().then(|| entity.inventory()),
                events: options.include_events().then(|| entity.events()),
            })
            .collect();

        Payload {
            name: &self.name,
            protocol_version: PROTOCOL_VERSION,
            integration_version: &self.version,
            data,
        }
    }

    /// Serialize the payload and write it as one document to `writer`
    pub fn publish<W: Write>(
        &self,
        mut writer: W,
        options: &PublishOptions,
    ) -> Result<(), IntegrationError> {
        let payload = self.payload(options);
        let bytes = if options.pretty {
            serde_json::to_vec_pretty(&payload)?
        } else {
            serde_json::to_vec(&payload)?
        };

        writer.write_all(&bytes)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(
            entities = self.entities.len(),
            bytes = bytes.len(),
            "Integration payload published"
        );
        Ok(())
    }
}
