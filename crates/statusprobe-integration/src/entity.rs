//! Entities and the data attached to them.
//!
//! An [`Entity`] is the unit the monitoring backend understands: a named,
//! typed object carrying inventory, metric sets and events. The
//! [`EntitySink`] trait is the write surface the mapper needs, so it can be
//! exercised against a recording fake as easily as a real entity.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by an entity sink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("invalid metric set name {0:?}")]
    InvalidMetricSet(String),
}

/// Write surface of a monitored entity
pub trait EntitySink {
    /// Record a static fact about the entity
    fn set_inventory_item(&mut self, category: &str, key: &str, value: &str);

    /// Start a new metric set named `name` and return it for writing
    fn create_metric_set(&mut self, name: &str) -> Result<&mut MetricSet, SinkError>;

    /// Record a discrete occurrence
    fn add_event(&mut self, event: Event);
}

/// A single value inside a metric set
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Gauge(f64),
    Attribute(String),
}

impl MetricValue {
    /// Numeric value, if this is a gauge
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            MetricValue::Attribute(_) => None,
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Whole numbers go out as integers: 200, not 200.0
            MetricValue::Gauge(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 =>
            {
                serializer.serialize_i64(*v as i64)
            }
            MetricValue::Gauge(v) => serializer.serialize_f64(*v),
            MetricValue::Attribute(s) => serializer.serialize_str(s),
        }
    }
}

/// A named collection of measurements for one reporting cycle.
///
/// Values keep insertion order; setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    event_type: String,
    values: Vec<(String, MetricValue)>,
}

impl MetricSet {
    /// Create an empty set
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            values: Vec::new(),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Record a numeric gauge
    pub fn set_gauge(&mut self, name: &str, value: f64) {
        self.set(name, MetricValue::Gauge(value));
    }

    /// Record a string attribute
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, MetricValue::Attribute(value.into()));
    }

    fn set(&mut self, name: &str, value: MetricValue) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate over numeric values only, in insertion order
    pub fn gauges(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter_map(|(n, v)| v.as_f64().map(|f| (n.as_str(), f)))
    }

    /// Number of values, attributes included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for MetricSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("event_type", &self.event_type)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A discrete occurrence recorded against an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub summary: String,
    pub category: String,
}

impl Event {
    pub fn new(summary: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            category: category.into(),
        }
    }
}

/// Inventory grouped by category, then key
pub type Inventory = BTreeMap<String, BTreeMap<String, String>>;

/// Identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

impl EntityMetadata {
    /// `<type>:<name>`, the key the backend indexes entities by
    pub fn key(&self) -> String {
        format!("{}:{}", self.entity_type, self.name)
    }
}

/// A monitored object and everything recorded about it this cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    metadata: EntityMetadata,
    inventory: Inventory,
    metrics: Vec<MetricSet>,
    events: Vec<Event>,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            metadata: EntityMetadata {
                name: name.into(),
                entity_type: entity_type.into(),
            },
            inventory: Inventory::new(),
            metrics: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn metrics(&self) -> &[MetricSet] {
        &self.metrics
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl EntitySink for Entity {
    fn set_inventory_item(&mut self, category: &str, key: &str, value: &str) {
        self.inventory
            .entry(category.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    fn create_metric_set(&mut self, name: &str) -> Result<&mut MetricSet, SinkError> {
        if name.trim().is_empty() {
            return Err(SinkError::InvalidMetricSet(name.to_string()));
        }

        let mut set = MetricSet::new(name);
        set.set_attribute("entityName", self.metadata.key());
        set.set_attribute("displayName", self.metadata.name.clone());
        self.metrics.push(set);

        let index = self.metrics.len() - 1;
        Ok(&mut self.metrics[index])
    }

    fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }
}
