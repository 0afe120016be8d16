//! Web server status integration
//!
//! Polls the status endpoints of a set of web servers and reports what they
//! say as entities for a monitoring backend.
//!
//! # Flow
//!
//! For every configured endpoint, in order:
//! - the [`statusprobe`] prober queries the server and measures latency
//! - the **mapper** writes inventory, metrics and events onto the endpoint's
//!   entity
//!
//! Once every endpoint has been processed the **integration** payload is
//! published to stdout as a single JSON document. A failing endpoint is
//! logged and skipped; only setup and publish failures end the run.

pub mod config;
pub mod entity;
pub mod integration;
pub mod mapper;
pub mod runner;
pub mod types;

pub use config::{Config, ConfigError};
pub use entity::{Entity, EntitySink, Event, MetricSet, SinkError};
pub use integration::{Integration, IntegrationError, PublishOptions};
pub use runner::{CycleError, RunReport, run};
pub use types::{Endpoint, Settings};
