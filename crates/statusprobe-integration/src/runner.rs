//! One poll, map and publish run over every configured endpoint.

use crate::entity::{Entity, EntitySink, SinkError};
use crate::integration::{Integration, IntegrationError, PublishOptions};
use crate::mapper;
use crate::types::{Endpoint, Settings};
use futures::stream::{self, StreamExt};
use statusprobe::{ProbeError, ServerProber};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, error, info};

/// Failure of a single endpoint cycle. Never fatal to the run.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl CycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Probe(e) => e.kind(),
            CycleError::Sink(_) => "sink",
        }
    }
}

/// Outcome of one endpoint cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReport {
    pub entity: String,
    pub url: String,
    /// `Err` holds the rendered cycle error
    pub outcome: Result<(), String>,
}

impl EndpointReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-endpoint outcomes of a run, in configured order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub endpoints: Vec<EndpointReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.endpoints.iter().filter(|e| e.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.endpoints.len() - self.succeeded()
    }
}

/// Query one server and record what it reports onto `sink`
pub async fn monitor_web_server<P, S>(
    prober: &P,
    sink: &mut S,
    url: &str,
) -> Result<(), CycleError>
where
    P: ServerProber + ?Sized,
    S: EntitySink + ?Sized,
{
    let status = prober.query(url).await?;
    mapper::map(&status, sink)?;
    Ok(())
}

async fn run_cycle<P>(
    prober: &P,
    endpoint: &Endpoint,
    mut entity: Entity,
) -> (Entity, EndpointReport)
where
    P: ServerProber + ?Sized,
{
    debug!(entity = %endpoint.entity, url = %endpoint.url, "Polling endpoint");

    let outcome = match monitor_web_server(prober, &mut entity, &endpoint.url).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(
                entity = %endpoint.entity,
                url = %endpoint.url,
                kind = e.kind(),
                error = %e,
                "cannot fetch data for endpoint: {}",
                endpoint.url
            );
            Err(e.to_string())
        }
    };

    let report = EndpointReport {
        entity: endpoint.entity.clone(),
        url: endpoint.url.clone(),
        outcome,
    };
    (entity, report)
}

/// Run one cycle per endpoint and publish the result to `writer`.
///
/// Registration and publish failures abort the run. Endpoint failures are
/// logged and reported, and the remaining endpoints still run.
pub async fn run<P, W>(
    settings: &Settings,
    prober: &P,
    writer: W,
    options: &PublishOptions,
) -> Result<RunReport, IntegrationError>
where
    P: ServerProber + ?Sized,
    W: Write,
{
    let mut integration = Integration::new(
        settings.integration_name.as_str(),
        settings.integration_version.as_str(),
    )?;

    let entities = settings
        .endpoints
        .iter()
        .map(|endpoint| integration.register(&endpoint.entity, &endpoint.entity_type))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        integration = integration.name(),
        endpoints = entities.len(),
        max_concurrency = settings.max_concurrency,
        "Starting integration run"
    );

    // `buffered` keeps results in configured order whatever the overlap
    let results: Vec<(Entity, EndpointReport)> = stream::iter(
        settings
            .endpoints
            .iter()
            .zip(entities)
            .map(|(endpoint, entity)| run_cycle(prober, endpoint, entity)),
    )
    .buffered(settings.max_concurrency.max(1))
    .collect()
    .await;

    let mut report = RunReport::default();
    for (entity, endpoint_report) in results {
        integration.attach(entity)?;
        report.endpoints.push(endpoint_report);
    }

    integration.publish(writer, options)?;

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Integration run complete"
    );
    Ok(report)
}
