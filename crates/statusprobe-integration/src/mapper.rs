//! Mapping of a server status onto an entity.

use crate::entity::{EntitySink, Event, SinkError};
use statusprobe::ServerStatus;
use tracing::debug;

pub const INVENTORY_CATEGORY: &str = "api";
pub const INVENTORY_VERSION_KEY: &str = "version";
pub const METRIC_SET_NAME: &str = "status";
pub const STATUS_METRIC: &str = "status";
pub const LATENCY_METRIC: &str = "latency";
pub const ERROR_EVENT_CATEGORY: &str = "error";

/// Write `status` onto `sink`.
///
/// Writes happen in a fixed order: the version inventory item, then the
/// `status` metric set with its `status` and `latency` gauges, then an
/// `error` event when the server reports a 5xx status. Latency is always a
/// gauge; the backend receives the measured value of this cycle only.
///
/// Only metric set creation can fail, and when it does nothing after the
/// inventory item is written.
pub fn map<S>(status: &ServerStatus, sink: &mut S) -> Result<(), SinkError>
where
    S: EntitySink + ?Sized,
{
    sink.set_inventory_item(INVENTORY_CATEGORY, INVENTORY_VERSION_KEY, &status.api_version);

    let set = sink.create_metric_set(METRIC_SET_NAME)?;
    set.set_gauge(STATUS_METRIC, status.status_code as f64);
    set.set_gauge(LATENCY_METRIC, status.latency_ms as f64);

    if status.is_server_error() {
        debug!(status = status.status_code, "Server reports an error, recording event");
        sink.add_event(Event::new(status.error_message.clone(), ERROR_EVENT_CATEGORY));
    }

    Ok(())
}
