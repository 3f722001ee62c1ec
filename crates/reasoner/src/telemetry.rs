//! Telemetry span helper and fixed event names
//!
//! The reasoner emits 17 events under the `reasoner/*` namespace. Span-style
//! phases go through [`span`] (or [`span_failable`] for compilation, whose
//! failure has its own event); point events go through [`emit`]. Counters and
//! latency histograms are recorded through the `metrics` facade, structured
//! logs through `tracing`. No subscriber is installed here.

use metrics::{counter, histogram};
use std::time::Instant;
use tracing::{debug, error};

/// Fixed event names
pub mod events {
    /// Compilation started
    pub const COMPILE_START: &str = "reasoner/compile/start";
    /// Compilation finished
    pub const COMPILE_STOP: &str = "reasoner/compile/stop";
    /// Compilation failed
    pub const COMPILE_EXCEPTION: &str = "reasoner/compile/exception";
    /// Compiled rule set ready (carries rule count)
    pub const COMPILE_COMPLETE: &str = "reasoner/compile/complete";

    /// Optimization started
    pub const OPTIMIZE_START: &str = "reasoner/optimize/start";
    /// Optimization finished
    pub const OPTIMIZE_STOP: &str = "reasoner/optimize/stop";
    /// Optimized rule set ready
    pub const OPTIMIZE_COMPLETE: &str = "reasoner/optimize/complete";

    /// Schema extraction started
    pub const EXTRACT_SCHEMA_START: &str = "reasoner/extract_schema/start";
    /// Schema extraction finished
    pub const EXTRACT_SCHEMA_STOP: &str = "reasoner/extract_schema/stop";
    /// SchemaInfo ready
    pub const EXTRACT_SCHEMA_COMPLETE: &str = "reasoner/extract_schema/complete";

    /// Materialization started
    pub const MATERIALIZE_START: &str = "reasoner/materialize/start";
    /// Materialization finished
    pub const MATERIALIZE_STOP: &str = "reasoner/materialize/stop";
    /// One fixpoint iteration completed
    pub const MATERIALIZE_ITERATION: &str = "reasoner/materialize/iteration";

    /// Deletion with reasoning started
    pub const DELETE_START: &str = "reasoner/delete/start";
    /// Deletion with reasoning finished
    pub const DELETE_STOP: &str = "reasoner/delete/stop";

    /// Backward trace finished
    pub const BACKWARD_TRACE_COMPLETE: &str = "reasoner/backward_trace/complete";
    /// Forward re-derivation finished
    pub const FORWARD_REDERIVE_COMPLETE: &str = "reasoner/forward_rederive/complete";
}

/// Metadata attached to an event
pub type Metadata<'a> = &'a [(&'static str, String)];

/// Emit a point event (counter + structured log)
pub fn emit(event: &'static str, metadata: Metadata<'_>) {
    counter!(event).increment(1);
    debug!(event, ?metadata, "reasoner event");
}

/// Run a closure between a start and a stop event
///
/// The stop event carries the duration and the summary metadata. Used for
/// phases whose stop event fires regardless of outcome.
pub fn span<T, E, F>(
    start: &'static str,
    stop: &'static str,
    metadata: Metadata<'_>,
    f: F,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Debug,
{
    emit(start, metadata);
    let began = Instant::now();

    let result = f();

    let duration_ms = began.elapsed().as_micros() as f64 / 1000.0;
    histogram!(stop).record(duration_ms);
    match &result {
        Ok(_) => debug!(event = stop, duration_ms, ?metadata, "reasoner span closed"),
        Err(e) => {
            debug!(event = stop, duration_ms, ?metadata, error = ?e, "reasoner span closed with error")
        }
    }
    counter!(stop).increment(1);

    result
}

/// Like [`span`], but a failure fires the exception event instead of stop
pub fn span_failable<T, E, F>(
    start: &'static str,
    stop: &'static str,
    exception: &'static str,
    metadata: Metadata<'_>,
    f: F,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Debug,
{
    emit(start, metadata);
    let began = Instant::now();

    let result = f();

    let duration_ms = began.elapsed().as_micros() as f64 / 1000.0;
    match &result {
        Ok(_) => {
            histogram!(stop).record(duration_ms);
            counter!(stop).increment(1);
            debug!(event = stop, duration_ms, ?metadata, "reasoner span closed");
        }
        Err(e) => {
            counter!(exception).increment(1);
            error!(event = exception, duration_ms, ?metadata, error = ?e, "reasoner span failed");
        }
    }

    result
}
