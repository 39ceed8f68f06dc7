//! Per-task panic capture.
//!
//! Rather than overriding the process-wide panic hook (the source installs a
//! global `sys.excepthook`/`threading.excepthook` pair), a worker's own task
//! boundary observes a panic via its `JoinHandle` and logs it at `error!`
//! before the supervisor decides whether to restart the worker.

use tracing::error;

/// Log a worker task panic at `error!`, naming the worker.
///
/// `payload` is the value carried by `Box<dyn Any + Send>` from a panicking
/// `JoinHandle`; only the common `&str`/`String` payload shapes are rendered,
/// anything else logs as `"<non-string panic payload>"`.
pub fn log_task_panic(worker: &str, payload: &(dyn std::any::Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|value| (*value).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string());
    error!(worker, message, "worker task panicked");
}
