use thiserror::Error;

/// Errors surfaced at the thread boundary. Nothing here is fatal to the
/// thread itself: a failed run trigger leaves history and shared state
/// untouched, and the thread keeps accepting messages.
#[derive(Debug, Error)]
pub enum AguiError {
    /// The run id was never submitted, or its event stream was already
    /// consumed. Duplicate and stale triggers land here.
    #[error("run {run_id} not found")]
    RunNotFound { run_id: String },
}
