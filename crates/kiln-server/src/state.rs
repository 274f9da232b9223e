use kiln_orchestrator::JobQueue;
use kiln_training::JobStore;

/// Shared state for the HTTP handlers: the job store for reads and the
/// queue for submissions. Cloning shares both.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub queue: JobQueue,
}
