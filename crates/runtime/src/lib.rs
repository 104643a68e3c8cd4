//! Translation worker runtime
//!
//! Drives a native translation engine on behalf of a host:
//! - Engine lifecycle (unloaded, loading, ready) with a pending queue
//! - Model construction from downloaded artifacts, pivoting through English
//! - Batch execution with quality estimation transcoding
//! - Outbound fast path
//! - Progress, error and timing reports back to the host

pub mod executor;
pub mod handle;
pub mod loader;
pub mod metrics;
pub mod outbound;
pub mod queue;
pub mod registry;
pub mod reporter;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod text;
pub mod worker;

pub use executor::BatchExecutor;
pub use handle::NativeGuard;
pub use loader::{ConstructionReport, ModelBuilder};
pub use outbound::translate_outbound;
pub use queue::PendingQueue;
pub use registry::{LoadedModel, ModelRegistry};
pub use reporter::{Reporter, MODEL_LOAD_TIMESPAN};
pub use session::WorkerSession;
pub use state::{EngineState, LoadRequest};
pub use telemetry::init_tracing;
pub use text::{escape_html, word_count};
pub use worker::{spawn_worker, WorkerHandle};
