//! Download-ahead of playlist media
//!
//! The coordinator keeps exactly one transfer in flight, targeting the
//! earliest slot still missing its local file; the task executes a single
//! cancellable transfer and routes progress and results back into the
//! playlist by slot identity.

mod coordinator;
mod task;
mod transport;

pub use coordinator::Downloader;
pub use transport::{HttpTransport, MediaTransport};
