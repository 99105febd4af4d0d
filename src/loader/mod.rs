//! Two-phase image loading.
//!
//! - [`messages`]: tickets, requests and completions
//! - [`handler`]: the shared request queue regions talk to
//! - [`worker`]: services the queue through a [`Fetch`] implementation

pub mod handler;
pub mod messages;
pub mod worker;

pub use handler::ImageLoader;
pub use messages::{LoadCompletion, LoadOutcome, LoadRequest, LoadTicket};
pub use worker::{Fetch, FileFetcher, LoadWorker};
