//! Collaborator seams: page fetching and notification transport.

pub mod fetch;
pub mod notify;

pub use fetch::{HttpPageFetcher, PageFetcher};
pub use notify::{DispatchReport, Dispatcher, Transport, WebhookTransport};
