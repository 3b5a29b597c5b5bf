//! REST client for the post graph and post details.

mod client;
mod envelope;
mod error;
mod quick_view;

pub use client::{ApiClient, ClientConfig, with_timeout};
pub use envelope::{PostDetail, RelatedPost, parse_envelope, parse_graph_response};
pub use error::FetchError;
pub use quick_view::{QuickView, QuickViewState, Ticket};
