use tracing::debug;

use crate::envelope::PostDetail;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum QuickViewState {
    Closed,
    Loading { slug: String },
    Loaded(PostDetail),
    Failed {
        slug: String,
        message: String,
        timed_out: bool,
    },
}

/// Handle for one in-flight post fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    slug: String,
}

impl Ticket {
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// Quick-view pane state.
///
/// Each `open` or `close` starts a new generation; a fetch result is applied
/// only with the ticket of the current generation, so a result for a slug the
/// pane has moved away from is dropped.
#[derive(Debug, Clone)]
pub struct QuickView {
    state: QuickViewState,
    generation: u64,
}

impl Default for QuickView {
    fn default() -> Self {
        Self {
            state: QuickViewState::Closed,
            generation: 0,
        }
    }
}

impl QuickView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QuickViewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, QuickViewState::Closed)
    }

    pub fn open(&mut self, slug: &str) -> Ticket {
        self.generation += 1;
        self.state = QuickViewState::Loading {
            slug: slug.to_string(),
        };
        Ticket {
            generation: self.generation,
            slug: slug.to_string(),
        }
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.state = QuickViewState::Closed;
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Applies a fetch result. Returns false, changing nothing, for a stale
    /// ticket.
    pub fn resolve(&mut self, ticket: &Ticket, result: Result<PostDetail, FetchError>) -> bool {
        if !self.is_current(ticket) {
            debug!(slug = ticket.slug(), "dropping stale post detail");
            return false;
        }
        self.state = match result {
            Ok(post) => QuickViewState::Loaded(post),
            Err(err) => QuickViewState::Failed {
                slug: ticket.slug.clone(),
                message: err.user_message(),
                timed_out: err.is_timeout(),
            },
        };
        true
    }
}
