use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Ties an in-flight fetch to the view generation that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lifetime of one mounted view. Navigating away or changing filters calls
/// `invalidate`, after which responses for older tickets are dropped.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    generation: Arc<AtomicU64>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a fetch started now.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation.load(Ordering::SeqCst),
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation.load(Ordering::SeqCst)
    }

    /// Returns the value only if the ticket still belongs to the live view.
    pub fn accept<T>(&self, ticket: FetchTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            log::debug!(
                "Discarding stale response for view generation {}",
                ticket.generation
            );
            None
        }
    }
}
