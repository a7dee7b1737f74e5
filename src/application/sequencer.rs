use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Groups of requests that supersede each other. A new trades fetch makes
/// any older trades fetch stale, but leaves a journal fetch alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCategory {
    Trades,
    Positions,
    Journal,
    Insights,
    Dashboard,
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestCategory::Trades => write!(f, "trades"),
            RequestCategory::Positions => write!(f, "positions"),
            RequestCategory::Journal => write!(f, "journal"),
            RequestCategory::Insights => write!(f, "insights"),
            RequestCategory::Dashboard => write!(f, "dashboard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub category: RequestCategory,
    pub id: u64,
}

/// Hands out monotonically increasing request ids and remembers the newest
/// one per category. Only a response whose ticket is still the newest may be
/// written into view state.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    counter: AtomicU64,
    latest: Mutex<HashMap<RequestCategory, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, category: RequestCategory) -> RequestTicket {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut latest) = self.latest.lock() {
            latest.insert(category, id);
        }
        RequestTicket { category, id }
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest
            .lock()
            .map(|latest| latest.get(&ticket.category) == Some(&ticket.id))
            .unwrap_or(false)
    }

    /// Await `fut` under a fresh ticket. Yields `None` when a newer request in
    /// the same category was issued while this one was in flight.
    pub async fn run<F, T>(&self, category: RequestCategory, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.issue(category);
        let out = fut.await;
        if self.is_current(ticket) {
            Some(out)
        } else {
            debug!("dropping stale {category} response #{}", ticket.id);
            None
        }
    }
}
