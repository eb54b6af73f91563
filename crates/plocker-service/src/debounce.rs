//! Leading-and-trailing debounce for search input.
//!
//! Time is passed in by the caller so the debouncer can be driven by any
//! event loop (and by tests) without owning a timer.

use std::time::{Duration, Instant};

/// Debounce window for the plugin search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Collapses bursts of values into at most two deliveries: the first value of
/// a burst immediately, and the last one once the input has been quiet for
/// the whole window.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    quiet_at: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            quiet_at: None,
            pending: None,
        }
    }

    /// Offers a value. Returns it straight back when it opens a new burst;
    /// otherwise holds it (replacing any held value) and restarts the window.
    pub fn call(&mut self, value: T, now: Instant) -> Option<T> {
        let in_burst = self.quiet_at.is_some_and(|quiet_at| now < quiet_at);
        self.quiet_at = Some(now + self.window);
        if in_burst {
            self.pending = Some(value);
            None
        } else {
            // A held value that was never polled is superseded.
            self.pending = None;
            Some(value)
        }
    }

    /// Releases the held value once the window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.quiet_at {
            Some(quiet_at) if now >= quiet_at => self.pending.take(),
            _ => None,
        }
    }

    /// When the held value becomes available, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.quiet_at)
    }
}
