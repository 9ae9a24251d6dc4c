//! Free-text search over the visible marker set.
//!
//! Queries are normalized with exactly the rule marker `search_text` is
//! built with; if the two sides ever diverge, substring matching silently
//! breaks, so both go through [`normalize`]. Keystrokes commit through a
//! debounced single pending timer, and filtering is memoized on the
//! (query, marker-set generation) pair so unrelated re-renders don't
//! re-filter thousands of markers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Marker;

/// Quiet window before a keystroke commits.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(300);

/// Wider quiet window once the marker set is large.
pub const DEBOUNCE_QUIET_LARGE: Duration = Duration::from_millis(400);

/// Marker count beyond which the wider window (and the loading settle
/// delay) applies.
pub const LARGE_RESULT_THRESHOLD: usize = 5000;

/// Lowercase and strip everything that is not an ASCII letter or digit.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A single cancelable pending timer.
///
/// Each `schedule` cancels the previous timer, so only the most recent
/// action fires. Dropping the debouncer cancels any pending action.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run after `delay`, cancelling any pending one.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Cancel the pending action, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced search input stream.
///
/// Raw keystrokes go in; the committed, normalized query comes out of a
/// watch channel once the user has paused for the quiet window.
#[derive(Debug)]
pub struct SearchInput {
    debouncer: Debouncer,
    committed: watch::Sender<String>,
}

impl SearchInput {
    pub fn new() -> Self {
        let (committed, _) = watch::channel(String::new());
        Self {
            debouncer: Debouncer::new(),
            committed,
        }
    }

    /// Watch the committed query value.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.committed.subscribe()
    }

    /// The currently committed query.
    pub fn committed(&self) -> String {
        self.committed.borrow().clone()
    }

    /// Feed one keystroke's worth of raw input.
    ///
    /// The normalized value commits after the quiet window, which widens
    /// when the active marker set is large.
    pub fn keystroke(&mut self, raw: &str, active_marker_count: usize) {
        let normalized = normalize(raw);
        let delay = if active_marker_count > LARGE_RESULT_THRESHOLD {
            DEBOUNCE_QUIET_LARGE
        } else {
            DEBOUNCE_QUIET
        };

        let committed = self.committed.clone();
        self.debouncer.schedule(delay, move || {
            committed.send_replace(normalized);
        });
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Memo {
    query: String,
    generation: u64,
    results: Arc<Vec<usize>>,
}

/// Memoized substring filter over a marker set.
#[derive(Debug, Default)]
pub struct SearchFilter {
    memo: Option<Memo>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of visible markers whose search text contains `query`.
    ///
    /// An empty query retains every visible marker. `generation` is the
    /// marker-set identity: results are recomputed only when the query or
    /// the generation changes.
    pub fn apply(&mut self, query: &str, markers: &[Marker], generation: u64) -> Arc<Vec<usize>> {
        let query = normalize(query);

        if let Some(memo) = &self.memo {
            if memo.query == query && memo.generation == generation {
                return Arc::clone(&memo.results);
            }
        }

        let results: Arc<Vec<usize>> = Arc::new(
            markers
                .iter()
                .enumerate()
                .filter(|(_, m)| m.visible && (query.is_empty() || m.search_text.contains(&query)))
                .map(|(i, _)| i)
                .collect(),
        );

        self.memo = Some(Memo {
            query,
            generation,
            results: Arc::clone(&results),
        });
        results
    }
}
