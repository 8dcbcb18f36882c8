use std::time::Duration;

use tokio::time::Instant;

/// Leading-edge debounce: the first call of a burst goes through, later calls are
/// suppressed until `wait` has passed since the most recent call.
#[derive(Clone, Debug)]
pub struct Debouncer {
    wait: Duration,
    last_call: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_call: None,
        }
    }

    /// Records a call and reports whether it may fire.
    pub fn admit(&mut self) -> bool {
        let now = Instant::now();
        let admitted = self
            .last_call
            .is_none_or(|last| now.duration_since(last) >= self.wait);
        self.last_call = Some(now);
        admitted
    }
}

/// Remembers the last lookup prefix that returned nothing, so longer text
/// starting with it is not looked up again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoResultCache {
    entry: Option<(String, String)>,
}

impl NoResultCache {
    #[must_use]
    pub fn covers(&self, tag: &str, query: &str) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|(t, prefix)| t == tag && query.starts_with(prefix.as_str()))
    }

    pub fn record(&mut self, tag: &str, query: &str, empty: bool) {
        self.entry = (empty && !query.is_empty()).then(|| (tag.to_string(), query.to_string()));
    }
}
