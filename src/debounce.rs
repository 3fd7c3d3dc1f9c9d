use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceState {
    Idle,
    Pending { deadline: Instant },
}

/// Trailing edge debouncer for a single text value.
///
/// Every edit re-arms one deadline. Once the deadline passes without another
/// edit, `poll` hands out the latest value exactly once. Time is passed in by
/// the caller so the event loop owns the clock.
#[derive(Debug)]
pub struct Debouncer {
    value: String,
    delay: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(initial: &str, delay: Duration) -> Self {
        Self {
            value: initial.to_string(),
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Overwrite the local value with an externally set one. A pending commit
    /// of an older local edit is dropped.
    pub fn sync(&mut self, external: &str) {
        if self.value != external {
            trace!("Debouncer resync {:?} -> {:?}", self.value, external);
            self.value = external.to_string();
            self.cancel();
        }
    }

    pub fn edit(&mut self, value: impl Into<String>, now: Instant) {
        self.value = value.into();
        self.state = DebounceState::Pending {
            deadline: now + self.delay,
        };
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                trace!("Debouncer commit {:?}", self.value);
                Some(self.value.clone())
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// How long until a pending commit is due, `None` when idle.
    pub fn time_to_deadline(&self, now: Instant) -> Option<Duration> {
        match self.state {
            DebounceState::Pending { deadline } => Some(deadline.saturating_duration_since(now)),
            DebounceState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn rapid_edits_commit_once_with_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("", DELAY);
        let mut commits = Vec::new();

        for (i, v) in ["f", "fi", "fin"].iter().enumerate() {
            let now = t0 + ms(100 * i as u64);
            d.edit(*v, now);
            commits.extend(d.poll(now));
        }
        // 499ms after the last edit nothing is due yet
        commits.extend(d.poll(t0 + ms(200 + 499)));
        assert!(commits.is_empty());

        commits.extend(d.poll(t0 + ms(200 + 500)));
        commits.extend(d.poll(t0 + ms(5000)));
        assert_eq!(commits, vec!["fin".to_string()]);
        assert_eq!(d.state(), DebounceState::Idle);
    }

    #[test]
    fn spaced_edits_commit_each_in_order() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("", DELAY);
        let mut commits = Vec::new();

        for (i, v) in ["a", "ab", "abc"].iter().enumerate() {
            let now = t0 + ms(600 * i as u64);
            commits.extend(d.poll(now));
            d.edit(*v, now);
        }
        commits.extend(d.poll(t0 + ms(600 * 3)));
        assert_eq!(commits, vec!["a", "ab", "abc"]);
    }

    #[test]
    fn edit_restarts_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("", DELAY);
        d.edit("x", t0);
        d.edit("xy", t0 + ms(400));
        assert_eq!(d.poll(t0 + ms(600)), None);
        assert_eq!(d.time_to_deadline(t0 + ms(600)), Some(ms(300)));
        assert_eq!(d.poll(t0 + ms(900)), Some("xy".to_string()));
        assert_eq!(d.time_to_deadline(t0 + ms(900)), None);
    }

    #[test]
    fn sync_overwrites_and_cancels_pending_edit() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("old", DELAY);
        d.edit("typing", t0);
        d.sync("");
        assert_eq!(d.value(), "");
        assert_eq!(d.state(), DebounceState::Idle);
        assert_eq!(d.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn sync_with_same_value_keeps_pending_commit() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("", DELAY);
        d.edit("fin", t0);
        d.sync("fin");
        assert_eq!(d.poll(t0 + DELAY), Some("fin".to_string()));
    }

    #[test]
    fn cancel_drops_pending_commit() {
        let t0 = Instant::now();
        let mut d = Debouncer::new("", DELAY);
        d.edit("abc", t0);
        d.cancel();
        assert_eq!(d.poll(t0 + ms(10_000)), None);
        assert_eq!(d.value(), "abc");
    }
}
