//! Generation-tracked state slots.
//!
//! Every asynchronous load is stamped with the slot's generation when it
//! starts. A completion is applied only if its generation is still the live
//! one, so a response that was superseded (newer fetch, parameter change,
//! tab change, teardown) is dropped on arrival no matter when it lands.

/// Identity of one started fetch within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out generations and remembers which one is live.
#[derive(Debug, Default)]
pub struct Tracker {
    latest: u64,
    live: bool,
}

impl Tracker {
    /// Start a new operation, superseding any live one.
    pub fn start(&mut self) -> Generation {
        self.latest += 1;
        self.live = true;
        Generation(self.latest)
    }

    /// Drop the live operation; its completion will be ignored.
    pub fn cancel(&mut self) {
        self.live = false;
    }

    /// Accept a completion. Returns false for anything but the live generation.
    pub fn finish(&mut self, generation: Generation) -> bool {
        if self.live && generation.0 == self.latest {
            self.live = false;
            true
        } else {
            false
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
    Failed,
}

/// A lazily fetched dataset keyed by its load-determining parameter `K`.
///
/// `K` is `()` for datasets without a parameter.
#[derive(Debug)]
pub struct Slot<K, T> {
    state: LoadState<T>,
    key: Option<K>,
    tracker: Tracker,
}

impl<K, T> Default for Slot<K, T> {
    fn default() -> Self {
        Self {
            state: LoadState::NotLoaded,
            key: None,
            tracker: Tracker::default(),
        }
    }
}

impl<K: PartialEq, T> Slot<K, T> {
    /// Whether a fetch for `key` should be issued now.
    ///
    /// True when nothing is loaded or the parameter changed. A failed load
    /// with the same parameter is not retried until invalidated.
    pub fn needs_load(&self, key: &K) -> bool {
        match self.state {
            LoadState::NotLoaded => true,
            _ => self.key.as_ref() != Some(key),
        }
    }

    /// Enter `Loading` for `key` and return the generation of the new fetch.
    pub fn begin(&mut self, key: K) -> Generation {
        self.state = LoadState::Loading;
        self.key = Some(key);
        self.tracker.start()
    }

    /// Apply a completion. Returns false (and changes nothing) when stale.
    pub fn resolve<E>(&mut self, generation: Generation, result: Result<T, E>) -> bool {
        if !self.tracker.finish(generation) {
            return false;
        }
        self.state = match result {
            Ok(data) => LoadState::Loaded(data),
            Err(_) => LoadState::Failed,
        };
        true
    }

    /// Abandon an in-flight fetch and fall back to `NotLoaded`.
    /// Loaded data is left alone.
    pub fn cancel(&mut self) {
        if matches!(self.state, LoadState::Loading) {
            self.tracker.cancel();
            self.state = LoadState::NotLoaded;
            self.key = None;
        }
    }

    /// Discard everything so the next `needs_load` is true.
    pub fn invalidate(&mut self) {
        self.tracker.cancel();
        self.state = LoadState::NotLoaded;
        self.key = None;
    }
}

impl<K, T> Slot<K, T> {
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Rows = Slot<&'static str, Vec<u32>>;

    #[test]
    fn later_fetch_wins_in_either_arrival_order() {
        // B arrives first, then A.
        let mut slot = Rows::default();
        let a = slot.begin("all");
        let b = slot.begin("month");
        assert!(slot.resolve::<()>(b, Ok(vec![2])));
        assert!(!slot.resolve::<()>(a, Ok(vec![1])));
        assert_eq!(slot.data(), Some(&vec![2]));

        // A arrives first, then B.
        let mut slot = Rows::default();
        let a = slot.begin("all");
        let b = slot.begin("month");
        assert!(!slot.resolve::<()>(a, Ok(vec![1])));
        assert!(slot.is_loading());
        assert!(slot.resolve::<()>(b, Ok(vec![2])));
        assert_eq!(slot.data(), Some(&vec![2]));
    }

    #[test]
    fn stale_failure_does_not_clobber_data() {
        let mut slot = Rows::default();
        let a = slot.begin("all");
        let b = slot.begin("all");
        assert!(slot.resolve::<()>(b, Ok(vec![7])));
        assert!(!slot.resolve(a, Err("boom")));
        assert_eq!(slot.data(), Some(&vec![7]));
    }

    #[test]
    fn cancelled_fetch_is_ignored_and_slot_reloads() {
        let mut slot = Rows::default();
        let a = slot.begin("all");
        slot.cancel();
        assert_eq!(slot.state(), &LoadState::NotLoaded);
        assert!(!slot.resolve::<()>(a, Ok(vec![1])));
        assert!(slot.needs_load(&"all"));
    }

    #[test]
    fn cancel_keeps_loaded_data() {
        let mut slot = Rows::default();
        let a = slot.begin("all");
        slot.resolve::<()>(a, Ok(vec![1]));
        slot.cancel();
        assert_eq!(slot.data(), Some(&vec![1]));
        assert!(!slot.needs_load(&"all"));
    }

    #[test]
    fn needs_load_follows_parameter() {
        let mut slot = Rows::default();
        assert!(slot.needs_load(&"all"));
        let g = slot.begin("all");
        assert!(!slot.needs_load(&"all"));
        slot.resolve::<()>(g, Ok(vec![]));
        assert!(!slot.needs_load(&"all"));
        assert!(slot.needs_load(&"week"));
    }

    #[test]
    fn failure_is_not_retried_until_invalidated() {
        let mut slot = Rows::default();
        let g = slot.begin("all");
        assert!(slot.resolve(g, Err("down")));
        assert_eq!(slot.state(), &LoadState::Failed);
        assert!(!slot.needs_load(&"all"));
        slot.invalidate();
        assert!(slot.needs_load(&"all"));
    }

    #[test]
    fn tracker_rejects_after_finish() {
        let mut tracker = Tracker::default();
        let g = tracker.start();
        assert!(tracker.is_live());
        assert!(tracker.finish(g));
        assert!(!tracker.finish(g));
        assert!(!tracker.is_live());
    }
}
