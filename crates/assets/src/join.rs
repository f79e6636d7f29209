use std::collections::BTreeSet;
use std::fmt::Debug;

/// Summary handed out when a [`LoadJoin`] fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport<K> {
    pub loaded: Vec<K>,
    pub failed: Vec<K>,
}

impl<K> JoinReport<K> {
    pub fn all_loaded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Join over a fixed set of required loads.
///
/// Each key is settled at most once, as success or failure. The join fires
/// exactly once: the first [`LoadJoin::take_ready`] after every key has
/// settled returns the report, later calls return `None`.
#[derive(Debug, Clone)]
pub struct LoadJoin<K: Ord> {
    pending: BTreeSet<K>,
    loaded: Vec<K>,
    failed: Vec<K>,
    fired: bool,
}

impl<K: Ord + Clone + Debug> LoadJoin<K> {
    pub fn new(required: impl IntoIterator<Item = K>) -> Self {
        Self {
            pending: required.into_iter().collect(),
            loaded: Vec::new(),
            failed: Vec::new(),
            fired: false,
        }
    }

    /// Record the outcome for `key`. Unknown or already settled keys are
    /// ignored and return `false`.
    pub fn settle(&mut self, key: &K, ok: bool) -> bool {
        if !self.pending.remove(key) {
            tracing::debug!(?key, "ignoring settle for key not pending");
            return false;
        }
        if ok {
            self.loaded.push(key.clone());
        } else {
            self.failed.push(key.clone());
        }
        true
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn take_ready(&mut self) -> Option<JoinReport<K>> {
        if self.fired || !self.pending.is_empty() {
            return None;
        }
        self.fired = true;
        Some(JoinReport {
            loaded: self.loaded.clone(),
            failed: self.failed.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_every_key_settles() {
        let mut join = LoadJoin::new(["wood", "brick", "model"]);
        assert!(join.settle(&"brick", true));
        assert!(join.take_ready().is_none());
        assert!(join.settle(&"wood", true));
        assert!(join.take_ready().is_none());
        assert_eq!(join.remaining(), 1);

        assert!(join.settle(&"model", false));
        let report = join.take_ready().unwrap();
        assert_eq!(report.loaded, vec!["brick", "wood"]);
        assert_eq!(report.failed, vec!["model"]);
        assert!(!report.all_loaded());
    }

    #[test]
    fn fires_exactly_once() {
        let mut join = LoadJoin::new([1, 2]);
        join.settle(&1, true);
        join.settle(&2, true);
        assert!(join.take_ready().is_some());
        assert!(join.has_fired());
        assert!(join.take_ready().is_none());
        assert!(join.take_ready().is_none());
    }

    #[test]
    fn repeat_and_unknown_settles_are_ignored() {
        let mut join = LoadJoin::new(["a"]);
        assert!(!join.settle(&"zzz", true));
        assert!(join.settle(&"a", false));
        assert!(!join.settle(&"a", true));
        let report = join.take_ready().unwrap();
        assert!(report.loaded.is_empty());
        assert_eq!(report.failed, vec!["a"]);
    }

    #[test]
    fn empty_join_fires_on_first_check() {
        let mut join: LoadJoin<u8> = LoadJoin::new([]);
        assert_eq!(join.remaining(), 0);
        assert!(join.take_ready().unwrap().all_loaded());
    }
}
