//! Named operation counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters with names fixed at construction.
///
/// Unknown names are ignored on update and read as zero.
pub struct StatsCounter {
    slots: Vec<(&'static str, AtomicU64)>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            slots: names.iter().map(|&name| (name, AtomicU64::new(0))).collect(),
        }
    }

    fn slot(&self, name: &str) -> Option<&AtomicU64> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, count)| count)
    }

    pub fn increment(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, value: u64) {
        if let Some(count) = self.slot(name) {
            count.fetch_add(value, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.slot(name).map_or(0, |count| count.load(Ordering::Relaxed))
    }

    /// Current values, sorted by name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.slots
            .iter()
            .map(|(name, count)| (*name, count.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_known_names_only() {
        let stats = StatsCounter::new(&["minted", "claimed"]);
        stats.increment("minted");
        stats.add("minted", 4);
        stats.increment("unknown");
        assert_eq!(stats.get("minted"), 5);
        assert_eq!(stats.get("claimed"), 0);
        assert_eq!(stats.get("unknown"), 0);
        assert_eq!(
            stats.snapshot().into_iter().collect::<Vec<_>>(),
            vec![("claimed", 0), ("minted", 5)]
        );
    }
}
