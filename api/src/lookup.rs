use std::sync::atomic::{AtomicU64, Ordering};

/// Stamp carried by one lookup. Only the most recently issued token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupToken(u64);

/// Monotonic lookup counter. Issuing a new token supersedes every earlier
/// one; results stamped with a stale token must be dropped on arrival.
#[derive(Debug, Default)]
pub struct LookupGenerations {
    current: AtomicU64,
}

impl LookupGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LookupToken {
        LookupToken(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: LookupToken) -> bool {
        self.current.load(Ordering::Acquire) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lookup_supersedes_old() {
        let generations = LookupGenerations::new();
        let first = generations.begin();
        assert!(generations.is_current(first));

        let second = generations.begin();
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
        assert!(second > first);
    }
}
