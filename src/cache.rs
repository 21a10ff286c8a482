//! Install-state cache, private to one manager façade.

use std::collections::HashMap;

/// Resolved state of a single atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallState {
    pub installed: bool,
    pub up_to_date: bool,
}

impl InstallState {
    /// Not installed. Also the conservative default for anything the
    /// output resolver could not account for.
    pub const MISSING: Self = Self {
        installed: false,
        up_to_date: false,
    };

    /// Installed and current.
    pub const CURRENT: Self = Self {
        installed: true,
        up_to_date: true,
    };

    /// Installed but an update is pending.
    pub const STALE: Self = Self {
        installed: true,
        up_to_date: false,
    };

    /// A package cannot be up to date without being installed.
    pub fn new(installed: bool, up_to_date: bool) -> Self {
        Self {
            installed,
            up_to_date: installed && up_to_date,
        }
    }
}

/// Mapping from raw atom specifier to resolved state.
///
/// Owned by exactly one façade instance and never shared across processes.
/// Absence of an entry means "unknown, must be resolved". The cache is
/// cleared wholesale after a successful install: an install can change
/// transitive state that cannot be attributed atom-by-atom.
#[derive(Debug, Default)]
pub struct StateCache {
    entries: HashMap<String, InstallState>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<InstallState> {
        self.entries.get(raw).copied()
    }

    pub fn insert(&mut self, raw: impl Into<String>, state: InstallState) {
        self.entries
            .insert(raw.into(), InstallState::new(state.installed, state.up_to_date));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_normalizes_impossible_state() {
        let mut cache = StateCache::new();
        cache.insert(
            "foo",
            InstallState {
                installed: false,
                up_to_date: true,
            },
        );
        let state = cache.get("foo").unwrap();
        assert!(!state.installed);
        assert!(!state.up_to_date);
    }

    #[test]
    fn test_distinct_raw_specifiers_are_tracked_independently() {
        let mut cache = StateCache::new();
        cache.insert("sys-apps/foo", InstallState::CURRENT);
        assert!(cache.get(">=sys-apps/foo-1.0").is_none());
        assert_eq!(cache.get("sys-apps/foo"), Some(InstallState::CURRENT));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut cache = StateCache::new();
        cache.insert("a", InstallState::CURRENT);
        cache.insert("b", InstallState::MISSING);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
