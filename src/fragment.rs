use std::sync::Mutex;

use crate::events::SLUG;

/// Where the navigational URL fragment lives. Hosts embedding the engine in a
/// browser-like environment bridge this to the real location bar; everyone
/// else gets [`MemoryFragment`].
pub trait FragmentStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, fragment: String);
    fn clear(&self);
}

/// In-memory fragment store.
#[derive(Debug, Default)]
pub struct MemoryFragment {
    value: Mutex<Option<String>>,
}

impl MemoryFragment {
    pub fn with_value(fragment: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(fragment.into())),
        }
    }
}

impl FragmentStore for MemoryFragment {
    fn get(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    fn set(&self, fragment: String) {
        *self.value.lock().unwrap() = Some(fragment);
    }

    fn clear(&self) {
        *self.value.lock().unwrap() = None;
    }
}

/// Encodes `"<slug>-<identity>-<oneBasedIndex>"`, e.g. `asg-7f3-4` for the
/// fourth item of instance `7f3`.
pub fn encode(id: &str, index: usize) -> String {
    format!("{SLUG}-{id}-{}", index + 1)
}

/// Parses a fragment back into a zero-based index. Malformed fragments,
/// mismatched slugs or identities, and non-positive ordinals yield `None`.
pub fn parse(fragment: &str, id: &str) -> Option<usize> {
    let parts: Vec<&str> = fragment.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    if parts[0] != SLUG || parts[1] != id {
        return None;
    }
    let ordinal: usize = parts[2].parse().ok()?;
    ordinal.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(encode("7f3", 3), "asg-7f3-4");
        assert_eq!(parse("asg-7f3-4", "7f3"), Some(3));
    }

    #[test]
    fn rejects_wrong_slug_or_identity() {
        assert_eq!(parse("xyz-7f3-4", "7f3"), None);
        assert_eq!(parse("asg-abc-4", "7f3"), None);
    }

    #[test]
    fn rejects_malformed_fragments() {
        assert_eq!(parse("", "7f3"), None);
        assert_eq!(parse("asg-7f3", "7f3"), None);
        assert_eq!(parse("asg-7f3-4-extra", "7f3"), None);
        assert_eq!(parse("asg-7f3-four", "7f3"), None);
        // ordinals are one-based
        assert_eq!(parse("asg-7f3-0", "7f3"), None);
    }

    #[test]
    fn memory_store_set_get_clear() {
        let store = MemoryFragment::default();
        assert_eq!(store.get(), None);
        store.set("asg-a-1".into());
        assert_eq!(store.get().as_deref(), Some("asg-a-1"));
        store.clear();
        assert_eq!(store.get(), None);
    }
}
