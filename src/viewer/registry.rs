use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::AnimationClip;

/// Loaded clips keyed by animation name.
///
/// Entries are never removed. Registering a name again replaces its clip.
#[derive(Debug, Default, Clone)]
pub struct ClipRegistry {
    clips: FxHashMap<String, Arc<AnimationClip>>,
}

impl ClipRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `clip` under `name`. Returns `true` if the name was new.
    pub fn register(&mut self, name: impl Into<String>, clip: Arc<AnimationClip>) -> bool {
        self.clips.insert(name.into(), clip).is_none()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reregistering_replaces_without_growing() {
        let mut registry = ClipRegistry::new();
        assert!(registry.register("Walking", Arc::new(AnimationClip::new("a", vec![]))));
        assert!(!registry.register("Walking", Arc::new(AnimationClip::new("b", vec![]))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Walking").map(|c| c.name.as_str()), Some("b"));
    }
}
