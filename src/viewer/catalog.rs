use serde::{Deserialize, Serialize};

/// Placeholder replaced by the animation name in [`AnimationCatalog::path_template`].
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Order in which clip files are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Request every clip file at once. The first file to finish supplies the
    /// model, and a clip matching the current selection plays on arrival.
    Independent,
    /// Load `base` first. Its model is attached and its clip registered under
    /// `base` and played; the catalog clips are requested afterwards.
    BaseFirst { base: String },
}

/// The fixed set of animations a viewer offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationCatalog {
    /// Names shown in the dropdown, in display order.
    pub clips: Vec<String>,
    /// Initial dropdown selection.
    pub initial: String,
    /// Relative asset path with a `{name}` placeholder.
    pub path_template: String,
    pub strategy: LoadStrategy,
}

impl Default for AnimationCatalog {
    fn default() -> Self {
        Self::showcase()
    }
}

impl AnimationCatalog {
    /// Six independently loaded clips, starting on "Praying".
    #[must_use]
    pub fn showcase() -> Self {
        Self {
            clips: ["Praying", "Walking", "Running", "Jumping", "Waving", "Dancing"]
                .map(String::from)
                .to_vec(),
            initial: "Praying".to_string(),
            path_template: "models/gltf/{name}.glb".to_string(),
            strategy: LoadStrategy::Independent,
        }
    }

    /// A "Capoeira" base character followed by five clips. The selection
    /// starts on "Dancing" while the base clip plays.
    #[must_use]
    pub fn capoeira() -> Self {
        Self {
            clips: ["Dancing", "Punching", "Punching Bag", "Dying", "Jumping"]
                .map(String::from)
                .to_vec(),
            initial: "Dancing".to_string(),
            path_template: "models/gltf/{name}.glb".to_string(),
            strategy: LoadStrategy::BaseFirst {
                base: "Capoeira".to_string(),
            },
        }
    }

    /// Relative path of the file holding animation `name`.
    #[must_use]
    pub fn uri_for(&self, name: &str) -> String {
        self.path_template.replace(NAME_PLACEHOLDER, name)
    }

    #[must_use]
    pub fn base(&self) -> Option<&str> {
        match &self.strategy {
            LoadStrategy::Independent => None,
            LoadStrategy::BaseFirst { base } => Some(base),
        }
    }

    /// Clip names requested after the base, excluding the base itself.
    pub fn dependent_clips(&self) -> impl Iterator<Item = &str> {
        let base = self.base();
        self.clips
            .iter()
            .map(String::as_str)
            .filter(move |name| Some(*name) != base)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_substitutes_name_with_spaces() {
        let catalog = AnimationCatalog::capoeira();
        assert_eq!(catalog.uri_for("Punching Bag"), "models/gltf/Punching Bag.glb");
    }

    #[test]
    fn base_is_never_a_dependent() {
        let mut catalog = AnimationCatalog::capoeira();
        catalog.clips.push("Capoeira".to_string());
        assert!(catalog.dependent_clips().all(|c| c != "Capoeira"));
        assert_eq!(catalog.dependent_clips().count(), 5);
    }
}
