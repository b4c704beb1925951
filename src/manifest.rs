//! Navigation manifest (sidebar) accumulation.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

/// Collects navigation paths per section across one build.
///
/// Paths are kept in first-registration order with set semantics.
/// [`finalize`](ManifestAccumulator::finalize) consumes the accumulator, so
/// no registration can follow it.
#[derive(Debug, Default)]
pub struct ManifestAccumulator {
    sections: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
    seen: HashSet<(String, String)>,
}

impl ManifestAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` under `section`, ignoring duplicates.
    pub fn register(&mut self, section: &str, path: &str) {
        if !self.seen.insert((section.to_string(), path.to_string())) {
            return;
        }
        let idx = match self.positions.get(section) {
            Some(&i) => i,
            None => {
                self.sections.push((section.to_string(), Vec::new()));
                self.positions.insert(section.to_string(), self.sections.len() - 1);
                self.sections.len() - 1
            }
        };
        self.sections[idx].1.push(path.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize the manifest as pretty JSON, or `None` when nothing was
    /// registered.
    pub fn finalize(self) -> Option<String> {
        if self.sections.is_empty() {
            return None;
        }

        let mut root = Map::new();
        for (section, paths) in self.sections {
            root.insert(
                section,
                Value::Array(paths.into_iter().map(Value::String).collect()),
            );
        }
        let mut out = serde_json::to_string_pretty(&Value::Object(root)).ok()?;
        out.push('\n');
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_accumulator_finalizes_to_none() {
        assert_eq!(ManifestAccumulator::new().finalize(), None);
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut manifest = ManifestAccumulator::new();
        manifest.register("docs", "api/ui/Widget");
        manifest.register("docs", "api/ui/Widget");
        let json = manifest.finalize().unwrap();
        assert_eq!(json, "{\n  \"docs\": [\n    \"api/ui/Widget\"\n  ]\n}\n");
    }

    #[test]
    fn preserves_insertion_order() {
        let mut manifest = ManifestAccumulator::new();
        manifest.register("docs", "zeta");
        manifest.register("api", "b");
        manifest.register("docs", "alpha");
        manifest.register("api", "a");
        manifest.register("docs", "zeta");

        let value: Value = serde_json::from_str(&manifest.finalize().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        let keys: Vec<&String> = obj.keys().collect();
        assert_eq!(keys, vec!["docs", "api"]);
        assert_eq!(obj["docs"], serde_json::json!(["zeta", "alpha"]));
        assert_eq!(obj["api"], serde_json::json!(["b", "a"]));
    }

    #[test]
    fn same_path_in_different_sections_is_kept_in_each() {
        let mut manifest = ManifestAccumulator::new();
        for _ in 0..3 {
            manifest.register("docs", "api/Widget");
            manifest.register("reference", "api/Widget");
        }
        let value: Value = serde_json::from_str(&manifest.finalize().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "docs": ["api/Widget"], "reference": ["api/Widget"] })
        );
    }
}
