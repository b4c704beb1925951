//! Site adapters decorate rendered artifacts for a documentation site.
//!
//! The adapter is picked once from the documentor name and handed to the
//! render loop by reference. Unrecognized names fall back to [`SiteAdapter::Null`].

use crate::artifact::RenderTarget;
use crate::config::DocumentorConfig;
use crate::manifest::ManifestAccumulator;

/// Front matter and navigation entry for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDecoration {
    pub front_matter: String,
    pub navigation_key: String,
}

#[derive(Debug, Clone)]
pub enum SiteAdapter {
    /// Leaves artifacts untouched and never contributes to the manifest.
    Null,
    /// Docusaurus-style front matter plus a sidebar entry per artifact.
    Sectioned(SectionedAdapter),
}

#[derive(Debug, Clone)]
pub struct SectionedAdapter {
    section_key: String,
    header: Option<String>,
}

impl SiteAdapter {
    /// Select the adapter named by `documentor`.
    pub fn from_config(documentor: Option<&DocumentorConfig>) -> Self {
        let Some(config) = documentor else {
            return SiteAdapter::Null;
        };
        match config.name.as_deref() {
            Some("docusaurus") => SiteAdapter::Sectioned(SectionedAdapter {
                section_key: config.section_key().to_string(),
                header: config.header.clone().filter(|h| !h.is_empty()),
            }),
            _ => SiteAdapter::Null,
        }
    }

    /// Whether this adapter registers navigation entries.
    pub fn produces_manifest(&self) -> bool {
        matches!(self, SiteAdapter::Sectioned(_))
    }

    /// Compute the decoration for `target` without applying it.
    pub fn decoration(&self, target: &RenderTarget) -> Option<SiteDecoration> {
        match self {
            SiteAdapter::Null => None,
            SiteAdapter::Sectioned(adapter) => Some(adapter.decoration(target)),
        }
    }

    /// Prepend front matter to `target` and register its navigation entry.
    pub fn decorate(
        &self,
        mut target: RenderTarget,
        manifest: &mut ManifestAccumulator,
    ) -> RenderTarget {
        if let SiteAdapter::Sectioned(adapter) = self {
            let decoration = adapter.decoration(&target);
            manifest.register(&adapter.section_key, &decoration.navigation_key);
            target.body.insert_str(0, &decoration.front_matter);
        }
        target
    }
}

impl SectionedAdapter {
    fn decoration(&self, target: &RenderTarget) -> SiteDecoration {
        // the id must match the file written, the label shows the real name
        let name = &target.name;
        let front_matter = format!(
            "---\nid: {}\ntitle: {}\nsidebar_label: {}\n---\n\n",
            target.stem, name, name
        );

        let parts = [
            self.header.as_deref(),
            Some(target.dir.as_str()),
            Some(target.stem.as_str()),
        ];
        let navigation_key = parts
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        SiteDecoration {
            front_matter,
            navigation_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;

    fn docusaurus(header: Option<&str>) -> SiteAdapter {
        SiteAdapter::from_config(Some(&DocumentorConfig {
            name: Some("docusaurus".to_string()),
            header: header.map(str::to_string),
            ..Default::default()
        }))
    }

    fn target(kind: Kind, name: &str, dir: &str) -> RenderTarget {
        RenderTarget {
            kind,
            name: name.to_string(),
            dir: dir.to_string(),
            stem: name.to_string(),
            body: "# body\n".to_string(),
        }
    }

    #[test]
    fn null_adapter_is_a_no_op() {
        let adapter = SiteAdapter::from_config(None);
        let mut manifest = ManifestAccumulator::new();
        let out = adapter.decorate(target(Kind::Function, "foo", "lib"), &mut manifest);
        assert_eq!(out.body, "# body\n");
        assert!(manifest.is_empty());
        assert!(!adapter.produces_manifest());
    }

    #[test]
    fn unknown_documentor_behaves_as_null() {
        let adapter = SiteAdapter::from_config(Some(&DocumentorConfig {
            name: Some("mkdocs".to_string()),
            ..Default::default()
        }));
        assert!(matches!(adapter, SiteAdapter::Null));
    }

    #[test]
    fn front_matter_uses_name_for_all_fields() {
        let adapter = docusaurus(None);
        let mut manifest = ManifestAccumulator::new();
        let out = adapter.decorate(target(Kind::Class, "Widget", ""), &mut manifest);
        assert_eq!(
            out.body,
            "---\nid: Widget\ntitle: Widget\nsidebar_label: Widget\n---\n\n# body\n"
        );
    }

    #[test]
    fn navigation_key_joins_header_dir_and_name() {
        let adapter = docusaurus(Some("api"));
        let deco = adapter
            .decoration(&target(Kind::Class, "Widget", "ui"))
            .unwrap();
        assert_eq!(deco.navigation_key, "api/ui/Widget");

        let deco = adapter
            .decoration(&target(Kind::Function, "foo", ""))
            .unwrap();
        assert_eq!(deco.navigation_key, "api/foo");
    }

    #[test]
    fn id_and_navigation_key_follow_the_file_stem() {
        let adapter = docusaurus(Some("api"));
        let mut module = target(Kind::Module, "utils/string", "");
        module.stem = "utils_string".to_string();
        let deco = adapter.decoration(&module).unwrap();
        assert_eq!(
            deco.front_matter,
            "---\nid: utils_string\ntitle: utils/string\nsidebar_label: utils/string\n---\n\n"
        );
        assert_eq!(deco.navigation_key, "api/utils_string");
    }

    #[test]
    fn navigation_key_without_header() {
        let adapter = docusaurus(None);
        let deco = adapter
            .decoration(&target(Kind::Function, "foo", "lib/util"))
            .unwrap();
        assert_eq!(deco.navigation_key, "lib/util/foo");
    }

    #[test]
    fn decorate_registers_under_section_key() {
        let adapter = docusaurus(Some("api"));
        let mut manifest = ManifestAccumulator::new();
        adapter.decorate(target(Kind::Class, "Widget", "ui"), &mut manifest);
        adapter.decorate(target(Kind::Class, "Widget", "ui"), &mut manifest);
        let json = manifest.finalize().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["docs"], serde_json::json!(["api/ui/Widget"]));
    }
}
