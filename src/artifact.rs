//! Render one Markdown artifact per indexed item.

use crate::model::{IdentifierRecord, Kind};
use crate::template::{escape_attr, RenderError, TemplateRenderer, GENERIC_HELPER};

/// A rendered artifact on its way to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub kind: Kind,
    pub name: String,
    /// Output subdirectory, `/`-separated, relative to the output root.
    pub dir: String,
    /// File name without `.md`; also the page id on documentation sites.
    pub stem: String,
    pub body: String,
}

/// Block helper and extra attributes used to select `kind`.
///
/// Known kinds have a helper of their own; everything else goes through the
/// generic helper with an explicit `kind` attribute.
fn helper_for(kind: &Kind) -> (&str, Option<&str>) {
    match kind {
        Kind::Other(tag) => (GENERIC_HELPER, Some(tag.as_str())),
        known => (known.as_str(), None),
    }
}

/// Build the selector template for one item.
///
/// `{{#function name="foo" dir="lib"}}{{>docs}}{{/function}}`
pub fn selector(kind: &Kind, name: &str, dir: &str) -> String {
    let (helper, kind_attr) = helper_for(kind);
    let mut attrs = String::new();
    if let Some(tag) = kind_attr {
        attrs.push_str(&format!(" kind=\"{}\"", escape_attr(tag)));
    }
    attrs.push_str(&format!(" name=\"{}\"", escape_attr(name)));
    // an empty dir still narrows to root-level records
    attrs.push_str(&format!(" dir=\"{}\"", escape_attr(dir)));
    format!("{{{{#{helper}{attrs}}}}}{{{{>docs}}}}{{{{/{helper}}}}}")
}

/// Renders artifacts through a [`TemplateRenderer`].
pub struct ArtifactRenderer<'a, R: TemplateRenderer + ?Sized> {
    renderer: &'a R,
    records: &'a [IdentifierRecord],
}

impl<'a, R: TemplateRenderer + ?Sized> ArtifactRenderer<'a, R> {
    pub fn new(renderer: &'a R, records: &'a [IdentifierRecord]) -> Self {
        Self { renderer, records }
    }

    /// Render the item `(kind, name)` found in `dir`, to be written as
    /// `{stem}.md`.
    pub fn render(
        &self,
        kind: &Kind,
        name: &str,
        dir: &str,
        stem: &str,
    ) -> Result<RenderTarget, RenderError> {
        let template = selector(kind, name, dir);
        let body = self.renderer.render(self.records, &template)?;
        Ok(RenderTarget {
            kind: kind.clone(),
            name: name.to_string(),
            dir: dir.to_string(),
            stem: stem.to_string(),
            body,
        })
    }
}
