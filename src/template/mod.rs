//! Selector templates: a small subset of handlebars.
//!
//! Supported syntax:
//!
//! - `{{#function name="foo"}}…{{/function}}` narrows the record scope to
//!   records of that kind matching every attribute (`name`, `dir`, `memberof`).
//!   `{{#identifier kind="x"}}` selects by arbitrary kind tag.
//! - `{{>docs}}`, `{{>header}}`, `{{>body}}` render the records in scope.
//! - Everything else is literal text.

pub mod markdown;

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{IdentifierRecord, Kind};
use crate::path_map::PathMapper;

/// Name of the block helper that selects by `kind` attribute.
pub const GENERIC_HELPER: &str = "identifier";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown block helper `{0}`")]
    UnknownHelper(String),

    #[error("unknown partial `{0}`")]
    UnknownPartial(String),

    #[error("unexpected `{{{{/{found}}}}}`, expected `{{{{/{expected}}}}}`")]
    MismatchedClose { expected: String, found: String },

    #[error("unclosed block `{0}`")]
    Unclosed(String),

    #[error("malformed attribute list `{0}`")]
    BadAttributes(String),
}

/// Turns the full record set plus a template into Markdown.
pub trait TemplateRenderer {
    fn render(&self, records: &[IdentifierRecord], template: &str) -> Result<String, RenderError>;
}

/// The built-in [`TemplateRenderer`].
///
/// The `dir` attribute is matched against each record's source directory
/// relative to `mapper`'s root.
#[derive(Debug, Clone)]
pub struct SelectorRenderer {
    mapper: PathMapper,
}

impl SelectorRenderer {
    pub fn new(mapper: PathMapper) -> Self {
        Self { mapper }
    }
}

impl TemplateRenderer for SelectorRenderer {
    fn render(&self, records: &[IdentifierRecord], template: &str) -> Result<String, RenderError> {
        let nodes = parse(template)?;
        let scope: Vec<&IdentifierRecord> = records.iter().collect();
        let mut out = String::new();
        self.eval(&nodes, &scope, records, &mut out)?;
        Ok(out)
    }
}

// -- Parsing ------------------------------------------------------------------

// Quoted attribute values may contain `}`
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([#/>]?)\s*([A-Za-z_][\w-]*)((?:[^}"]|"(?:[^"\\]|\\.)*")*)\}\}"#)
        .unwrap()
});

// Values may contain `\"` and `\\`
static RE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*([A-Za-z_]\w*)\s*=\s*"((?:[^"\\]|\\.)*)"\s*"#).unwrap()
});

#[derive(Debug, PartialEq)]
enum Node {
    Text(String),
    Partial(String),
    Block {
        helper: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
}

fn parse(template: &str) -> Result<Vec<Node>, RenderError> {
    // Stack of open blocks; the bottom frame is the template root.
    let mut stack: Vec<(String, Vec<(String, String)>, Vec<Node>)> =
        vec![(String::new(), Vec::new(), Vec::new())];
    let mut last = 0;

    for caps in RE_TAG.captures_iter(template) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole.start > last {
            push_node(&mut stack, Node::Text(template[last..whole.start].to_string()));
        }
        last = whole.end;

        let name = caps[2].to_string();
        match &caps[1] {
            "#" => stack.push((name, parse_attrs(&caps[3])?, Vec::new())),
            "/" => {
                if stack.len() == 1 {
                    return Err(RenderError::MismatchedClose {
                        expected: String::new(),
                        found: name,
                    });
                }
                let (helper, attrs, children) = stack.pop().unwrap_or_default();
                if helper != name {
                    return Err(RenderError::MismatchedClose {
                        expected: helper,
                        found: name,
                    });
                }
                push_node(&mut stack, Node::Block { helper, attrs, children });
            }
            ">" => push_node(&mut stack, Node::Partial(name)),
            _ => push_node(&mut stack, Node::Text(caps[0].to_string())),
        }
    }

    if last < template.len() {
        push_node(&mut stack, Node::Text(template[last..].to_string()));
    }

    if stack.len() > 1 {
        let (helper, _, _) = stack.pop().unwrap_or_default();
        return Err(RenderError::Unclosed(helper));
    }
    Ok(stack.pop().map(|(_, _, nodes)| nodes).unwrap_or_default())
}

fn push_node(stack: &mut [(String, Vec<(String, String)>, Vec<Node>)], node: Node) {
    if let Some((_, _, nodes)) = stack.last_mut() {
        nodes.push(node);
    }
}

fn parse_attrs(raw: &str) -> Result<Vec<(String, String)>, RenderError> {
    let mut attrs = Vec::new();
    let mut consumed = 0;
    for caps in RE_ATTR.captures_iter(raw) {
        let m = caps.get(0).map_or(0..0, |m| m.range());
        if m.start != consumed {
            break;
        }
        consumed = m.end;
        attrs.push((caps[1].to_string(), unescape_attr(&caps[2])));
    }
    if !raw[consumed..].trim().is_empty() {
        return Err(RenderError::BadAttributes(raw.trim().to_string()));
    }
    Ok(attrs)
}

/// Inverse of [`escape_attr`].
fn unescape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// -- Evaluation ---------------------------------------------------------------

impl SelectorRenderer {
    fn eval(
        &self,
        nodes: &[Node],
        scope: &[&IdentifierRecord],
        all: &[IdentifierRecord],
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Partial(name) => {
                    for record in scope {
                        let rendered = match name.as_str() {
                            "docs" => markdown::render_docs(record, &self.members_of(record, all)),
                            "header" => markdown::render_header(record, 2),
                            "body" => markdown::render_body(record, &self.members_of(record, all), 2),
                            other => return Err(RenderError::UnknownPartial(other.to_string())),
                        };
                        out.push_str(&rendered);
                    }
                }
                Node::Block {
                    helper,
                    attrs,
                    children,
                } => {
                    let kind = helper_kind(helper, attrs)?;
                    let narrowed: Vec<&IdentifierRecord> = scope
                        .iter()
                        .copied()
                        .filter(|r| kind.as_ref().map_or(true, |k| &r.kind == k))
                        .filter(|r| self.matches(r, attrs))
                        .collect();
                    self.eval(children, &narrowed, all, out)?;
                }
            }
        }
        Ok(())
    }

    /// Records documented as members of `parent` from the same directory.
    fn members_of<'r>(
        &self,
        parent: &IdentifierRecord,
        all: &'r [IdentifierRecord],
    ) -> Vec<&'r IdentifierRecord> {
        let dir = self.mapper.map(parent.source_path.as_deref()).ok();
        all.iter()
            .filter(|r| r.member_of.as_deref() == Some(parent.name.as_str()))
            .filter(|r| self.mapper.map(r.source_path.as_deref()).ok() == dir)
            .collect()
    }

    fn matches(&self, record: &IdentifierRecord, attrs: &[(String, String)]) -> bool {
        attrs.iter().all(|(key, value)| match key.as_str() {
            "name" => record.name == *value,
            "dir" => self
                .mapper
                .map(record.source_path.as_deref())
                .is_ok_and(|dir| dir == *value),
            "memberof" => record.member_of.as_deref() == Some(value.as_str()),
            // `kind` is applied by the helper itself
            _ => true,
        })
    }
}

/// Kind selected by a block helper. `identifier` without a `kind`
/// attribute selects every kind.
fn helper_kind(helper: &str, attrs: &[(String, String)]) -> Result<Option<Kind>, RenderError> {
    if helper == GENERIC_HELPER {
        return Ok(attrs
            .iter()
            .find(|(k, _)| k == "kind")
            .map(|(_, v)| Kind::from_tag(v)));
    }
    match Kind::from_tag(helper) {
        Kind::Other(_) => Err(RenderError::UnknownHelper(helper.to_string())),
        known => Ok(Some(known)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> SelectorRenderer {
        SelectorRenderer::new(PathMapper::new("/proj/src"))
    }

    fn records() -> Vec<IdentifierRecord> {
        let mut foo = IdentifierRecord::new("foo", Kind::Function).with_source("/proj/src/lib/foo.js");
        foo.description = Some("Does foo things.".to_string());
        let mut foo_b = IdentifierRecord::new("foo", Kind::Function).with_source("/proj/src/alt/foo.js");
        foo_b.description = Some("Another foo.".to_string());
        let widget = IdentifierRecord::new("foo", Kind::Class).with_source("/proj/src/lib/foo.js");
        vec![foo, foo_b, widget]
    }

    #[test]
    fn parses_nested_blocks() {
        let nodes = parse(r#"a{{#class name="X"}}{{>docs}}{{/class}}b"#).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::Text("a".to_string()));
        match &nodes[1] {
            Node::Block { helper, attrs, children } => {
                assert_eq!(helper, "class");
                assert_eq!(attrs, &vec![("name".to_string(), "X".to_string())]);
                assert_eq!(children, &vec![Node::Partial("docs".to_string())]);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn tolerates_space_before_equals() {
        let nodes = parse(r#"{{#function name ="foo"}}{{/function}}"#).unwrap();
        assert!(matches!(&nodes[0], Node::Block { attrs, .. } if attrs[0].1 == "foo"));
    }

    #[test]
    fn selects_by_kind_and_name() {
        let out = renderer()
            .render(&records(), r#"{{#function name="foo"}}{{>header}}{{/function}}"#)
            .unwrap();
        // both functions named foo, not the class
        assert_eq!(out.matches("## foo()").count(), 2);
    }

    #[test]
    fn dir_attribute_narrows_to_one_record() {
        let out = renderer()
            .render(&records(), r#"{{#function name="foo" dir="alt"}}{{>docs}}{{/function}}"#)
            .unwrap();
        assert!(out.contains("Another foo."));
        assert!(!out.contains("Does foo things."));
    }

    #[test]
    fn generic_helper_selects_unknown_kinds() {
        let recs = vec![IdentifierRecord::new("onDone", Kind::Other("callback".into()))];
        let out = renderer()
            .render(&recs, r#"{{#identifier kind="callback" name="onDone"}}{{>header}}{{/identifier}}"#)
            .unwrap();
        assert!(out.contains("## onDone"));
    }

    #[test]
    fn no_match_renders_nothing() {
        let out = renderer()
            .render(&records(), r#"{{#enum name="foo"}}{{>docs}}{{/enum}}"#)
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn rendering_is_pure() {
        let recs = records();
        let tpl = r#"{{#function name="foo" dir="lib"}}{{>docs}}{{/function}}"#;
        let first = renderer().render(&recs, tpl).unwrap();
        let second = renderer().render(&recs, tpl).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_partial_is_an_error() {
        let err = renderer()
            .render(&records(), "{{#function}}{{>nope}}{{/function}}")
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownPartial(p) if p == "nope"));
    }

    #[test]
    fn unknown_helper_is_an_error() {
        let err = renderer().render(&records(), "{{#each}}{{/each}}").unwrap_err();
        assert!(matches!(err, RenderError::UnknownHelper(h) if h == "each"));
    }

    #[test]
    fn unbalanced_blocks_are_errors() {
        assert!(matches!(
            parse("{{#class}}{{/function}}"),
            Err(RenderError::MismatchedClose { .. })
        ));
        assert!(matches!(parse("{{#class}}"), Err(RenderError::Unclosed(h)) if h == "class"));
        assert!(matches!(parse("{{/class}}"), Err(RenderError::MismatchedClose { .. })));
    }

    #[test]
    fn names_with_quotes_and_braces_still_match() {
        for name in [r#"say"hi""#, r"back\slash", "curly}}"] {
            let mut rec = IdentifierRecord::new(name, Kind::Function).with_source("/proj/src/x.js");
            rec.description = Some("Found it.".to_string());
            let tpl = crate::artifact::selector(&Kind::Function, name, "");
            let out = renderer().render(&[rec], &tpl).unwrap();
            assert!(out.contains("Found it."), "{name}: {out:?}");
        }
    }

    #[test]
    fn escape_round_trip() {
        let raw = r#"a"b\c"#;
        assert_eq!(unescape_attr(&escape_attr(raw)), raw);
    }

    #[test]
    fn members_come_from_the_parent_directory_only() {
        let a = IdentifierRecord::new("Widget", Kind::Class).with_source("/proj/src/a/widget.js");
        let b = IdentifierRecord::new("Widget", Kind::Class).with_source("/proj/src/b/widget.js");
        let mut in_a = IdentifierRecord::new("onlyInA", Kind::Member).with_source("/proj/src/a/widget.js");
        in_a.member_of = Some("Widget".to_string());
        let mut in_b = IdentifierRecord::new("onlyInB", Kind::Member).with_source("/proj/src/b/widget.js");
        in_b.member_of = Some("Widget".to_string());
        let recs = vec![a, b, in_a, in_b];

        let out = renderer()
            .render(&recs, r#"{{#class name="Widget" dir="a"}}{{>docs}}{{/class}}"#)
            .unwrap();
        assert!(out.contains("onlyInA"));
        assert!(!out.contains("onlyInB"));
    }

    #[test]
    fn malformed_attributes_are_errors() {
        assert!(matches!(
            parse(r#"{{#class name=X}}{{/class}}"#),
            Err(RenderError::BadAttributes(_))
        ));
    }
}
