//! Markdown for the `docs`, `header` and `body` partials.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::*;
use crate::toc;

// `{string|number}` style unions inside a type expression
static RE_TYPE_UNION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|\s*").unwrap());

/// Full documentation for `record`, including its members.
///
/// `all` holds the candidate member records; those whose `member_of` names
/// `record` are rendered under it.
pub fn render_docs(record: &IdentifierRecord, all: &[&IdentifierRecord]) -> String {
    render_at(record, all, 2)
}

fn render_at(record: &IdentifierRecord, all: &[&IdentifierRecord], level: usize) -> String {
    let mut out = render_header(record, level);
    out.push_str(&render_body(record, all, level));
    out
}

/// Heading line with signature, followed by a blank line.
pub fn render_header(record: &IdentifierRecord, level: usize) -> String {
    format!("{} {}\n\n", "#".repeat(level), signature(record))
}

/// Everything below the heading.
pub fn render_body(record: &IdentifierRecord, all: &[&IdentifierRecord], level: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    // Badges: kind, deprecated
    lines.push(render_badges(record));
    lines.push(String::new());

    if let Some(reason) = record.deprecated.as_deref().filter(|r| !r.is_empty()) {
        lines.push(format!("**Deprecated:** {}", reason));
        lines.push(String::new());
    }

    if let Some(ref desc) = record.description {
        lines.push(desc.clone());
        lines.push(String::new());
    }

    let sub = "#".repeat((level + 2).min(6));

    if !record.params.is_empty() {
        lines.push(format!("{} Parameters\n", sub));
        for param in &record.params {
            lines.push(format!("* {}", render_param(param)));
        }
        lines.push(String::new());
    }

    if let Some(ref returns) = record.returns {
        lines.push(format!("{} Returns\n", sub));
        lines.push(format!("* {}", render_returns(returns)));
        lines.push(String::new());
    }

    for example in &record.examples {
        lines.push(format!("{} Example\n", sub));
        lines.push("```js".to_string());
        lines.push(unindent(example));
        lines.push("```".to_string());
        lines.push(String::new());
    }

    if !record.see_also.is_empty() {
        lines.push(format!("{} See also\n", sub));
        for see in &record.see_also {
            lines.push(format!("* {}", toc::render_toc_link(see)));
        }
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');

    // Members documented with @memberof this record
    let members: Vec<&IdentifierRecord> = all
        .iter()
        .copied()
        .filter(|m| m.member_of.as_deref() == Some(record.name.as_str()))
        .filter(|m| !std::ptr::eq(*m, record))
        .collect();
    if !members.is_empty() && level < 6 {
        out.push_str(&format!("{} Members\n\n", sub));
        for member in &members {
            out.push_str(&toc::render_toc_item(&member.name));
            out.push('\n');
        }
        out.push('\n');
        for member in members {
            // members of members are listed but not expanded again
            out.push_str(&render_header(member, level + 1));
            out.push_str(&render_leaf_body(member, level + 1));
        }
    }

    out
}

/// Body without the member section, used for nested members.
fn render_leaf_body(record: &IdentifierRecord, level: usize) -> String {
    render_body(record, &[], level)
}

/// `name(a, b) ⇒ type` for callables, bare name otherwise.
fn signature(record: &IdentifierRecord) -> String {
    let callable = matches!(record.kind, Kind::Function | Kind::Constructor)
        || (record.kind == Kind::Member && !record.params.is_empty());
    if !callable {
        return record.name.clone();
    }

    let params: Vec<&str> = record
        .params
        .iter()
        .map(|p| p.name.as_str())
        .filter(|n| !n.contains('.'))
        .collect();
    let mut sig = format!("{}({})", record.name, params.join(", "));
    if let Some(ty) = record.returns.as_ref().and_then(|r| r.type_name.as_deref()) {
        sig.push_str(&format!(" ⇒ `{}`", ty));
    }
    sig
}

/// `> `function` *`deprecated`*`
fn render_badges(record: &IdentifierRecord) -> String {
    let mut badges = vec![format!("`{}`", record.kind)];
    if let Some(ref parent) = record.member_of {
        badges.push(format!("member of `{}`", parent));
    }
    if record.deprecated.is_some() {
        badges.push("*`deprecated`*".to_string());
    }
    format!("> {}", badges.join(" "))
}

// -- Style transforms ---------------------------------------------------------

/// `{name, "string", "The value"}` → `**name** (`string`): The value`
fn render_param(param: &Param) -> String {
    let mut out = format!("**{}**", param.name);
    if let Some(ref ty) = param.type_name {
        out.push_str(&format!(" ({})", render_type(ty)));
    }
    if let Some(ref desc) = param.description {
        out.push_str(&format!(": {}", desc));
    }
    out
}

fn render_returns(returns: &Returns) -> String {
    match (&returns.type_name, &returns.description) {
        (Some(ty), Some(desc)) => format!("{}: {}", render_type(ty), desc),
        (Some(ty), None) => render_type(ty),
        (None, Some(desc)) => desc.clone(),
        (None, None) => String::new(),
    }
}

/// `string|number` → `` `string` \| `number` ``
fn render_type(ty: &str) -> String {
    RE_TYPE_UNION
        .split(ty.trim())
        .map(|t| format!("`{}`", t))
        .collect::<Vec<_>>()
        .join(" \\| ")
}

/// Remove common leading indentation from a multi-line string.
fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    // Find first non-empty line
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    if start >= lines.len() {
        return text.to_string();
    }

    let min_indent = lines[start..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    lines[start..]
        .iter()
        // non-blank lines start with at least `min_indent` ASCII spaces
        .map(|l| if l.trim().is_empty() { "" } else { &l[min_indent..] })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(name: &str, ty: Option<&str>, desc: Option<&str>) -> Param {
        Param {
            name: name.to_string(),
            type_name: ty.map(str::to_string),
            description: desc.map(str::to_string),
        }
    }

    #[test]
    fn param_with_type_and_description() {
        assert_eq!(
            render_param(&param("needle", Some("string"), Some("What to find"))),
            "**needle** (`string`): What to find"
        );
    }

    #[test]
    fn param_union_type() {
        assert_eq!(
            render_param(&param("v", Some("string | number"), None)),
            "**v** (`string` \\| `number`)"
        );
    }

    #[test]
    fn function_signature() {
        let mut rec = IdentifierRecord::new("add", Kind::Function);
        rec.params = vec![
            param("a", Some("number"), None),
            param("opts", None, None),
            param("opts.strict", None, None),
        ];
        rec.returns = Some(Returns {
            type_name: Some("number".to_string()),
            description: None,
        });
        assert_eq!(signature(&rec), "add(a, opts) ⇒ `number`");
    }

    #[test]
    fn class_signature_is_bare_name() {
        assert_eq!(signature(&IdentifierRecord::new("Widget", Kind::Class)), "Widget");
    }

    #[test]
    fn unindent_basic() {
        assert_eq!(unindent("  a\n  b\n  c"), "a\nb\nc");
    }

    #[test]
    fn unindent_mixed() {
        assert_eq!(unindent("  a\n    b\n  c"), "a\n  b\nc");
    }

    #[test]
    fn unindent_blank_line_with_unicode_whitespace() {
        assert_eq!(unindent(" a\n\u{a0}\n b"), "a\n\nb");
        assert_eq!(unindent("  a\n \u{3000}\n  b"), "a\n\nb");
    }

    #[test]
    fn unindent_empty_first() {
        assert_eq!(unindent("\n  a\n  b\n"), "a\nb");
    }

    #[test]
    fn full_function_docs() {
        let mut rec = IdentifierRecord::new("greet", Kind::Function);
        rec.description = Some("Say hello.".to_string());
        rec.params = vec![param("name", Some("string"), Some("Who to greet"))];
        rec.returns = Some(Returns {
            type_name: Some("string".to_string()),
            description: Some("The greeting".to_string()),
        });
        rec.examples = vec!["greet('bob')".to_string()];
        rec.see_also = vec!["farewell".to_string()];

        let expected = "\
## greet(name) ⇒ `string`

> `function`

Say hello.

#### Parameters

* **name** (`string`): Who to greet

#### Returns

* `string`: The greeting

#### Example

```js
greet('bob')
```

#### See also

* [farewell](#farewell)

";
        assert_eq!(render_docs(&rec, &[]), expected);
    }

    #[test]
    fn class_lists_members() {
        let class = IdentifierRecord::new("Widget", Kind::Class);
        let mut draw = IdentifierRecord::new("draw", Kind::Member);
        draw.member_of = Some("Widget".to_string());
        let all = [&class, &draw];

        let out = render_docs(&class, &all);
        assert!(out.starts_with("## Widget\n\n> `class`\n"));
        assert!(out.contains("#### Members\n\n* [draw](#draw)\n"));
        assert!(out.contains("### draw\n\n> `member` member of `Widget`\n"));
    }

    #[test]
    fn deprecated_badge_and_reason() {
        let mut rec = IdentifierRecord::new("old", Kind::Constant);
        rec.deprecated = Some("Use `new` instead.".to_string());
        let out = render_docs(&rec, &[]);
        assert!(out.contains("> `constant` *`deprecated`*"));
        assert!(out.contains("**Deprecated:** Use `new` instead."));
    }
}
