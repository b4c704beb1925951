//! JSDoc `/** ... */` comment parser: a line-by-line state machine.
//!
//! Each doc block becomes one [`IdentifierRecord`]. Kind and name come from
//! explicit tags when present, otherwise from the first code line after the
//! block.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::*;

// -- Regex patterns -----------------------------------------------------------

static RE_BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/\*\*(?:[^*/]|$)").unwrap());

// Leading `*` of a block line, plus one optional space
static RE_LINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\* ?").unwrap());

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z]+)(!)?(?:\s+(.*))?$").unwrap());

// `{type} rest`
static RE_TYPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{([^}]*)\}\s*(.*)$").unwrap());

// `name - description`, `[name=default] description`
static RE_PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\[[^\]]+\]|[^\s]+)(?:\s+-)?(?:\s+(.*))?$").unwrap()
});

static RE_FUNC_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)")
        .unwrap()
});

static RE_CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap()
});

static RE_VAR_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?",
        r"(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)"
    ))
    .unwrap()
});

static RE_CONST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?const\s+([A-Za-z_$][\w$]*)\s*[=:;]").unwrap()
});

static RE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:let|var)\s+([A-Za-z_$][\w$]*)").unwrap()
});

// `module.exports.foo = function`, `Foo.prototype.bar = async function`
static RE_ASSIGN_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[\w$]+\.)*([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>)")
        .unwrap()
});

static RE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?\*?([A-Za-z_$][\w$]*)\s*\(").unwrap()
});

static RE_CLASS_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:static\s+)?#?([A-Za-z_$][\w$]*)\s*(?:=|;|$)").unwrap()
});

// Control-flow keywords that look like method calls
const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "with"];

// -- Parser state -------------------------------------------------------------

#[derive(Default)]
struct ParserState<'a> {
    source: Option<&'a Path>,
    records: Vec<IdentifierRecord>,

    // Comment block being collected
    in_block: bool,
    block_lines: Vec<String>,

    // Finished block waiting for the code line that names it
    pending: Option<Docblock>,

    // Enclosing class, with the brace depth its body opened at
    class_scope: Option<(String, i32)>,
    depth: i32,
}

#[derive(Debug, Default)]
struct Docblock {
    kind: Option<Kind>,
    name: Option<String>,
    description: Vec<String>,
    member_of: Option<String>,
    params: Vec<Param>,
    returns: Option<Returns>,
    examples: Vec<String>,
    see_also: Vec<String>,
    deprecated: Option<String>,
    ignored: bool,
    file_level: bool,
}

// -- Public API ---------------------------------------------------------------

/// Parse JavaScript/TypeScript source into identifier records.
///
/// `path` is recorded as each record's source path and names `@module`
/// tags that omit a name.
pub fn parse(input: &str, path: Option<&Path>) -> Vec<IdentifierRecord> {
    let mut state = ParserState {
        source: path,
        ..Default::default()
    };

    for line in input.lines() {
        process_line(&mut state, line);
    }

    // A block at end of file can only be emitted if it names itself
    if let Some(block) = state.pending.take() {
        emit(&mut state, block, None);
    }

    state.records
}

// -- Line processing ----------------------------------------------------------

fn process_line(s: &mut ParserState, line: &str) {
    if s.in_block {
        if let Some(end) = line.find("*/") {
            s.block_lines.push(strip_prefix(&line[..end]));
            finish_block(s);
            let rest = &line[end + 2..];
            if !rest.trim().is_empty() {
                process_code(s, rest);
            }
        } else {
            s.block_lines.push(strip_prefix(line));
        }
        return;
    }

    if RE_BLOCK_START.is_match(line) {
        // A block that never found its code line is flushed first
        if let Some(block) = s.pending.take() {
            emit(s, block, None);
        }
        let start = line.find("/**").map_or(0, |i| i + 3);
        let body = &line[start..];
        if let Some(end) = body.find("*/") {
            s.block_lines.push(body[..end].trim().to_string());
            finish_block(s);
            let rest = &body[end + 2..];
            if !rest.trim().is_empty() {
                process_code(s, rest);
            }
        } else {
            s.in_block = true;
            if !body.trim().is_empty() {
                s.block_lines.push(body.trim().to_string());
            }
        }
        return;
    }

    process_code(s, line);
}

fn process_code(s: &mut ParserState, line: &str) {
    let code = strip_line_comment(line);
    if code.trim().is_empty() {
        return;
    }

    if let Some(block) = s.pending.take() {
        let inferred = infer(code, s.class_scope.as_ref().map(|(name, _)| name.as_str()));
        emit(s, block, inferred);
    }

    let class_decl = RE_CLASS_DECL.captures(code).map(|c| c[1].to_string());
    let before = s.depth;
    s.depth += code.matches('{').count() as i32 - code.matches('}').count() as i32;

    if let Some(name) = class_decl {
        s.class_scope = Some((name, before));
    } else if let Some((_, opened_at)) = s.class_scope {
        if s.depth <= opened_at {
            s.class_scope = None;
        }
    }
}

fn finish_block(s: &mut ParserState) {
    s.in_block = false;
    let lines = std::mem::take(&mut s.block_lines);
    let block = parse_block(&lines, s.source);

    if block.ignored || block.file_level {
        return;
    }
    if block.kind.is_some() && block.name.is_some() {
        emit(s, block, None);
    } else {
        s.pending = Some(block);
    }
}

/// Turn a finished block into a record. Blocks without a name are dropped.
fn emit(s: &mut ParserState, block: Docblock, inferred: Option<(Kind, String, Option<String>)>) {
    let (inferred_kind, inferred_name, inferred_parent) = match inferred {
        Some((k, n, p)) => (Some(k), Some(n), p),
        None => (None, None, None),
    };

    let Some(name) = block.name.or(inferred_name).filter(|n| !n.is_empty()) else {
        return;
    };
    let Some(kind) = block.kind.or(inferred_kind) else {
        return;
    };

    let description = block.description.join("\n").trim().to_string();
    s.records.push(IdentifierRecord {
        name,
        kind,
        source_path: s.source.map(Path::to_path_buf),
        description: (!description.is_empty()).then_some(description),
        member_of: block.member_of.or(inferred_parent),
        params: block.params,
        returns: block.returns,
        examples: block.examples,
        see_also: block.see_also,
        deprecated: block.deprecated,
    });
}

// -- Block parsing ------------------------------------------------------------

fn parse_block(lines: &[String], source: Option<&Path>) -> Docblock {
    let mut block = Docblock::default();
    // Current tag and its accumulated text
    let mut tag: Option<(String, String)> = None;

    for line in lines {
        if let Some(caps) = RE_TAG.captures(line.trim()) {
            if let Some((name, text)) = tag.take() {
                apply_tag(&mut block, &name, &text, source);
            }
            let text = caps.get(3).map_or("", |m| m.as_str());
            tag = Some((caps[1].to_string(), text.to_string()));
            continue;
        }
        match tag.as_mut() {
            Some((_, text)) => {
                text.push('\n');
                text.push_str(line);
            }
            None => block.description.push(line.trim_end().to_string()),
        }
    }
    if let Some((name, text)) = tag.take() {
        apply_tag(&mut block, &name, &text, source);
    }

    block
}

fn apply_tag(block: &mut Docblock, tag: &str, text: &str, source: Option<&Path>) {
    let first_line = text.lines().next().unwrap_or("").trim();
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match tag {
        "module" => {
            block.kind = Some(Kind::Module);
            block.name = Some(if first_line.is_empty() {
                file_stem(source)
            } else {
                first_line.trim_start_matches("module:").to_string()
            });
        }
        "class" | "constructor" | "constructs" => set_kind(block, Kind::Class, first_line),
        "function" | "func" | "method" => set_kind(block, Kind::Function, first_line),
        "namespace" => set_kind(block, Kind::Namespace, first_line),
        "interface" => set_kind(block, Kind::Interface, first_line),
        "mixin" => set_kind(block, Kind::Mixin, first_line),
        "event" => set_kind(block, Kind::Event, first_line),
        "external" | "host" => set_kind(block, Kind::External, first_line),
        // `@enum {type}` never names the identifier
        "enum" => block.kind = Some(Kind::Enum),
        "constant" | "const" => set_kind(block, Kind::Constant, untyped(first_line)),
        "member" | "var" => set_kind(block, Kind::Member, untyped(first_line)),
        "typedef" => set_kind(block, Kind::Typedef, untyped(first_line)),
        "kind" if !first_line.is_empty() => block.kind = Some(Kind::from_tag(first_line)),
        "name" if !first_line.is_empty() => block.name = Some(first_line.to_string()),
        "description" | "desc" | "classdesc" => block.description.push(text.trim().to_string()),
        "param" | "arg" | "argument" => block.params.push(parse_param(&joined)),
        "returns" | "return" => block.returns = Some(parse_returns(&joined)),
        "example" => block.examples.push(text.trim_matches('\n').to_string()),
        "see" if !joined.is_empty() => block.see_also.push(joined),
        "deprecated" => block.deprecated = Some(joined),
        "memberof" if !first_line.is_empty() => block.member_of = Some(first_line.to_string()),
        "ignore" | "private" => block.ignored = true,
        "file" | "fileoverview" | "overview" | "license" | "copyright" => block.file_level = true,
        _ => {}
    }
}

fn set_kind(block: &mut Docblock, kind: Kind, name: &str) {
    block.kind = Some(kind);
    if !name.is_empty() {
        block.name = Some(name.split_whitespace().next().unwrap_or(name).to_string());
    }
}

/// Drop a leading `{type}` from a tag value.
fn untyped(text: &str) -> &str {
    match RE_TYPED.captures(text) {
        Some(caps) => caps.get(2).map_or("", |m| m.as_str()),
        None => text,
    }
}

fn parse_param(text: &str) -> Param {
    let (type_name, rest) = split_type(text);
    let mut param = Param {
        type_name,
        ..Default::default()
    };
    if let Some(caps) = RE_PARAM_NAME.captures(rest) {
        let raw = &caps[1];
        // `[name=default]` → `name`
        param.name = raw
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split('=')
            .next()
            .unwrap_or(raw)
            .to_string();
        param.description = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());
    }
    param
}

fn parse_returns(text: &str) -> Returns {
    let (type_name, rest) = split_type(text);
    let rest = rest.trim().trim_start_matches('-').trim();
    Returns {
        type_name,
        description: (!rest.is_empty()).then(|| rest.to_string()),
    }
}

fn split_type(text: &str) -> (Option<String>, &str) {
    match RE_TYPED.captures(text) {
        Some(caps) => {
            let ty = caps[1].trim().to_string();
            let rest = caps.get(2).map_or("", |m| m.as_str());
            ((!ty.is_empty()).then_some(ty), rest)
        }
        None => (None, text),
    }
}

// -- Code inference -----------------------------------------------------------

/// Infer `(kind, name, enclosing class)` from the code line after a block.
fn infer(code: &str, class: Option<&str>) -> Option<(Kind, String, Option<String>)> {
    if let Some(caps) = RE_CLASS_DECL.captures(code) {
        return Some((Kind::Class, caps[1].to_string(), None));
    }
    if let Some(caps) = RE_FUNC_DECL.captures(code) {
        return Some((Kind::Function, caps[1].to_string(), None));
    }
    if let Some(caps) = RE_VAR_FUNC.captures(code) {
        return Some((Kind::Function, caps[1].to_string(), None));
    }
    if let Some(caps) = RE_CONST.captures(code) {
        return Some((Kind::Constant, caps[1].to_string(), None));
    }
    if let Some(caps) = RE_VAR.captures(code) {
        return Some((Kind::Member, caps[1].to_string(), None));
    }
    if let Some(caps) = RE_ASSIGN_FUNC.captures(code) {
        return Some((Kind::Function, caps[1].to_string(), None));
    }

    let class = class?;
    if let Some(caps) = RE_METHOD.captures(code) {
        let name = &caps[1];
        if KEYWORDS.contains(&name) {
            return None;
        }
        if name == "constructor" {
            return Some((Kind::Constructor, class.to_string(), Some(class.to_string())));
        }
        return Some((Kind::Member, name.to_string(), Some(class.to_string())));
    }
    if let Some(caps) = RE_CLASS_FIELD.captures(code) {
        return Some((Kind::Member, caps[1].to_string(), Some(class.to_string())));
    }
    None
}

// -- Helpers ------------------------------------------------------------------

fn strip_prefix(line: &str) -> String {
    RE_LINE_PREFIX.replace(line, "").trim_end().to_string()
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        // keep `://` inside URLs
        Some(i) if !line[..i].ends_with(':') => &line[..i],
        _ => line,
    }
}

fn file_stem(source: Option<&Path>) -> String {
    source
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
