//! Loader for pre-extracted jsdoc template data (`jsdoc -X` style JSON).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::*;

#[derive(Debug, Deserialize)]
struct RawDoclet {
    name: Option<String>,
    kind: Option<String>,
    #[serde(default)]
    undocumented: bool,
    #[serde(default)]
    ignore: bool,
    meta: Option<RawMeta>,
    description: Option<String>,
    memberof: Option<String>,
    #[serde(default)]
    params: Vec<RawParam>,
    #[serde(default)]
    returns: Vec<RawReturns>,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    see: Vec<String>,
    deprecated: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    path: Option<String>,
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawType {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: Option<String>,
    #[serde(rename = "type")]
    type_: Option<RawType>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReturns {
    #[serde(rename = "type")]
    type_: Option<RawType>,
    description: Option<String>,
}

/// Parse a JSON array of doclets into identifier records.
///
/// Undocumented, ignored and nameless doclets (and the `package` doclet
/// jsdoc always emits) are skipped.
pub fn parse(input: &str) -> Result<Vec<IdentifierRecord>, serde_json::Error> {
    let doclets: Vec<RawDoclet> = serde_json::from_str(input)?;
    Ok(doclets.into_iter().filter_map(convert).collect())
}

fn convert(raw: RawDoclet) -> Option<IdentifierRecord> {
    if raw.undocumented || raw.ignore {
        return None;
    }
    let name = raw.name.filter(|n| !n.is_empty())?;
    let kind = raw.kind.filter(|k| k != "package")?;

    let mut record = IdentifierRecord::new(name, Kind::from_tag(&kind));
    record.source_path = raw.meta.and_then(source_path);
    record.description = raw.description.filter(|d| !d.trim().is_empty());
    record.member_of = raw.memberof;
    record.params = raw
        .params
        .into_iter()
        .filter_map(|p| {
            Some(Param {
                name: p.name?,
                type_name: join_types(p.type_),
                description: p.description,
            })
        })
        .collect();
    record.returns = raw.returns.into_iter().next().map(|r| Returns {
        type_name: join_types(r.type_),
        description: r.description,
    });
    record.examples = raw.examples;
    record.see_also = raw.see;
    record.deprecated = match raw.deprecated {
        Some(serde_json::Value::String(reason)) => Some(reason),
        Some(serde_json::Value::Bool(true)) => Some(String::new()),
        _ => None,
    };
    Some(record)
}

fn source_path(meta: RawMeta) -> Option<PathBuf> {
    match (meta.path, meta.filename) {
        (Some(dir), Some(file)) => Some(Path::new(&dir).join(file)),
        (None, Some(file)) => Some(PathBuf::from(file)),
        _ => None,
    }
}

fn join_types(ty: Option<RawType>) -> Option<String> {
    ty.map(|t| t.names.join(" | ")).filter(|s| !s.is_empty())
}
