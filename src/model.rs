//! Data model for parsed documentation comments.

use std::fmt;
use std::path::PathBuf;

/// Semantic category of a documented identifier.
///
/// The known tags are a closed set; anything else is carried verbatim in
/// [`Kind::Other`] so new tags flow through without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Module,
    Class,
    Constructor,
    Function,
    Enum,
    Constant,
    Member,
    Typedef,
    Namespace,
    Interface,
    Mixin,
    Event,
    External,
    Other(String),
}

impl Kind {
    /// Processing order for the known kinds. Unknown kinds follow in
    /// first-appearance order.
    pub const ORDER: [Kind; 13] = [
        Kind::Module,
        Kind::Class,
        Kind::Constructor,
        Kind::Function,
        Kind::Enum,
        Kind::Constant,
        Kind::Member,
        Kind::Typedef,
        Kind::Namespace,
        Kind::Interface,
        Kind::Mixin,
        Kind::Event,
        Kind::External,
    ];

    pub fn from_tag(tag: &str) -> Kind {
        match tag {
            "module" => Kind::Module,
            "class" => Kind::Class,
            "constructor" => Kind::Constructor,
            "function" => Kind::Function,
            "enum" => Kind::Enum,
            "constant" => Kind::Constant,
            "member" => Kind::Member,
            "typedef" => Kind::Typedef,
            "namespace" => Kind::Namespace,
            "interface" => Kind::Interface,
            "mixin" => Kind::Mixin,
            "event" => Kind::Event,
            "external" => Kind::External,
            other => Kind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Kind::Module => "module",
            Kind::Class => "class",
            Kind::Constructor => "constructor",
            Kind::Function => "function",
            Kind::Enum => "enum",
            Kind::Constant => "constant",
            Kind::Member => "member",
            Kind::Typedef => "typedef",
            Kind::Namespace => "namespace",
            Kind::Interface => "interface",
            Kind::Mixin => "mixin",
            Kind::Event => "event",
            Kind::External => "external",
            Kind::Other(tag) => tag,
        }
    }

    /// Position in [`Kind::ORDER`], `None` for unknown kinds.
    pub fn rank(&self) -> Option<usize> {
        Kind::ORDER.iter().position(|k| k == self)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented source entity.
#[derive(Debug, Clone)]
pub struct IdentifierRecord {
    pub name: String,
    pub kind: Kind,
    /// Absolute path of the file the comment was found in.
    pub source_path: Option<PathBuf>,
    pub description: Option<String>,
    /// @memberof: name of the owning class, module or namespace
    pub member_of: Option<String>,
    pub params: Vec<Param>,
    pub returns: Option<Returns>,
    pub examples: Vec<String>,
    pub see_also: Vec<String>,
    /// @deprecated (optional reason, empty string when bare)
    pub deprecated: Option<String>,
}

impl IdentifierRecord {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            source_path: None,
            description: None,
            member_of: None,
            params: Vec::new(),
            returns: None,
            examples: Vec::new(),
            see_also: Vec::new(),
            deprecated: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

/// Parsed @param entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// e.g. "string" or "number | string"
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// Parsed @returns entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Returns {
    pub type_name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for kind in Kind::ORDER.iter() {
            assert_eq!(&Kind::from_tag(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let kind = Kind::from_tag("callback");
        assert_eq!(kind, Kind::Other("callback".to_string()));
        assert_eq!(kind.as_str(), "callback");
        assert_eq!(kind.rank(), None);
    }

    #[test]
    fn module_is_processed_first() {
        assert_eq!(Kind::Module.rank(), Some(0));
        assert!(Kind::Class.rank() < Kind::Function.rank());
    }
}
