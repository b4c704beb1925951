//! Group identifier records by kind.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::model::{IdentifierRecord, Kind};
use crate::path_map::PathMapper;

/// One renderable item inside a kind bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    pub name: String,
    /// `/`-separated directory relative to the input root; empty for the root.
    pub dir: String,
}

/// Records grouped by kind, preserving the relative order of records.
#[derive(Debug, Default)]
pub struct KindIndex {
    buckets: HashMap<Kind, Vec<IndexEntry>>,
    /// Unknown kinds in first-appearance order.
    unknown: Vec<Kind>,
}

impl KindIndex {
    /// Build the index. Repeated `(name, dir)` pairs within one kind collapse
    /// into a single entry since they render to the same artifact.
    pub fn build(records: &[IdentifierRecord], mapper: &PathMapper) -> Result<Self> {
        let mut index = KindIndex::default();
        let mut seen = HashSet::new();

        for record in records {
            let dir = mapper.map(record.source_path.as_deref())?;
            let entry = IndexEntry {
                name: record.name.clone(),
                dir,
            };

            if record.kind.rank().is_none() && !index.buckets.contains_key(&record.kind) {
                index.unknown.push(record.kind.clone());
            }

            if seen.insert((record.kind.clone(), entry.clone())) {
                index.buckets.entry(record.kind.clone()).or_default().push(entry);
            }
        }

        Ok(index)
    }

    pub fn get(&self, kind: &Kind) -> &[IndexEntry] {
        self.buckets.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Kinds present in the index, in processing order.
    pub fn kinds(&self) -> Vec<&Kind> {
        Kind::ORDER
            .iter()
            .filter_map(|k| self.buckets.get_key_value(k).map(|(k, _)| k))
            .chain(self.unknown.iter())
            .collect()
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
