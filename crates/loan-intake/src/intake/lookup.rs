use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

/// Externally managed reference tables that intake records point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Town,
    Province,
    JobType,
    JobCertificateType,
    Bank,
    VasigheType,
    BusinessPlace,
    BusinessPart,
    RequestDescription,
    LoanType,
    RefundType,
}

impl LookupKind {
    pub const fn label(self) -> &'static str {
        match self {
            LookupKind::Town => "town",
            LookupKind::Province => "province",
            LookupKind::JobType => "job_type",
            LookupKind::JobCertificateType => "job_certificate_type",
            LookupKind::Bank => "bank",
            LookupKind::VasigheType => "vasighe_type",
            LookupKind::BusinessPlace => "business_place",
            LookupKind::BusinessPart => "business_part",
            LookupKind::RequestDescription => "request_description",
            LookupKind::LoanType => "loan_type",
            LookupKind::RefundType => "refund_type",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier of a row in one of the lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LookupId(pub i64);

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed reference from a record into a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LookupRef {
    pub kind: LookupKind,
    pub id: LookupId,
}

impl LookupRef {
    pub const fn new(kind: LookupKind, id: LookupId) -> Self {
        Self { kind, id }
    }
}

/// In-memory copy of the lookup tables used to resolve references at save time.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: BTreeMap<LookupKind, BTreeMap<LookupId, String>>,
}

impl LookupTable {
    /// Load `kind,id,name` rows.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LookupImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::default();

        for row in csv_reader.deserialize::<LookupRow>() {
            let row = row?;
            if table.contains(row.kind, LookupId(row.id)) {
                return Err(LookupImportError::Duplicate {
                    kind: row.kind,
                    id: LookupId(row.id),
                });
            }
            table.insert(row.kind, LookupId(row.id), row.name);
        }

        Ok(table)
    }

    pub fn insert(&mut self, kind: LookupKind, id: LookupId, name: impl Into<String>) {
        self.entries.entry(kind).or_default().insert(id, name.into());
    }

    pub fn contains(&self, kind: LookupKind, id: LookupId) -> bool {
        self.entries
            .get(&kind)
            .is_some_and(|rows| rows.contains_key(&id))
    }

    #[cfg(test)]
    pub(crate) fn name(&self, kind: LookupKind, id: LookupId) -> Option<&str> {
        self.entries
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .map(String::as_str)
    }

    pub fn len(&self, kind: LookupKind) -> usize {
        self.entries.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }

    pub fn kinds(&self) -> impl Iterator<Item = LookupKind> + '_ {
        self.entries.keys().copied()
    }

    /// First reference that has no matching row.
    pub fn first_unresolved<'a, I>(&self, references: I) -> Option<LookupRef>
    where
        I: IntoIterator<Item = &'a LookupRef>,
    {
        references
            .into_iter()
            .find(|reference| !self.contains(reference.kind, reference.id))
            .copied()
    }
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    kind: LookupKind,
    id: i64,
    name: String,
}

/// Build references for a set of ids of the same kind.
pub(crate) fn references_for(kind: LookupKind, ids: &BTreeSet<LookupId>) -> Vec<LookupRef> {
    ids.iter().map(|id| LookupRef::new(kind, *id)).collect()
}

#[derive(Debug)]
pub enum LookupImportError {
    Csv(csv::Error),
    Duplicate { kind: LookupKind, id: LookupId },
}

impl fmt::Display for LookupImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupImportError::Csv(err) => write!(f, "invalid lookup CSV data: {}", err),
            LookupImportError::Duplicate { kind, id } => {
                write!(f, "lookup {} #{} is listed more than once", kind, id)
            }
        }
    }
}

impl std::error::Error for LookupImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupImportError::Csv(err) => Some(err),
            LookupImportError::Duplicate { .. } => None,
        }
    }
}

impl From<csv::Error> for LookupImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
