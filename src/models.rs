use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Untyped key/value row handed over by the spreadsheet decoder.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_STATUS: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Uuid,
    pub sequence_number: Option<i64>,
    pub name: String,
    pub company: String,
    pub email: String,
    pub date_updated: DateTime<Utc>,
    pub batch: i32,
    pub status: String,
}

/// A validated row waiting for the batch insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub identity: Identity,
    pub sequence_number: Option<i64>,
    pub name: String,
    pub company: String,
    pub email: String,
    pub batch: i32,
    pub status: String,
}

/// How names are folded before two identities are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch {
    Exact,
    #[default]
    CaseInsensitive,
}

impl std::str::FromStr for NameMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "case-sensitive" => Ok(NameMatch::Exact),
            "case-insensitive" | "insensitive" | "ci" => Ok(NameMatch::CaseInsensitive),
            other => Err(format!("unknown name match policy '{other}'")),
        }
    }
}

/// The normalized `(name, batch)` pair that decides whether a row is a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name_key: String,
    pub batch: i32,
}

impl Identity {
    pub fn new(name: &str, batch: i32, policy: NameMatch) -> Self {
        let trimmed = name.trim();
        let name_key = match policy {
            NameMatch::Exact => trimmed.to_string(),
            NameMatch::CaseInsensitive => trimmed.to_lowercase(),
        };
        Self { name_key, batch }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Records sharing one status, in store order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGroup {
    pub status: String,
    pub records: Vec<Record>,
}

impl ReportGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_trims_and_folds_case() {
        let a = Identity::new(" Ann Lee ", 2019, NameMatch::CaseInsensitive);
        let b = Identity::new("ann lee", 2019, NameMatch::CaseInsensitive);
        assert_eq!(a, b);
    }

    #[test]
    fn exact_identity_keeps_case() {
        let a = Identity::new(" Ann Lee ", 2019, NameMatch::Exact);
        let b = Identity::new("ann lee", 2019, NameMatch::Exact);
        assert_eq!(a.name_key, "Ann Lee");
        assert_ne!(a, b);
    }

    #[test]
    fn summary_serializes_both_counts() {
        let summary = IngestSummary {
            inserted: 3,
            skipped: 2,
        };
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"inserted":3,"skipped":2}"#
        );
    }

    #[test]
    fn name_match_parses_env_values() {
        assert_eq!("exact".parse::<NameMatch>(), Ok(NameMatch::Exact));
        assert_eq!(
            "Case-Insensitive".parse::<NameMatch>(),
            Ok(NameMatch::CaseInsensitive)
        );
        assert!("fuzzy".parse::<NameMatch>().is_err());
    }
}
