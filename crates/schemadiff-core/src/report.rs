//! Comparison and fingerprint reports (stable v1)
//!
//! These are the output formats handed to renderers and CI tooling.
//! Breaking changes require a new version.

use crate::difference::{DiffKind, Difference};
use crate::schema::{DatabaseType, Schema, SchemaStats};
use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Identifies a snapshot without carrying its contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    pub name: String,
    pub database_type: DatabaseType,
}

impl From<&Schema> for SchemaRef {
    fn from(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            database_type: schema.database_type,
        }
    }
}

impl std::fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.database_type, self.name)
    }
}

/// Difference counts per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn from_differences(differences: &[Difference]) -> Self {
        let count = |kind: DiffKind| differences.iter().filter(|d| d.kind() == kind).count();

        Self {
            total: differences.len(),
            added: count(DiffKind::Added),
            removed: count(DiffKind::Removed),
            modified: count(DiffKind::Modified),
        }
    }
}

/// Result of comparing a source snapshot against a target snapshot
///
/// The timestamp lives here, outside the difference list, so two runs over
/// the same inputs produce identical `differences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Schema version
    pub version: ReportVersion,

    pub source: SchemaRef,

    pub target: SchemaRef,

    /// Timestamp (RFC 3339)
    pub compared_at: String,

    pub summary: DiffSummary,

    pub differences: Vec<Difference>,
}

impl ComparisonResult {
    /// Wrap a difference list, stamping it with the current time
    pub fn new(source: &Schema, target: &Schema, differences: Vec<Difference>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            source: source.into(),
            target: target.into(),
            compared_at: chrono::Utc::now().to_rfc3339(),
            summary: DiffSummary::from_differences(&differences),
            differences,
        }
    }

    /// True when the snapshots differ in any compared respect
    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Differences of one kind, in report order
    pub fn of_kind(&self, kind: DiffKind) -> impl Iterator<Item = &Difference> {
        self.differences.iter().filter(move |d| d.kind() == kind)
    }

    /// Reorder differences by (kind, object type, object name)
    pub fn sort_by_kind_and_name(&mut self) {
        self.differences.sort_by(|a, b| {
            (a.kind(), a.object_type(), &a.object_name).cmp(&(b.kind(), b.object_type(), &b.object_name))
        });
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Fingerprint of one snapshot with the context it was computed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintReport {
    pub schema: SchemaRef,

    /// Lowercase hex digest
    pub fingerprint: String,

    pub algorithm: String,

    pub include_comments: bool,

    pub tables_only: bool,

    /// Timestamp (RFC 3339)
    pub generated_at: String,

    pub statistics: SchemaStats,
}

impl FingerprintReport {
    pub fn new(schema: &Schema, fingerprint: String, include_comments: bool, tables_only: bool) -> Self {
        let statistics = if tables_only {
            schema.tables_only().stats()
        } else {
            schema.stats()
        };

        Self {
            schema: schema.into(),
            fingerprint,
            algorithm: "SHA256".to_string(),
            include_comments,
            tables_only,
            generated_at: chrono::Utc::now().to_rfc3339(),
            statistics,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difference::{Change, ObjectChange};
    use crate::schema::{Column, Table, View};

    fn sample_differences() -> Vec<Difference> {
        vec![
            Difference::new(
                "users.name",
                "Column definition changed",
                ObjectChange::Column(Change::Modified {
                    source: Column::new("name", "varchar(50)"),
                    target: Column::new("name", "varchar(100)"),
                }),
            ),
            Difference::new(
                "audit",
                "Table exists in target but not in source",
                ObjectChange::Table(Change::Added {
                    target: Box::new(Table::new("audit")),
                }),
            ),
            Difference::new(
                "active_users",
                "View exists in target but not in source",
                ObjectChange::View(Change::Added {
                    target: View::new("active_users", "SELECT 1"),
                }),
            ),
        ]
    }

    #[test]
    fn summary_counts() {
        let summary = DiffSummary::from_differences(&sample_differences());
        assert_eq!(
            summary,
            DiffSummary {
                total: 3,
                added: 2,
                removed: 0,
                modified: 1
            }
        );
    }

    #[test]
    fn empty_result() {
        let schema = Schema::new("app", DatabaseType::Postgresql);
        let result = ComparisonResult::new(&schema, &schema, Vec::new());

        assert_eq!(result.version, ReportVersion::CURRENT);
        assert!(!result.has_differences());
        assert_eq!(result.source.to_string(), "postgresql://app");
    }

    #[test]
    fn sort_by_kind_and_name() {
        let schema = Schema::new("app", DatabaseType::Postgresql);
        let mut result = ComparisonResult::new(&schema, &schema, sample_differences());
        result.sort_by_kind_and_name();

        let order: Vec<_> = result.differences.iter().map(|d| d.object_name.as_str()).collect();
        assert_eq!(order, vec!["audit", "active_users", "users.name"]);
        assert_eq!(result.of_kind(DiffKind::Added).count(), 2);
    }

    #[test]
    fn fingerprint_report_statistics_follow_tables_only() {
        let schema = Schema::new("app", DatabaseType::Oracle)
            .with_table(Table::new("users"))
            .with_view(View::new("v", "SELECT 1"));

        let full = FingerprintReport::new(&schema, "ab".repeat(32), false, false);
        let tables = FingerprintReport::new(&schema, "ab".repeat(32), false, true);

        assert_eq!(full.statistics.views, 1);
        assert_eq!(tables.statistics.views, 0);
        assert_eq!(tables.algorithm, "SHA256");
    }
}
