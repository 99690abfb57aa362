//! Text and markdown renderers for comparison results

use colored::{ColoredString, Colorize};
use schemadiff_core::{Change, ComparisonResult, DiffKind, Difference, ObjectChange};
use std::collections::BTreeMap;

const SECTIONS: [(DiffKind, &str, &str); 3] = [
    (DiffKind::Added, "Added Objects", "+"),
    (DiffKind::Removed, "Removed Objects", "-"),
    (DiffKind::Modified, "Modified Objects", "~"),
];

pub fn colored_marker(kind: DiffKind, marker: &str) -> ColoredString {
    match kind {
        DiffKind::Added => marker.green().bold(),
        DiffKind::Removed => marker.red().bold(),
        DiffKind::Modified => marker.yellow().bold(),
    }
}

/// Terminal report grouped by difference kind
pub fn text_report(result: &ComparisonResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "=".repeat(60).bright_blue()));
    out.push_str(&format!("{}\n", "Schema Comparison Report".bold().bright_blue()));
    out.push_str(&format!("{}\n\n", "=".repeat(60).bright_blue()));

    out.push_str(&format!("Source:    {}\n", result.source));
    out.push_str(&format!("Target:    {}\n", result.target));
    out.push_str(&format!("Timestamp: {}\n\n", result.compared_at));

    out.push_str(&format!("{}\n", "Summary:".bold()));
    out.push_str(&format!("  Total differences: {}\n", result.summary.total));
    out.push_str(&format!("  Added:    {}\n", count(result.summary.added, DiffKind::Added)));
    out.push_str(&format!("  Removed:  {}\n", count(result.summary.removed, DiffKind::Removed)));
    out.push_str(&format!("  Modified: {}\n\n", count(result.summary.modified, DiffKind::Modified)));

    if !result.has_differences() {
        out.push_str(&format!("{}\n", "✓ No differences found!".green().bold()));
        return out;
    }

    for (kind, heading, marker) in SECTIONS {
        let diffs: Vec<_> = result.of_kind(kind).collect();
        if diffs.is_empty() {
            continue;
        }

        out.push_str(&format!("{}\n", heading.bold()));
        for diff in diffs {
            out.push_str(&format!(
                "  {} {}: {}\n",
                colored_marker(kind, marker),
                diff.object_type(),
                diff.object_name
            ));
            out.push_str(&format!("    {}\n", diff.description));
            for detail in details(diff) {
                out.push_str(&format!("    {}\n", detail));
            }
        }
        out.push('\n');
    }

    out
}

fn count(value: usize, kind: DiffKind) -> ColoredString {
    if value == 0 {
        return value.to_string().green();
    }
    match kind {
        DiffKind::Removed => value.to_string().red().bold(),
        _ => value.to_string().yellow(),
    }
}

/// Markdown report for pull request comments
pub fn markdown_report(result: &ComparisonResult) -> String {
    let mut md = String::new();

    md.push_str("# Schema Comparison Report\n\n");
    md.push_str(&format!("**Source:** `{}`\n\n", result.source));
    md.push_str(&format!("**Target:** `{}`\n\n", result.target));
    md.push_str(&format!("**Timestamp:** {}\n\n", result.compared_at));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Total differences: {}\n", result.summary.total));
    md.push_str(&format!("- Added: {}\n", result.summary.added));
    md.push_str(&format!("- Removed: {}\n", result.summary.removed));
    md.push_str(&format!("- Modified: {}\n\n", result.summary.modified));

    if !result.has_differences() {
        md.push_str("✅ **No differences found!**\n");
        return md;
    }

    for (kind, heading, _) in SECTIONS {
        let diffs: Vec<_> = result.of_kind(kind).collect();
        if diffs.is_empty() {
            continue;
        }

        md.push_str(&format!("## {}\n\n", heading));
        md.push_str("| Type | Object | Description |\n");
        md.push_str("|---|---|---|\n");
        for diff in diffs {
            let mut description = diff.description.clone();
            for detail in details(diff) {
                description.push_str("<br>");
                description.push_str(&detail);
            }
            md.push_str(&format!(
                "| {} | `{}` | {} |\n",
                diff.object_type(),
                escape_cell(&diff.object_name),
                escape_cell(&description)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// One line per difference kind and object type, for CI logs
pub fn summary_report(result: &ComparisonResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("Schema Comparison Summary: {} -> {}\n", result.source, result.target));

    if !result.has_differences() {
        out.push_str(&format!("{}\n", "SCHEMAS ARE IDENTICAL".green().bold()));
        return out;
    }

    out.push_str(&format!("Total differences: {}\n", result.summary.total));
    for (kind, heading, marker) in SECTIONS {
        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for diff in result.of_kind(kind) {
            *by_type.entry(diff.object_type()).or_default() += 1;
        }
        if by_type.is_empty() {
            continue;
        }

        out.push_str(&format!("{} ({}):\n", heading, by_type.values().sum::<usize>()));
        for (object_type, n) in by_type {
            out.push_str(&format!("  {} {}: {}\n", colored_marker(kind, marker), object_type, n));
        }
    }

    out
}

/// Field-level notes for modified objects
fn details(diff: &Difference) -> Vec<String> {
    let mut notes = Vec::new();

    match &diff.change {
        ObjectChange::Column(Change::Modified { source, target }) => {
            if source.data_type != target.data_type {
                notes.push(format!("type: {} -> {}", source.data_type, target.data_type));
            }
            if source.is_nullable != target.is_nullable {
                notes.push(format!("nullable: {} -> {}", source.is_nullable, target.is_nullable));
            }
            if source.default_value != target.default_value {
                notes.push(format!(
                    "default: {} -> {}",
                    source.default_value.as_deref().unwrap_or("NULL"),
                    target.default_value.as_deref().unwrap_or("NULL")
                ));
            }
        }
        ObjectChange::Constraint(change) => {
            let actions = |c: &schemadiff_core::Constraint| {
                format!(
                    "ON UPDATE {}, ON DELETE {}",
                    c.on_update.as_deref().unwrap_or("NO ACTION"),
                    c.on_delete.as_deref().unwrap_or("NO ACTION")
                )
            };
            match change {
                Change::Modified { source, target } if source.referenced_table.is_some() => {
                    notes.push(format!("FK actions: {} -> {}", actions(source), actions(target)));
                }
                Change::Added { target: c } | Change::Removed { source: c } if c.referenced_table.is_some() => {
                    notes.push(format!("FK actions: {}", actions(c)));
                }
                _ => {}
            }
        }
        ObjectChange::Index(Change::Modified { source, target }) if source.columns != target.columns => {
            notes.push(format!(
                "columns: ({}) -> ({})",
                source.columns.join(", "),
                target.columns.join(", ")
            ));
        }
        ObjectChange::TableComment(Change::Modified { source, target }) => {
            notes.push(format!("comment: {:?} -> {:?}", source, target));
        }
        _ => {}
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadiff_core::{Column, Constraint, DatabaseType, Index, Schema};

    fn result(differences: Vec<Difference>) -> ComparisonResult {
        let schema = Schema::new("shop", DatabaseType::Mysql);
        ComparisonResult::new(&schema, &schema, differences)
    }

    fn widened_column() -> Difference {
        Difference::new(
            "users.name",
            "Column definition changed",
            ObjectChange::Column(Change::Modified {
                source: Column::new("name", "varchar(50)"),
                target: Column::new("name", "varchar(100)").with_nullable(false),
            }),
        )
    }

    #[test]
    fn column_details() {
        assert_eq!(
            details(&widened_column()),
            vec!["type: varchar(50) -> varchar(100)", "nullable: true -> false"]
        );
    }

    #[test]
    fn foreign_key_actions_detail() {
        let fk = Constraint::foreign_key("fk", ["user_id"], "users", ["id"]);
        let diff = Difference::new(
            "orders.fk",
            "Constraint added to table",
            ObjectChange::Constraint(Change::Added {
                target: fk.with_actions(None, Some("CASCADE")),
            }),
        );

        assert_eq!(
            details(&diff),
            vec!["FK actions: ON UPDATE NO ACTION, ON DELETE CASCADE"]
        );
    }

    #[test]
    fn index_column_detail() {
        let diff = Difference::new(
            "t.idx",
            "Index definition changed",
            ObjectChange::Index(Change::Modified {
                source: Index::new("idx", "t", ["x", "y"]),
                target: Index::new("idx", "t", ["y", "x"]),
            }),
        );

        assert_eq!(details(&diff), vec!["columns: (x, y) -> (y, x)"]);
    }

    #[test]
    fn markdown_groups_by_kind() {
        let md = markdown_report(&result(vec![widened_column()]));

        assert!(md.contains("## Modified Objects"));
        assert!(!md.contains("## Added Objects"));
        assert!(md.contains("| Column | `users.name` | Column definition changed<br>type: varchar(50) -> varchar(100)"));
        assert!(md.contains("- Modified: 1"));
    }

    #[test]
    fn markdown_escapes_pipes_in_names() {
        let diff = Difference::new(
            "a|b",
            "Table exists in target but not in source",
            ObjectChange::Table(Change::Added {
                target: Box::new(schemadiff_core::Table::new("a|b")),
            }),
        );
        let md = markdown_report(&result(vec![diff]));

        assert!(md.contains("| Table | `a\\|b` | Table exists in target but not in source |"));
        assert!(!md.contains("`a|b`"));
    }

    #[test]
    fn markdown_no_differences() {
        let md = markdown_report(&result(Vec::new()));
        assert!(md.contains("No differences found"));
        assert!(md.contains("**Source:** `mysql://shop`"));
    }

    #[test]
    fn summary_counts_by_kind_and_type() {
        colored::control::set_override(false);
        let dropped = Difference::new(
            "users.email",
            "Column removed from table",
            ObjectChange::Column(Change::Removed {
                source: Column::new("email", "text"),
            }),
        );
        let text = summary_report(&result(vec![widened_column(), dropped, widened_column()]));

        assert!(text.contains("Total differences: 3"));
        assert!(text.contains("Removed Objects (1):\n  - Column: 1\n"));
        assert!(text.contains("Modified Objects (2):\n  ~ Column: 2\n"));
        assert!(!text.contains("Added Objects"));
    }

    #[test]
    fn summary_identical() {
        colored::control::set_override(false);
        let text = summary_report(&result(Vec::new()));
        assert!(text.contains("SCHEMAS ARE IDENTICAL"));
        assert!(!text.contains("Total differences"));
    }

    #[test]
    fn text_lists_every_difference() {
        colored::control::set_override(false);
        let text = text_report(&result(vec![widened_column()]));

        assert!(text.contains("Modified Objects"));
        assert!(text.contains("  ~ Column: users.name"));
        assert!(text.contains("    type: varchar(50) -> varchar(100)"));
    }
}
