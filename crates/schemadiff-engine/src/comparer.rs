//! Structural diff between two schema snapshots
//!
//! Objects are joined by name within their scope. Names only in the source
//! are `Removed`, names only in the target are `Added`, and names on both
//! sides are checked with a per-kind equality predicate. Tables present on
//! both sides are diffed recursively (columns, constraints, indexes, then
//! the comment); an added or removed table is reported once.
//!
//! Joins use ordered maps, so for each kind the output lists removed names,
//! then added names, then changes on shared names, each in ascending name
//! order. Duplicate names within one collection collapse to the last one.

use schemadiff_core::{
    Change, Column, ComparisonResult, Constraint, Difference, Function, IgnoreFilter, Index,
    ObjectChange, ObjectKind, Procedure, Schema, Sequence, Table, Trigger, View,
};
use std::collections::BTreeMap;

/// Anything joined by name during comparison
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(Table, Column, Constraint, Index, View, Sequence, Procedure, Function, Trigger);

/// Compares schema snapshots, optionally skipping ignored objects
#[derive(Debug, Clone, Default)]
pub struct Comparer {
    filter: IgnoreFilter,
}

impl Comparer {
    /// Comparer that considers every object
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparer that skips objects matched by `filter`
    pub fn with_filter(filter: IgnoreFilter) -> Self {
        Self { filter }
    }

    /// Compare and wrap the differences in a timestamped result
    pub fn compare(&self, source: &Schema, target: &Schema) -> ComparisonResult {
        let differences = self.differences(source, target);

        tracing::debug!(
            source = %source.name,
            target = %target.name,
            differences = differences.len(),
            ignore_patterns = self.filter.len(),
            "compared schemas"
        );

        ComparisonResult::new(source, target, differences)
    }

    /// Ordered difference list between `source` and `target`
    pub fn differences(&self, source: &Schema, target: &Schema) -> Vec<Difference> {
        let mut out = Vec::new();

        self.compare_tables(&source.tables, &target.tables, &mut out);

        self.compare_flat(
            ObjectKind::View,
            None,
            &source.views,
            &target.views,
            views_equal,
            ObjectChange::View,
            &mut out,
        );
        self.compare_flat(
            ObjectKind::Index,
            None,
            &source.indexes,
            &target.indexes,
            indexes_equal,
            ObjectChange::Index,
            &mut out,
        );
        self.compare_flat(
            ObjectKind::Sequence,
            None,
            &source.sequences,
            &target.sequences,
            sequences_equal,
            ObjectChange::Sequence,
            &mut out,
        );
        self.compare_flat(
            ObjectKind::Procedure,
            None,
            &source.procedures,
            &target.procedures,
            procedures_equal,
            ObjectChange::Procedure,
            &mut out,
        );
        self.compare_flat(
            ObjectKind::Function,
            None,
            &source.functions,
            &target.functions,
            functions_equal,
            ObjectChange::Function,
            &mut out,
        );
        self.compare_flat(
            ObjectKind::Trigger,
            None,
            &source.triggers,
            &target.triggers,
            triggers_equal,
            ObjectChange::Trigger,
            &mut out,
        );

        out
    }

    fn compare_tables(&self, source: &[Table], target: &[Table], out: &mut Vec<Difference>) {
        let joined = self.join(ObjectKind::Table, source, target);

        for table in joined.removed {
            push(
                out,
                Difference::new(
                    &table.name,
                    "Table exists in source but not in target",
                    ObjectChange::Table(Change::Removed {
                        source: Box::new(self.visible_table(table)),
                    }),
                ),
            );
        }

        for table in joined.added {
            push(
                out,
                Difference::new(
                    &table.name,
                    "Table exists in target but not in source",
                    ObjectChange::Table(Change::Added {
                        target: Box::new(self.visible_table(table)),
                    }),
                ),
            );
        }

        for (source, target) in joined.common {
            self.compare_table(source, target, out);
        }
    }

    fn compare_table(&self, source: &Table, target: &Table, out: &mut Vec<Difference>) {
        let scope = Some(source.name.as_str());

        self.compare_flat(
            ObjectKind::Column,
            scope,
            &source.columns,
            &target.columns,
            columns_equal,
            ObjectChange::Column,
            out,
        );
        self.compare_flat(
            ObjectKind::Constraint,
            scope,
            &source.constraints,
            &target.constraints,
            constraints_equal,
            ObjectChange::Constraint,
            out,
        );
        self.compare_flat(
            ObjectKind::Index,
            scope,
            &source.indexes,
            &target.indexes,
            indexes_equal,
            ObjectChange::Index,
            out,
        );

        if source.comment != target.comment {
            push(
                out,
                Difference::new(
                    &source.name,
                    "Table comment changed",
                    ObjectChange::TableComment(Change::Modified {
                        source: source.comment.clone(),
                        target: target.comment.clone(),
                    }),
                ),
            );
        }
    }

    /// Diff one collection of leaf objects
    ///
    /// `scope` is the owning table for nested objects; it qualifies the
    /// reported name and switches the description wording.
    #[allow(clippy::too_many_arguments)]
    fn compare_flat<T: Named + Clone>(
        &self,
        kind: ObjectKind,
        scope: Option<&str>,
        source: &[T],
        target: &[T],
        equal: fn(&T, &T) -> bool,
        wrap: fn(Change<T>) -> ObjectChange,
        out: &mut Vec<Difference>,
    ) {
        let label = kind.label();
        let joined = self.join(kind, source, target);

        for item in joined.removed {
            let description = match scope {
                Some(_) => format!("{} removed from table", label),
                None => format!("{} exists in source but not in target", label),
            };
            push(
                out,
                Difference::new(
                    qualified(scope, item.name()),
                    description,
                    wrap(Change::Removed { source: item.clone() }),
                ),
            );
        }

        for item in joined.added {
            let description = match scope {
                Some(_) => format!("{} added to table", label),
                None => format!("{} exists in target but not in source", label),
            };
            push(
                out,
                Difference::new(
                    qualified(scope, item.name()),
                    description,
                    wrap(Change::Added { target: item.clone() }),
                ),
            );
        }

        for (s, t) in joined.common {
            if !equal(s, t) {
                push(
                    out,
                    Difference::new(
                        qualified(scope, s.name()),
                        format!("{} definition changed", label),
                        wrap(Change::Modified {
                            source: s.clone(),
                            target: t.clone(),
                        }),
                    ),
                );
            }
        }
    }

    /// Filter both sides and join them by name
    fn join<'a, T: Named>(&self, kind: ObjectKind, source: &'a [T], target: &'a [T]) -> Joined<'a, T> {
        let source = self.by_name(kind, source);
        let target = self.by_name(kind, target);

        let removed = source
            .iter()
            .filter(|(name, _)| !target.contains_key(*name))
            .map(|(_, item)| *item)
            .collect();

        let added = target
            .iter()
            .filter(|(name, _)| !source.contains_key(*name))
            .map(|(_, item)| *item)
            .collect();

        let common = source
            .iter()
            .filter_map(|(name, s)| target.get(name).map(|t| (*s, *t)))
            .collect();

        Joined { removed, added, common }
    }

    fn by_name<'a, T: Named>(&self, kind: ObjectKind, items: &'a [T]) -> BTreeMap<&'a str, &'a T> {
        items
            .iter()
            .filter(|item| !self.filter.should_ignore(kind, item.name()))
            .map(|item| (item.name(), item))
            .collect()
    }

    /// Copy of a table without its ignored children, for reporting
    fn visible_table(&self, table: &Table) -> Table {
        if self.filter.is_empty() {
            return table.clone();
        }

        Table {
            columns: self
                .filter
                .retain(ObjectKind::Column, &table.columns, |c| c.name.as_str())
                .into_iter()
                .cloned()
                .collect(),
            constraints: self
                .filter
                .retain(ObjectKind::Constraint, &table.constraints, |c| c.name.as_str())
                .into_iter()
                .cloned()
                .collect(),
            indexes: self
                .filter
                .retain(ObjectKind::Index, &table.indexes, |i| i.name.as_str())
                .into_iter()
                .cloned()
                .collect(),
            ..table.clone()
        }
    }
}

/// Compare two snapshots with an optional ignore filter
pub fn compare(source: &Schema, target: &Schema, filter: Option<&IgnoreFilter>) -> Vec<Difference> {
    match filter {
        Some(filter) => Comparer::with_filter(filter.clone()).differences(source, target),
        None => Comparer::new().differences(source, target),
    }
}

struct Joined<'a, T> {
    removed: Vec<&'a T>,
    added: Vec<&'a T>,
    common: Vec<(&'a T, &'a T)>,
}

fn push(out: &mut Vec<Difference>, difference: Difference) {
    tracing::trace!(
        kind = %difference.kind(),
        object_type = difference.object_type(),
        object = %difference.object_name,
        "difference"
    );
    out.push(difference);
}

fn qualified(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(table) => format!("{}.{}", table, name),
        None => name.to_string(),
    }
}

/// Type, nullability, default, key flags and auto-increment.
/// Comment and position are metadata, not definition.
pub fn columns_equal(source: &Column, target: &Column) -> bool {
    source.data_type == target.data_type
        && source.is_nullable == target.is_nullable
        && source.default_value == target.default_value
        && source.is_primary_key == target.is_primary_key
        && source.is_unique == target.is_unique
        && source.is_auto_increment == target.is_auto_increment
}

/// Kind, columns, referenced table/columns and check expression.
/// Column lists are multisets; referential actions are not compared.
pub fn constraints_equal(source: &Constraint, target: &Constraint) -> bool {
    source.constraint_type == target.constraint_type
        && same_multiset(&source.columns, &target.columns)
        && source.referenced_table == target.referenced_table
        && same_multiset(&source.referenced_columns, &target.referenced_columns)
        && source.check_expression == target.check_expression
}

/// Uniqueness, method and columns. Column order is significant.
pub fn indexes_equal(source: &Index, target: &Index) -> bool {
    source.is_unique == target.is_unique
        && source.index_type == target.index_type
        && same_sequence(&source.columns, &target.columns)
}

/// Start, increment, bounds and cycling; the current value is runtime state.
pub fn sequences_equal(source: &Sequence, target: &Sequence) -> bool {
    source.start_value == target.start_value
        && source.increment == target.increment
        && source.min_value == target.min_value
        && source.max_value == target.max_value
        && source.is_cyclic == target.is_cyclic
}

pub fn views_equal(source: &View, target: &View) -> bool {
    source.definition == target.definition
}

/// Body only; parameters are not compared.
pub fn procedures_equal(source: &Procedure, target: &Procedure) -> bool {
    source.body == target.body
}

/// Body and return type; parameters are not compared.
pub fn functions_equal(source: &Function, target: &Function) -> bool {
    source.body == target.body && source.return_type == target.return_type
}

pub fn triggers_equal(source: &Trigger, target: &Trigger) -> bool {
    source.table_name == target.table_name
        && source.event == target.event
        && source.timing == target.timing
        && source.body == target.body
}

/// Element-wise, order-sensitive comparison
fn same_sequence(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Order-insensitive comparison that still counts duplicates
fn same_multiset(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
