//! Order-independent SHA-256 fingerprint of a schema snapshot
//!
//! The snapshot is first projected onto a canonical form that keeps only
//! hash-significant fields, with every collection sorted by name and every
//! column list sorted by value. The canonical form borrows from the input and
//! is sorted as a separate value, so the caller's schema is never reordered.
//! Struct fields serialize in declaration order, which makes the JSON encoding
//! byte-stable.

use schemadiff_core::{
    Column, Constraint, ConstraintType, Function, Index, Parameter, ParameterDirection, Procedure,
    Result, Schema, Sequence, Table, Trigger, TriggerEvent, TriggerTiming, View,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// What goes into a fingerprint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerprintOptions {
    /// Hash non-empty table and column comments
    pub include_comments: bool,

    /// Hash tables and their children only
    pub tables_only: bool,
}

impl FingerprintOptions {
    pub fn with_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }

    pub fn with_tables_only(mut self, tables_only: bool) -> Self {
        self.tables_only = tables_only;
        self
    }
}

impl From<schemadiff_core::FingerprintConfig> for FingerprintOptions {
    fn from(config: schemadiff_core::FingerprintConfig) -> Self {
        Self {
            include_comments: config.include_comments,
            tables_only: config.tables_only,
        }
    }
}

/// Fingerprint a snapshot as 64 lowercase hex characters
pub fn fingerprint(schema: &Schema, options: &FingerprintOptions) -> Result<String> {
    let bytes = canonical_bytes(schema, options)?;
    let digest = Sha256::digest(&bytes);

    tracing::debug!(
        schema = %schema.name,
        tables = schema.tables.len(),
        include_comments = options.include_comments,
        tables_only = options.tables_only,
        bytes = bytes.len(),
        "computed fingerprint"
    );

    Ok(hex::encode(digest))
}

/// The exact bytes that get hashed
pub fn canonical_bytes(schema: &Schema, options: &FingerprintOptions) -> Result<Vec<u8>> {
    let canonical = CanonicalSchema::new(schema, options);
    Ok(serde_json::to_vec(&canonical)?)
}

#[derive(Serialize)]
struct CanonicalSchema<'a> {
    tables: Vec<CanonicalTable<'a>>,
    views: Vec<CanonicalView<'a>>,
    indexes: Vec<CanonicalIndex<'a>>,
    sequences: Vec<CanonicalSequence<'a>>,
    procedures: Vec<CanonicalProcedure<'a>>,
    functions: Vec<CanonicalFunction<'a>>,
    triggers: Vec<CanonicalTrigger<'a>>,
}

impl<'a> CanonicalSchema<'a> {
    fn new(schema: &'a Schema, options: &FingerprintOptions) -> Self {
        let tables = by_name(&schema.tables, |t| t.name.as_str(), |t| CanonicalTable::new(t, options));

        if options.tables_only {
            return Self {
                tables,
                views: Vec::new(),
                indexes: Vec::new(),
                sequences: Vec::new(),
                procedures: Vec::new(),
                functions: Vec::new(),
                triggers: Vec::new(),
            };
        }

        Self {
            tables,
            views: by_name(&schema.views, |v| v.name.as_str(), CanonicalView::new),
            indexes: by_name(&schema.indexes, |i| i.name.as_str(), |i| CanonicalIndex::new(i, true)),
            sequences: by_name(&schema.sequences, |s| s.name.as_str(), CanonicalSequence::new),
            procedures: by_name(&schema.procedures, |p| p.name.as_str(), CanonicalProcedure::new),
            functions: by_name(&schema.functions, |f| f.name.as_str(), CanonicalFunction::new),
            triggers: by_name(&schema.triggers, |t| t.name.as_str(), CanonicalTrigger::new),
        }
    }
}

#[derive(Serialize)]
struct CanonicalTable<'a> {
    name: &'a str,
    columns: Vec<CanonicalColumn<'a>>,
    constraints: Vec<CanonicalConstraint<'a>>,
    indexes: Vec<CanonicalIndex<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

impl<'a> CanonicalTable<'a> {
    fn new(table: &'a Table, options: &FingerprintOptions) -> Self {
        Self {
            name: &table.name,
            columns: by_name(&table.columns, |c| c.name.as_str(), |c| CanonicalColumn::new(c, options)),
            constraints: by_name(&table.constraints, |c| c.name.as_str(), CanonicalConstraint::new),
            indexes: by_name(&table.indexes, |i| i.name.as_str(), |i| CanonicalIndex::new(i, false)),
            comment: comment(&table.comment, options),
        }
    }
}

#[derive(Serialize)]
struct CanonicalColumn<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    data_type: &'a str,
    nullable: bool,
    primary_key: bool,
    unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

impl<'a> CanonicalColumn<'a> {
    fn new(column: &'a Column, options: &FingerprintOptions) -> Self {
        Self {
            name: &column.name,
            data_type: &column.data_type,
            nullable: column.is_nullable,
            primary_key: column.is_primary_key,
            unique: column.is_unique,
            default: column.default_value.as_deref(),
            auto_increment: column.is_auto_increment,
            comment: comment(&column.comment, options),
        }
    }
}

#[derive(Serialize)]
struct CanonicalConstraint<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    constraint_type: ConstraintType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    columns: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_table: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ref_columns: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_expr: Option<&'a str>,
}

impl<'a> CanonicalConstraint<'a> {
    fn new(constraint: &'a Constraint) -> Self {
        Self {
            name: &constraint.name,
            constraint_type: constraint.constraint_type,
            columns: sorted(&constraint.columns),
            ref_table: non_empty(constraint.referenced_table.as_deref()),
            ref_columns: sorted(&constraint.referenced_columns),
            check_expr: non_empty(constraint.check_expression.as_deref()),
        }
    }
}

#[derive(Serialize)]
struct CanonicalIndex<'a> {
    name: &'a str,
    /// Only schema-level indexes record their table
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<&'a str>,
    unique: bool,
    columns: Vec<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "str::is_empty")]
    index_type: &'a str,
}

impl<'a> CanonicalIndex<'a> {
    fn new(index: &'a Index, with_table: bool) -> Self {
        Self {
            name: &index.name,
            table: with_table.then_some(index.table_name.as_str()),
            unique: index.is_unique,
            columns: sorted(&index.columns),
            index_type: &index.index_type,
        }
    }
}

#[derive(Serialize)]
struct CanonicalView<'a> {
    name: &'a str,
    definition: &'a str,
}

impl<'a> CanonicalView<'a> {
    fn new(view: &'a View) -> Self {
        Self {
            name: &view.name,
            definition: &view.definition,
        }
    }
}

#[derive(Serialize)]
struct CanonicalSequence<'a> {
    name: &'a str,
    start: i64,
    increment: i64,
    min_value: i64,
    max_value: i64,
    cyclic: bool,
}

impl<'a> CanonicalSequence<'a> {
    fn new(sequence: &'a Sequence) -> Self {
        Self {
            name: &sequence.name,
            start: sequence.start_value,
            increment: sequence.increment,
            min_value: sequence.min_value,
            max_value: sequence.max_value,
            cyclic: sequence.is_cyclic,
        }
    }
}

#[derive(Serialize)]
struct CanonicalParameter<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    data_type: &'a str,
    direction: ParameterDirection,
}

#[derive(Serialize)]
struct CanonicalProcedure<'a> {
    name: &'a str,
    parameters: Vec<CanonicalParameter<'a>>,
    body: &'a str,
}

impl<'a> CanonicalProcedure<'a> {
    fn new(procedure: &'a Procedure) -> Self {
        Self {
            name: &procedure.name,
            parameters: parameters(&procedure.parameters),
            body: &procedure.body,
        }
    }
}

#[derive(Serialize)]
struct CanonicalFunction<'a> {
    name: &'a str,
    parameters: Vec<CanonicalParameter<'a>>,
    return_type: &'a str,
    body: &'a str,
}

impl<'a> CanonicalFunction<'a> {
    fn new(function: &'a Function) -> Self {
        Self {
            name: &function.name,
            parameters: parameters(&function.parameters),
            return_type: &function.return_type,
            body: &function.body,
        }
    }
}

#[derive(Serialize)]
struct CanonicalTrigger<'a> {
    name: &'a str,
    table: &'a str,
    event: TriggerEvent,
    timing: TriggerTiming,
    body: &'a str,
}

impl<'a> CanonicalTrigger<'a> {
    fn new(trigger: &'a Trigger) -> Self {
        Self {
            name: &trigger.name,
            table: &trigger.table_name,
            event: trigger.event,
            timing: trigger.timing,
            body: &trigger.body,
        }
    }
}

/// Project and sort a named collection; a repeated name keeps its last entry
fn by_name<'a, T, C>(
    items: &'a [T],
    name_of: impl Fn(&'a T) -> &'a str,
    project: impl Fn(&'a T) -> C,
) -> Vec<C> {
    items
        .iter()
        .map(|item| (name_of(item), item))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .map(project)
        .collect()
}

/// Parameters sorted by name, then type; duplicates are kept
fn parameters(params: &[Parameter]) -> Vec<CanonicalParameter<'_>> {
    let mut params: Vec<_> = params
        .iter()
        .map(|p| CanonicalParameter {
            name: &p.name,
            data_type: &p.data_type,
            direction: p.direction,
        })
        .collect();
    params.sort_by(|a, b| (a.name, a.data_type).cmp(&(b.name, b.data_type)));
    params
}

fn sorted(values: &[String]) -> Vec<&str> {
    let mut values: Vec<&str> = values.iter().map(String::as_str).collect();
    values.sort_unstable();
    values
}

fn comment<'a>(text: &'a str, options: &FingerprintOptions) -> Option<&'a str> {
    if options.include_comments {
        non_empty(Some(text))
    } else {
        None
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadiff_core::DatabaseType;

    fn schema() -> Schema {
        Schema::new("app", DatabaseType::Mysql)
    }

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "int").primary_key().auto_increment().with_position(1))
            .with_column(Column::new("email", "varchar(255)").unique().with_position(2))
            .with_index(Index::new("idx_email", "users", ["email"]).unique())
    }

    fn hash(schema: &Schema) -> String {
        fingerprint(schema, &FingerprintOptions::default()).unwrap()
    }

    #[test]
    fn test_digest_shape() {
        let digest = hash(&schema().with_table(users()));

        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_empty_schema_digest_is_stable() {
        let bytes = canonical_bytes(&schema(), &FingerprintOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"tables":[],"views":[],"indexes":[],"sequences":[],"procedures":[],"functions":[],"triggers":[]}"#
        );
    }

    #[test]
    fn test_canonical_column_fields() {
        let s = schema().with_table(Table::new("t").with_column(Column::new("c", "int").with_default("0")));
        let bytes = canonical_bytes(&s, &FingerprintOptions::default()).unwrap();
        let json = String::from_utf8(bytes).unwrap();

        assert!(json.contains(
            r#"{"name":"c","type":"int","nullable":true,"primary_key":false,"unique":false,"default":"0"}"#
        ));
        assert!(!json.contains("position"));
        assert!(!json.contains("auto_increment"));
    }

    #[test]
    fn test_position_not_hashed() {
        let mut moved = users();
        moved.columns[0].position = 7;

        assert_eq!(hash(&schema().with_table(users())), hash(&schema().with_table(moved)));
    }

    #[test]
    fn test_comments_only_with_option() {
        let plain = schema().with_table(users());
        let commented = schema().with_table(users().with_comment("accounts"));
        let with_comments = FingerprintOptions::default().with_comments(true);

        assert_eq!(hash(&plain), hash(&commented));
        assert_ne!(
            fingerprint(&plain, &with_comments).unwrap(),
            fingerprint(&commented, &with_comments).unwrap()
        );
    }

    #[test]
    fn test_empty_comment_same_as_absent_with_comments() {
        let mut table = users();
        table.columns[0].comment = String::new();
        let with_comments = FingerprintOptions::default().with_comments(true);

        assert_eq!(
            fingerprint(&schema().with_table(users()), &with_comments).unwrap(),
            fingerprint(&schema().with_table(table), &with_comments).unwrap()
        );
    }

    #[test]
    fn test_sequence_current_value_not_hashed() {
        let a = Sequence::new("seq");
        let mut b = a.clone();
        b.current_value = 99;

        assert_eq!(hash(&schema().with_sequence(a)), hash(&schema().with_sequence(b)));
    }

    #[test]
    fn test_referential_actions_not_hashed() {
        let fk = Constraint::foreign_key("fk", ["user_id"], "users", ["id"]);
        let a = schema().with_table(Table::new("orders").with_constraint(fk.clone()));
        let b = schema().with_table(
            Table::new("orders").with_constraint(fk.with_actions(Some("CASCADE"), Some("CASCADE"))),
        );

        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_tables_only_ignores_other_objects() {
        let base = schema().with_table(users());
        let extra = base.clone().with_view(View::new("v", "SELECT 1"));
        let tables_only = FingerprintOptions::default().with_tables_only(true);

        assert_ne!(hash(&base), hash(&extra));
        assert_eq!(
            fingerprint(&base, &tables_only).unwrap(),
            fingerprint(&extra, &tables_only).unwrap()
        );
    }

    #[test]
    fn test_table_index_and_schema_index_differ() {
        // Schema-level indexes also hash their table name.
        let idx = Index::new("idx", "users", ["email"]);
        let a = schema().with_table(Table::new("users").with_index(idx.clone()));
        let b = schema().with_table(Table::new("users")).with_index(idx);

        assert_ne!(hash(&a), hash(&b));
    }

    #[test]
    fn test_input_not_reordered() {
        let s = schema()
            .with_table(Table::new("zeta"))
            .with_table(
                Table::new("alpha")
                    .with_column(Column::new("b", "int"))
                    .with_column(Column::new("a", "int"))
                    .with_index(Index::new("idx", "alpha", ["b", "a"])),
            );
        let before = s.clone();

        hash(&s);

        assert_eq!(s, before);
    }

    #[test]
    fn test_options_from_config() {
        let config = schemadiff_core::FingerprintConfig {
            include_comments: true,
            tables_only: false,
        };
        let options = FingerprintOptions::from(config);

        assert!(options.include_comments);
        assert!(!options.tables_only);
    }
}
