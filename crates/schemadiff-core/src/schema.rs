//! Schema snapshot entity model
//!
//! Plain values describing one database schema at one point in time.
//! Readers build them once; the comparer and fingerprinter only read them.

use serde::{Deserialize, Serialize};

/// Database dialect a snapshot was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// PostgreSQL
    Postgresql,

    /// MySQL / MariaDB
    Mysql,

    /// Oracle
    Oracle,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgresql => write!(f, "postgresql"),
            Self::Mysql => write!(f, "mysql"),
            Self::Oracle => write!(f, "oracle"),
        }
    }
}

/// Kind of a named schema object
///
/// The lowercase selector (`table`, `column`, ...) is what ignore patterns
/// use; the label (`Table`, `Column`, ...) is what differences carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    Column,
    Constraint,
    Index,
    View,
    Sequence,
    Procedure,
    Function,
    Trigger,
}

impl ObjectKind {
    /// Every kind, in comparison order
    pub const ALL: [ObjectKind; 9] = [
        Self::Table,
        Self::Column,
        Self::Constraint,
        Self::Index,
        Self::View,
        Self::Sequence,
        Self::Procedure,
        Self::Function,
        Self::Trigger,
    ];

    /// Selector spelling used in ignore patterns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Constraint => "constraint",
            Self::Index => "index",
            Self::View => "view",
            Self::Sequence => "sequence",
            Self::Procedure => "procedure",
            Self::Function => "function",
            Self::Trigger => "trigger",
        }
    }

    /// Display label used in differences
    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Column => "Column",
            Self::Constraint => "Constraint",
            Self::Index => "Index",
            Self::View => "View",
            Self::Sequence => "Sequence",
            Self::Procedure => "Procedure",
            Self::Function => "Function",
            Self::Trigger => "Trigger",
        }
    }

    /// Parse a selector, case-insensitively
    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(selector))
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Kind of table constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
    NotNull,
}

impl std::fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimaryKey => write!(f, "PRIMARY_KEY"),
            Self::ForeignKey => write!(f, "FOREIGN_KEY"),
            Self::Unique => write!(f, "UNIQUE"),
            Self::Check => write!(f, "CHECK"),
            Self::NotNull => write!(f, "NOT_NULL"),
        }
    }
}

/// Routine parameter direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
}

/// Event that fires a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

/// When a trigger fires relative to its event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerTiming {
    Before,
    After,
}

/// A column of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Rendered data type, precision and scale included (e.g. `varchar(50)`)
    pub data_type: String,

    #[serde(default = "default_nullable")]
    pub is_nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_auto_increment: bool,

    #[serde(default)]
    pub comment: String,

    /// Display order only; never part of identity
    #[serde(default)]
    pub position: u32,
}

impl Column {
    /// Create a nullable column with no default
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default_value: None,
            is_primary_key: false,
            is_unique: false,
            is_auto_increment: false,
            comment: String::new(),
            position: 0,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// Set default value expression
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Mark as auto-increment / identity
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set ordinal position
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }
}

/// A table constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,

    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,

    /// Owned columns; order carries no meaning
    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,

    /// Referenced columns (foreign keys); order carries no meaning
    #[serde(default)]
    pub referenced_columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_expression: Option<String>,
}

impl Constraint {
    /// Create a constraint over the given columns
    pub fn new<I, S>(name: impl Into<String>, constraint_type: ConstraintType, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constraint_type,
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: None,
            referenced_columns: Vec::new(),
            on_update: None,
            on_delete: None,
            check_expression: None,
        }
    }

    /// Primary key over the given columns
    pub fn primary_key<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ConstraintType::PrimaryKey, columns)
    }

    /// Foreign key from `columns` to `referenced_table(referenced_columns)`
    pub fn foreign_key<I, S, J, T>(
        name: impl Into<String>,
        columns: I,
        referenced_table: impl Into<String>,
        referenced_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut constraint = Self::new(name, ConstraintType::ForeignKey, columns);
        constraint.referenced_table = Some(referenced_table.into());
        constraint.referenced_columns = referenced_columns.into_iter().map(Into::into).collect();
        constraint
    }

    /// Check constraint with the given expression
    pub fn check(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut constraint = Self::new(name, ConstraintType::Check, Vec::<String>::new());
        constraint.check_expression = Some(expression.into());
        constraint
    }

    /// Set referential actions
    pub fn with_actions(mut self, on_update: Option<&str>, on_delete: Option<&str>) -> Self {
        self.on_update = on_update.map(str::to_string);
        self.on_delete = on_delete.map(str::to_string);
        self
    }
}

/// An index, either schema-level or owned by a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,

    #[serde(default)]
    pub table_name: String,

    /// Indexed columns in scan order
    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub is_unique: bool,

    /// Index method (`btree`, `hash`, ...); empty when unknown
    #[serde(default, rename = "type")]
    pub index_type: String,
}

impl Index {
    /// Create a non-unique index
    pub fn new<I, S>(name: impl Into<String>, table_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            is_unique: false,
            index_type: String::new(),
        }
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Set index method
    pub fn with_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = index_type.into();
        self
    }
}

/// A base table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub indexes: Vec<Index>,

    #[serde(default)]
    pub comment: String,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            comment: String::new(),
        }
    }

    /// Set owning schema name
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a constraint
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Append a table-scoped index
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A view; only its definition text takes part in comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub definition: String,

    #[serde(default)]
    pub columns: Vec<Column>,
}

impl View {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            definition: definition.into(),
            columns: Vec::new(),
        }
    }
}

/// A sequence generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub start_value: i64,

    #[serde(default)]
    pub increment: i64,

    #[serde(default)]
    pub min_value: i64,

    #[serde(default)]
    pub max_value: i64,

    #[serde(default)]
    pub is_cyclic: bool,

    /// Runtime state, not structure
    #[serde(default)]
    pub current_value: i64,
}

impl Sequence {
    /// Ascending, non-cyclic sequence starting at 1
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            start_value: 1,
            increment: 1,
            min_value: 1,
            max_value: i64::MAX,
            is_cyclic: false,
            current_value: 1,
        }
    }
}

/// A routine parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    pub data_type: String,

    #[serde(default = "default_direction")]
    pub direction: ParameterDirection,
}

fn default_nullable() -> bool {
    true
}

fn default_direction() -> ParameterDirection {
    ParameterDirection::In
}

impl Parameter {
    /// An `IN` parameter
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            direction: ParameterDirection::In,
        }
    }

    /// Set direction
    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// A stored procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub body: String,
}

impl Procedure {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            parameters: Vec::new(),
            body: body.into(),
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A stored function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub return_type: String,

    #[serde(default)]
    pub body: String,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            parameters: Vec::new(),
            return_type: return_type.into(),
            body: body.into(),
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A trigger on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub schema: String,

    pub name: String,

    pub table_name: String,

    pub event: TriggerEvent,

    pub timing: TriggerTiming,

    #[serde(default)]
    pub body: String,
}

impl Trigger {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        event: TriggerEvent,
        timing: TriggerTiming,
        body: impl Into<String>,
    ) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            table_name: table_name.into(),
            event,
            timing,
            body: body.into(),
        }
    }
}

/// Object counts for a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStats {
    pub tables: usize,
    pub views: usize,
    pub indexes: usize,
    pub sequences: usize,
    pub procedures: usize,
    pub functions: usize,
    pub triggers: usize,

    /// Columns across all tables
    pub total_columns: usize,
}

/// A schema snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,

    pub database_type: DatabaseType,

    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default)]
    pub views: Vec<View>,

    #[serde(default)]
    pub indexes: Vec<Index>,

    #[serde(default)]
    pub sequences: Vec<Sequence>,

    #[serde(default)]
    pub procedures: Vec<Procedure>,

    #[serde(default)]
    pub functions: Vec<Function>,

    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl Schema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>, database_type: DatabaseType) -> Self {
        Self {
            name: name.into(),
            database_type,
            tables: Vec::new(),
            views: Vec::new(),
            indexes: Vec::new(),
            sequences: Vec::new(),
            procedures: Vec::new(),
            functions: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.views.push(view);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn with_procedure(mut self, procedure: Procedure) -> Self {
        self.procedures.push(procedure);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Count objects per kind
    pub fn stats(&self) -> SchemaStats {
        SchemaStats {
            tables: self.tables.len(),
            views: self.views.len(),
            indexes: self.indexes.len(),
            sequences: self.sequences.len(),
            procedures: self.procedures.len(),
            functions: self.functions.len(),
            triggers: self.triggers.len(),
            total_columns: self.tables.iter().map(|t| t.columns.len()).sum(),
        }
    }

    /// Copy of this schema with everything but tables dropped
    pub fn tables_only(&self) -> Self {
        Self {
            tables: self.tables.clone(),
            ..Self::new(self.name.clone(), self.database_type)
        }
    }
}
