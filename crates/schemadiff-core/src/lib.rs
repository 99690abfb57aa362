//! schemadiff core
//!
//! Schema snapshot entity model, ignore patterns, typed differences and the
//! stable report formats shared by the engine and the CLI.

pub mod config;
pub mod difference;
pub mod error;
pub mod ignore;
pub mod report;
pub mod schema;
pub mod snapshot;

pub use config::{Config, ConfigError, FingerprintConfig, IgnoreConfig};
pub use difference::{Change, DiffKind, Difference, ObjectChange};
pub use error::{Error, Result};
pub use ignore::{IgnoreFilter, IgnorePattern, KindSelector};
pub use report::{ComparisonResult, DiffSummary, FingerprintReport, ReportVersion, SchemaRef};
pub use schema::{
    Column, Constraint, ConstraintType, DatabaseType, Function, Index, ObjectKind, Parameter,
    ParameterDirection, Procedure, Schema, SchemaStats, Sequence, Table, Trigger, TriggerEvent,
    TriggerTiming, View,
};
pub use snapshot::{load_schema, save_schema, LoadError};
