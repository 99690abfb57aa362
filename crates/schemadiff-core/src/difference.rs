//! Differences between two schema snapshots
//!
//! Each difference carries a typed payload keyed by object kind, so the
//! pre- and post-images are always the entity type the label promises.

use crate::schema::{Column, Constraint, Function, Index, ObjectKind, Procedure, Sequence, Table, Trigger, View};
use serde::{Deserialize, Serialize};

/// How an object differs between source and target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
    /// Present only in target
    Added,

    /// Present only in source
    Removed,

    /// Present in both, but not equal
    Modified,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
            Self::Modified => "MODIFIED",
        }
    }
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pre-image and/or post-image of a changed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Change<T> {
    Added { target: T },
    Removed { source: T },
    Modified { source: T, target: T },
}

impl<T> Change<T> {
    pub fn kind(&self) -> DiffKind {
        match self {
            Self::Added { .. } => DiffKind::Added,
            Self::Removed { .. } => DiffKind::Removed,
            Self::Modified { .. } => DiffKind::Modified,
        }
    }

    /// Source image, if the object exists in source
    pub fn source(&self) -> Option<&T> {
        match self {
            Self::Removed { source } | Self::Modified { source, .. } => Some(source),
            Self::Added { .. } => None,
        }
    }

    /// Target image, if the object exists in target
    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Added { target } | Self::Modified { target, .. } => Some(target),
            Self::Removed { .. } => None,
        }
    }

    /// Flip source and target
    pub fn inverted(self) -> Self {
        match self {
            Self::Added { target } => Self::Removed { source: target },
            Self::Removed { source } => Self::Added { target: source },
            Self::Modified { source, target } => Self::Modified {
                source: target,
                target: source,
            },
        }
    }
}

/// A change tagged with the kind of object it concerns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object_type", content = "change", rename_all = "snake_case")]
pub enum ObjectChange {
    Table(Change<Box<Table>>),
    TableComment(Change<String>),
    Column(Change<Column>),
    Constraint(Change<Constraint>),
    Index(Change<Index>),
    View(Change<View>),
    Sequence(Change<Sequence>),
    Procedure(Change<Procedure>),
    Function(Change<Function>),
    Trigger(Change<Trigger>),
}

impl ObjectChange {
    pub fn kind(&self) -> DiffKind {
        match self {
            Self::Table(c) => c.kind(),
            Self::TableComment(c) => c.kind(),
            Self::Column(c) => c.kind(),
            Self::Constraint(c) => c.kind(),
            Self::Index(c) => c.kind(),
            Self::View(c) => c.kind(),
            Self::Sequence(c) => c.kind(),
            Self::Procedure(c) => c.kind(),
            Self::Function(c) => c.kind(),
            Self::Trigger(c) => c.kind(),
        }
    }

    /// Object kind the change belongs to; a table comment belongs to its table
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Table(_) | Self::TableComment(_) => ObjectKind::Table,
            Self::Column(_) => ObjectKind::Column,
            Self::Constraint(_) => ObjectKind::Constraint,
            Self::Index(_) => ObjectKind::Index,
            Self::View(_) => ObjectKind::View,
            Self::Sequence(_) => ObjectKind::Sequence,
            Self::Procedure(_) => ObjectKind::Procedure,
            Self::Function(_) => ObjectKind::Function,
            Self::Trigger(_) => ObjectKind::Trigger,
        }
    }

    /// Human-readable object type label
    pub fn label(&self) -> &'static str {
        match self {
            Self::TableComment(_) => "Table Comment",
            other => other.object_kind().label(),
        }
    }

    /// Same change seen from the other side
    pub fn inverted(self) -> Self {
        match self {
            Self::Table(c) => Self::Table(c.inverted()),
            Self::TableComment(c) => Self::TableComment(c.inverted()),
            Self::Column(c) => Self::Column(c.inverted()),
            Self::Constraint(c) => Self::Constraint(c.inverted()),
            Self::Index(c) => Self::Index(c.inverted()),
            Self::View(c) => Self::View(c.inverted()),
            Self::Sequence(c) => Self::Sequence(c.inverted()),
            Self::Procedure(c) => Self::Procedure(c.inverted()),
            Self::Function(c) => Self::Function(c.inverted()),
            Self::Trigger(c) => Self::Trigger(c.inverted()),
        }
    }
}

/// One classified difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    /// Qualified object name, e.g. `users` or `users.email`
    pub object_name: String,

    /// Human-readable description
    pub description: String,

    /// Typed before/after images
    #[serde(flatten)]
    pub change: ObjectChange,
}

impl Difference {
    pub fn new(object_name: impl Into<String>, description: impl Into<String>, change: ObjectChange) -> Self {
        Self {
            object_name: object_name.into(),
            description: description.into(),
            change,
        }
    }

    pub fn kind(&self) -> DiffKind {
        self.change.kind()
    }

    /// Object type label (`Table`, `Column`, `Table Comment`, ...)
    pub fn object_type(&self) -> &'static str {
        self.change.label()
    }
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.kind(),
            self.object_type(),
            self.object_name,
            self.description
        )
    }
}
