//! Serialized entity model
//!
//! An entity is one declaration flattened into a single-line clause, tagged
//! with its kind and source position. Rule matching and XML export both
//! consume this shape.

use std::fmt;

/// Kind of declaration an entity was serialized from.
///
/// Import entities are tagged `use`, not `namespace`, even though their
/// clause carries the enclosing namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Use,
    Class,
    Const,
    Property,
    Param,
    Function,
    Var,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Use => "use",
            EntityKind::Class => "class",
            EntityKind::Const => "const",
            EntityKind::Property => "property",
            EntityKind::Param => "param",
            EntityKind::Function => "function",
            EntityKind::Var => "var",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One serialized declaration.
///
/// Immutable once emitted, except for `reason` which the rule engine fills
/// in on the first matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// 1-based source line of the originating node.
    pub line: usize,
    /// 0-based byte offset of the originating node in the source text.
    pub file_pos: usize,
    /// Whitespace-joined lexical context plus the declaration itself.
    pub clause: String,
    pub kind: EntityKind,
    /// Failure reason attached by the first matching rule.
    pub reason: Option<String>,
}

impl Entity {
    pub fn new(line: usize, file_pos: usize, clause: String, kind: EntityKind) -> Self {
        Self {
            line,
            file_pos,
            clause,
            kind,
            reason: None,
        }
    }
}
