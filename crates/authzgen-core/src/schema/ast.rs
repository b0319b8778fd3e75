use std::fmt;

use super::token::Position;

/// `user` (no prefix) or `tenant/user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectTypeRef {
    pub name: String,
    pub prefix: Option<String>,
}

impl ObjectTypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
        }
    }

    pub fn prefixed(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: Some(prefix.into()),
        }
    }
}

impl fmt::Display for ObjectTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionNode {
    pub object_type: ObjectTypeRef,
    pub relations: Vec<RelationNode>,
    pub permissions: Vec<PermissionNode>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationNode {
    pub name: String,
    pub expression: RelationExpr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNode {
    pub name: String,
    pub expression: PermissionExpr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationExpr {
    /// `type`, `prefix/type` or either with a `#relation` subject fragment.
    Single {
        type_name: String,
        subject_relation: Option<String>,
    },
    Union(Box<RelationExpr>, Box<RelationExpr>),
}

impl RelationExpr {
    pub fn single(type_name: impl Into<String>) -> Self {
        RelationExpr::Single {
            type_name: type_name.into(),
            subject_relation: None,
        }
    }

    pub fn userset(type_name: impl Into<String>, relation: impl Into<String>) -> Self {
        RelationExpr::Single {
            type_name: type_name.into(),
            subject_relation: Some(relation.into()),
        }
    }

    pub fn union(left: RelationExpr, right: RelationExpr) -> Self {
        RelationExpr::Union(Box::new(left), Box::new(right))
    }
}

impl fmt::Display for RelationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationExpr::Single {
                type_name,
                subject_relation: Some(relation),
            } => write!(f, "{type_name}#{relation}"),
            RelationExpr::Single {
                type_name,
                subject_relation: None,
            } => f.write_str(type_name),
            RelationExpr::Union(left, right) => write!(f, "{left} | {right}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Union,
    /// `->`, follow a relation then evaluate on the reached object.
    Arrow,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Union => "+",
            Operator::Arrow => "->",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionExpr {
    Identifier(String),
    BinaryOp {
        op: Operator,
        left: Box<PermissionExpr>,
        right: Box<PermissionExpr>,
    },
}

impl PermissionExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        PermissionExpr::Identifier(name.into())
    }

    pub fn binary(op: Operator, left: PermissionExpr, right: PermissionExpr) -> Self {
        PermissionExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Canonical infix form: operands left to right, operators padded with one space.
impl fmt::Display for PermissionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionExpr::Identifier(name) => f.write_str(name),
            PermissionExpr::BinaryOp { op, left, right } => write!(f, "{left} {op} {right}"),
        }
    }
}
