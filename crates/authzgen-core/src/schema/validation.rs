use std::collections::HashMap;

use super::ast::DefinitionNode;
use super::token::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLimits {
    pub max_definitions: usize,
    pub max_relations_per_definition: usize,
    pub max_permissions_per_definition: usize,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            max_definitions: 200,
            max_relations_per_definition: 64,
            max_permissions_per_definition: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("too many definitions: {count} exceeds limit of {limit}")]
    TooManyDefinitions { count: usize, limit: usize },
    #[error("too many relations in definition '{object_type}': {count} exceeds limit of {limit}")]
    TooManyRelations {
        object_type: String,
        count: usize,
        limit: usize,
    },
    #[error(
        "too many permissions in definition '{object_type}': {count} exceeds limit of {limit}"
    )]
    TooManyPermissions {
        object_type: String,
        count: usize,
        limit: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error(
        "duplicate definition '{object_type}' at line {line} (first declared at line {first_line})"
    )]
    DuplicateDefinition {
        object_type: String,
        line: usize,
        first_line: usize,
    },
    #[error(
        "duplicate relation or permission '{member}' in definition '{object_type}' at line {line} (first declared at line {first_line})"
    )]
    DuplicateMember {
        object_type: String,
        member: String,
        line: usize,
        first_line: usize,
    },
}

impl SemanticError {
    pub fn line(&self) -> usize {
        match self {
            SemanticError::DuplicateDefinition { line, .. }
            | SemanticError::DuplicateMember { line, .. } => *line,
        }
    }
}

/// Rejects repeated definitions and repeated member names within a definition.
///
/// Relations and permissions share one namespace. Only the first problem is
/// reported.
pub fn check_semantics(definitions: &[DefinitionNode]) -> Result<(), SemanticError> {
    let mut seen_types: HashMap<String, Position> = HashMap::new();

    for def in definitions {
        let object_type = def.object_type.to_string();
        if let Some(first) = seen_types.get(&object_type) {
            return Err(SemanticError::DuplicateDefinition {
                object_type,
                line: def.position.line,
                first_line: first.line,
            });
        }

        let mut members: Vec<(&str, Position)> = def
            .relations
            .iter()
            .map(|r| (r.name.as_str(), r.position))
            .chain(
                def.permissions
                    .iter()
                    .map(|p| (p.name.as_str(), p.position)),
            )
            .collect();
        members.sort_by_key(|(_, pos)| (pos.line, pos.column));

        let mut seen_members: HashMap<&str, Position> = HashMap::new();
        for (name, pos) in members {
            if let Some(first) = seen_members.get(name) {
                return Err(SemanticError::DuplicateMember {
                    object_type,
                    member: name.to_string(),
                    line: pos.line,
                    first_line: first.line,
                });
            }
            seen_members.insert(name, pos);
        }

        seen_types.insert(object_type, def.position);
    }

    Ok(())
}

pub fn validate_schema_limits(
    definitions: &[DefinitionNode],
    limits: &SchemaLimits,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if definitions.len() > limits.max_definitions {
        errors.push(ValidationError::TooManyDefinitions {
            count: definitions.len(),
            limit: limits.max_definitions,
        });
    }

    for def in definitions {
        if def.relations.len() > limits.max_relations_per_definition {
            errors.push(ValidationError::TooManyRelations {
                object_type: def.object_type.to_string(),
                count: def.relations.len(),
                limit: limits.max_relations_per_definition,
            });
        }
        if def.permissions.len() > limits.max_permissions_per_definition {
            errors.push(ValidationError::TooManyPermissions {
                object_type: def.object_type.to_string(),
                count: def.permissions.len(),
                limit: limits.max_permissions_per_definition,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
