use crate::schema::ast::{DefinitionNode, RelationExpr};

/// Package used when the first definition carries no prefix.
pub const DEFAULT_PACKAGE: &str = "authz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Package shared by every definition in the compiled unit.
    pub package: String,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub package: String,
    /// `prefix/name`, or `name` for unprefixed definitions.
    pub object_type: String,
    pub relations: Vec<Relation>,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub types: Vec<String>,
    pub is_union: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: String,
    pub expression: String,
}

impl Schema {
    pub fn get_definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// Lowers parsed definitions into the semantic model.
///
/// Each definition's package is its prefix, or `default_package` when it has
/// none. The schema-level package is taken from the first definition only, so
/// a document mixing prefixes still lands in a single package.
pub fn extract(definitions: &[DefinitionNode], default_package: &str) -> Schema {
    let definitions: Vec<Definition> = definitions
        .iter()
        .map(|def| extract_definition(def, default_package))
        .collect();

    let package = definitions
        .first()
        .map_or_else(|| default_package.to_string(), |d| d.package.clone());

    Schema {
        package,
        definitions,
    }
}

fn extract_definition(def: &DefinitionNode, default_package: &str) -> Definition {
    let relations = def
        .relations
        .iter()
        .map(|rel| {
            let mut types = Vec::new();
            flatten_relation(&rel.expression, &mut types);
            Relation {
                name: rel.name.clone(),
                is_union: types.len() > 1,
                types,
            }
        })
        .collect();

    let permissions = def
        .permissions
        .iter()
        .map(|perm| Permission {
            name: perm.name.clone(),
            expression: perm.expression.to_string(),
        })
        .collect();

    Definition {
        name: def.object_type.name.clone(),
        package: def
            .object_type
            .prefix
            .clone()
            .unwrap_or_else(|| default_package.to_string()),
        object_type: def.object_type.to_string(),
        relations,
        permissions,
    }
}

fn flatten_relation(expr: &RelationExpr, out: &mut Vec<String>) {
    match expr {
        RelationExpr::Union(left, right) => {
            flatten_relation(left, out);
            flatten_relation(right, out);
        }
        leaf @ RelationExpr::Single { .. } => out.push(leaf.to_string()),
    }
}
