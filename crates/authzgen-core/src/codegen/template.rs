use std::collections::{HashMap, HashSet};

use proc_macro2::TokenStream;
use quote::quote;

use super::GenerateError;
use super::helpers::{camelcase, extract_type, ident, subject_fragment};
use crate::model::{Definition, Permission, Relation, Schema};

/// Support types emitted ahead of the per-definition structs.
const SUPPORT_TYPES: [&str; 5] = [
    "ObjectRef",
    "SubjectRef",
    "Relationship",
    "AuthzError",
    "PermissionsClient",
];

const FIXED_MEMBERS: [&str; 6] = [
    "OBJECT_TYPE",
    "new",
    "id",
    "object_ref",
    "as_subject",
    "as_subject_set",
];

/// Renders the schema to unformatted Rust source text. Definitions are
/// emitted sorted by name, so input order never reaches the output.
pub fn render(schema: &Schema) -> Result<String, GenerateError> {
    let mut definitions: Vec<&Definition> = schema.definitions.iter().collect();
    definitions.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.object_type.cmp(&b.object_type))
    });

    let mut type_names: HashMap<String, &str> = HashMap::new();
    let mut items = Vec::with_capacity(definitions.len());
    for def in definitions {
        let type_name = camelcase(&def.name);
        if SUPPORT_TYPES.contains(&type_name.as_str()) {
            return Err(GenerateError::ReservedTypeName {
                type_name,
                object_type: def.object_type.clone(),
            });
        }
        if let Some(first) = type_names.insert(type_name.clone(), &def.object_type) {
            return Err(GenerateError::DuplicateTypeName {
                type_name,
                first: first.to_string(),
                second: def.object_type.clone(),
            });
        }
        items.push(render_definition(def, &type_name)?);
    }

    let package = &schema.package;
    let module_doc = format!(" Authorization bindings for package `{package}`.");

    let tokens = quote! {
        #![doc = #module_doc]
        #![allow(dead_code)]

        use std::fmt;

        pub const PACKAGE: &str = #package;

        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct ObjectRef {
            pub object_type: &'static str,
            pub object_id: String,
        }

        impl fmt::Display for ObjectRef {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", self.object_type, self.object_id)
            }
        }

        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct SubjectRef {
            pub object_type: String,
            pub object_id: String,
            pub relation: Option<String>,
        }

        impl SubjectRef {
            pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
                Self {
                    object_type: object_type.into(),
                    object_id: object_id.into(),
                    relation: None,
                }
            }

            pub fn with_relation(
                object_type: impl Into<String>,
                object_id: impl Into<String>,
                relation: impl Into<String>,
            ) -> Self {
                Self {
                    object_type: object_type.into(),
                    object_id: object_id.into(),
                    relation: Some(relation.into()),
                }
            }

            /// `type` or `type#relation`, as listed in a relation's allowed subject types.
            pub fn type_key(&self) -> String {
                match &self.relation {
                    Some(relation) => format!("{}#{}", self.object_type, relation),
                    None => self.object_type.clone(),
                }
            }
        }

        impl fmt::Display for SubjectRef {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", self.object_type, self.object_id)?;
                if let Some(relation) = &self.relation {
                    write!(f, "#{}", relation)?;
                }
                Ok(())
            }
        }

        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct Relationship {
            pub resource: ObjectRef,
            pub relation: &'static str,
            pub subject: SubjectRef,
        }

        #[derive(Debug)]
        pub enum AuthzError<E> {
            Client(E),
            SubjectNotAllowed {
                relation: &'static str,
                subject_type: String,
            },
        }

        impl<E: fmt::Display> fmt::Display for AuthzError<E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    AuthzError::Client(err) => write!(f, "permissions client error: {}", err),
                    AuthzError::SubjectNotAllowed { relation, subject_type } => write!(
                        f,
                        "subject type `{}` is not allowed on relation `{}`",
                        subject_type, relation
                    ),
                }
            }
        }

        impl<E: fmt::Debug + fmt::Display> std::error::Error for AuthzError<E> {}

        /// Transport to the permissions service, supplied by the caller.
        pub trait PermissionsClient {
            type Error;

            fn write_relationships(&self, relationships: &[Relationship]) -> Result<(), Self::Error>;

            fn read_relationships(
                &self,
                resource: &ObjectRef,
                relation: &str,
            ) -> Result<Vec<Relationship>, Self::Error>;

            fn check_permission(
                &self,
                resource: &ObjectRef,
                permission: &str,
                subject: &SubjectRef,
            ) -> Result<bool, Self::Error>;

            fn lookup_resources(
                &self,
                resource_type: &str,
                permission: &str,
                subject: &SubjectRef,
            ) -> Result<Vec<String>, Self::Error>;
        }

        #(#items)*
    };

    Ok(tokens.to_string())
}

fn render_definition(def: &Definition, type_name: &str) -> Result<TokenStream, GenerateError> {
    let type_ident = ident(type_name)?;
    let object_type = &def.object_type;
    let doc = format!(" Object of type `{object_type}`.");

    check_member_names(def)?;

    let relations = def
        .relations
        .iter()
        .map(render_relation)
        .collect::<Result<Vec<_>, _>>()?;
    let permissions = def
        .permissions
        .iter()
        .map(render_permission)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct #type_ident {
            id: String,
        }

        impl #type_ident {
            pub const OBJECT_TYPE: &'static str = #object_type;

            pub fn new(id: impl Into<String>) -> Self {
                Self { id: id.into() }
            }

            pub fn id(&self) -> &str {
                &self.id
            }

            pub fn object_ref(&self) -> ObjectRef {
                ObjectRef {
                    object_type: Self::OBJECT_TYPE,
                    object_id: self.id.clone(),
                }
            }

            pub fn as_subject(&self) -> SubjectRef {
                SubjectRef::new(Self::OBJECT_TYPE, self.id.clone())
            }

            pub fn as_subject_set(&self, relation: &str) -> SubjectRef {
                SubjectRef::with_relation(Self::OBJECT_TYPE, self.id.clone(), relation)
            }

            #(#relations)*

            #(#permissions)*
        }
    })
}

fn relation_methods(name: &str) -> [String; 4] {
    [
        format!("{name}_subject_types"),
        format!("add_{name}"),
        format!("read_{name}"),
        format!("has_{name}"),
    ]
}

fn permission_methods(name: &str) -> [String; 2] {
    [format!("check_{name}"), format!("lookup_{name}")]
}

/// Every associated item in one generated `impl` block must be unique.
fn check_member_names(def: &Definition) -> Result<(), GenerateError> {
    let mut seen: HashSet<String> = FIXED_MEMBERS.iter().map(|m| m.to_string()).collect();
    let generated = def
        .relations
        .iter()
        .flat_map(|r| relation_methods(&r.name))
        .chain(
            def.permissions
                .iter()
                .flat_map(|p| permission_methods(&p.name)),
        );
    for method in generated {
        if !seen.insert(method.clone()) {
            return Err(GenerateError::DuplicateMethodName {
                object_type: def.object_type.clone(),
                method,
            });
        }
    }
    Ok(())
}

fn describe_subject(full_type: &str) -> String {
    let base = camelcase(extract_type(full_type));
    match subject_fragment(full_type) {
        Some(fragment) => format!("`{base}#{fragment}`"),
        None => format!("`{base}`"),
    }
}

fn render_relation(rel: &Relation) -> Result<TokenStream, GenerateError> {
    let name = &rel.name;
    let [subject_types_fn, add_fn, read_fn, has_fn] = relation_methods(name);
    let subject_types_fn = ident(&subject_types_fn)?;
    let add_fn = ident(&add_fn)?;
    let read_fn = ident(&read_fn)?;
    let has_fn = ident(&has_fn)?;
    let types = &rel.types;

    let allowed = rel
        .types
        .iter()
        .map(|t| describe_subject(t))
        .collect::<Vec<_>>()
        .join(", ");
    let add_doc = if rel.is_union {
        format!(" Writes a `{name}` relationship. Allowed subjects, any of: {allowed}.")
    } else {
        format!(" Writes a `{name}` relationship. Allowed subject: {allowed}.")
    };
    let types_doc = format!(" Subject types accepted by `{name}`.");
    let read_doc = format!(" Subjects currently related through `{name}`.");
    let has_doc = format!(" Checks whether `subject` is reachable through `{name}`.");

    Ok(quote! {
        #[doc = #types_doc]
        pub fn #subject_types_fn() -> &'static [&'static str] {
            &[#(#types),*]
        }

        #[doc = #add_doc]
        pub fn #add_fn<C: PermissionsClient>(
            &self,
            client: &C,
            subject: SubjectRef,
        ) -> Result<Relationship, AuthzError<C::Error>> {
            let subject_type = subject.type_key();
            if !Self::#subject_types_fn().contains(&subject_type.as_str()) {
                return Err(AuthzError::SubjectNotAllowed {
                    relation: #name,
                    subject_type,
                });
            }
            let relationship = Relationship {
                resource: self.object_ref(),
                relation: #name,
                subject,
            };
            client
                .write_relationships(std::slice::from_ref(&relationship))
                .map_err(AuthzError::Client)?;
            Ok(relationship)
        }

        #[doc = #read_doc]
        pub fn #read_fn<C: PermissionsClient>(
            &self,
            client: &C,
        ) -> Result<Vec<SubjectRef>, AuthzError<C::Error>> {
            client
                .read_relationships(&self.object_ref(), #name)
                .map(|relationships| relationships.into_iter().map(|r| r.subject).collect())
                .map_err(AuthzError::Client)
        }

        #[doc = #has_doc]
        pub fn #has_fn<C: PermissionsClient>(
            &self,
            client: &C,
            subject: &SubjectRef,
        ) -> Result<bool, AuthzError<C::Error>> {
            client
                .check_permission(&self.object_ref(), #name, subject)
                .map_err(AuthzError::Client)
        }
    })
}

fn render_permission(perm: &Permission) -> Result<TokenStream, GenerateError> {
    let name = &perm.name;
    let [check_fn, lookup_fn] = permission_methods(name);
    let check_fn = ident(&check_fn)?;
    let lookup_fn = ident(&lookup_fn)?;
    let check_doc = format!(" Permission `{name} = {}`.", perm.expression);
    let lookup_doc = format!(" Every object of this type on which `subject` holds `{name}`.");

    Ok(quote! {
        #[doc = #check_doc]
        pub fn #check_fn<C: PermissionsClient>(
            &self,
            client: &C,
            subject: &SubjectRef,
        ) -> Result<bool, AuthzError<C::Error>> {
            client
                .check_permission(&self.object_ref(), #name, subject)
                .map_err(AuthzError::Client)
        }

        #[doc = #lookup_doc]
        pub fn #lookup_fn<C: PermissionsClient>(
            client: &C,
            subject: &SubjectRef,
        ) -> Result<Vec<Self>, AuthzError<C::Error>> {
            client
                .lookup_resources(Self::OBJECT_TYPE, #name, subject)
                .map(|ids| ids.into_iter().map(Self::new).collect())
                .map_err(AuthzError::Client)
        }
    })
}
