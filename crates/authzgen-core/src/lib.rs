pub mod codegen;
pub mod compile;
pub mod model;
pub mod schema;

pub use codegen::{FormatError, GenerateError, Generated};
pub use compile::{Artifact, ArtifactWriter, CompileError, CompileOptions, Compiler, compile};
pub use model::{DEFAULT_PACKAGE, Definition, Permission, Relation, Schema};
pub use schema::{ParseError, SchemaLimits, SemanticError, ValidationError};
