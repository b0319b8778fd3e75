pub mod ast;
mod lexer;
mod parser;
pub mod token;
mod validation;

pub use lexer::{Lexer, tokenize};
pub use parser::{
    MismatchReason, ParseError, Parser, parse, parse_permission_expression, parse_schema,
};
pub use validation::{
    SchemaLimits, SemanticError, ValidationError, check_semantics, validate_schema_limits,
};
