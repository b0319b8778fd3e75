use proc_macro2::Ident;

use super::GenerateError;

/// `document_folder` -> `DocumentFolder`, `my-type` -> `MyType`.
///
/// Splits on `_`, `-` and spaces, upper-cases the first character of every
/// word and lower-cases the rest.
pub fn camelcase(s: &str) -> String {
    s.trim()
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `tenant/group#member` -> `group`.
pub fn extract_type(full_type: &str) -> &str {
    let type_name = full_type
        .split_once('/')
        .map_or(full_type, |(_, name)| name);
    type_name
        .split_once('#')
        .map_or(type_name, |(name, _)| name)
}

/// `group#member` -> `Some("member")`.
pub fn subject_fragment(full_type: &str) -> Option<&str> {
    full_type.split_once('#').map(|(_, fragment)| fragment)
}

/// Parses `text` as a Rust identifier, rejecting keywords and malformed names.
pub fn ident(text: &str) -> Result<Ident, GenerateError> {
    syn::parse_str::<Ident>(text).map_err(|_| GenerateError::InvalidIdentifier(text.to_string()))
}
