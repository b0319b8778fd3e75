use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Illegal,
    Identifier,
    Definition,
    Relation,
    Permission,
    Equal,
    Plus,
    Minus,
    Pipe,
    Wildcard,
    LBrace,
    RBrace,
    Colon,
    Slash,
    Hash,
    Arrow,
}

impl TokenKind {
    /// Human-readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Illegal => "illegal character",
            TokenKind::Identifier => "identifier",
            TokenKind::Definition => "'definition'",
            TokenKind::Relation => "'relation'",
            TokenKind::Permission => "'permission'",
            TokenKind::Equal => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Pipe => "'|'",
            TokenKind::Wildcard => "'*'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Slash => "'/'",
            TokenKind::Hash => "'#'",
            TokenKind::Arrow => "'->'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

pub fn keyword_lookup(ident: &str) -> Option<TokenKind> {
    match ident {
        "definition" => Some(TokenKind::Definition),
        "relation" => Some(TokenKind::Relation),
        "permission" => Some(TokenKind::Permission),
        _ => None,
    }
}

/// 1-based source location of the first character of a token or node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "{} at {}", self.kind, self.position()),
            _ => write!(f, "{} `{}` at {}", self.kind, self.text, self.position()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized_by_exact_match() {
        assert_eq!(keyword_lookup("definition"), Some(TokenKind::Definition));
        assert_eq!(keyword_lookup("relation"), Some(TokenKind::Relation));
        assert_eq!(keyword_lookup("permission"), Some(TokenKind::Permission));
        assert_eq!(keyword_lookup("Definition"), None);
        assert_eq!(keyword_lookup("relations"), None);
    }

    #[test]
    fn token_display_includes_text_and_position() {
        let tok = Token::new(TokenKind::Identifier, "viewer", 3, 14);
        assert_eq!(tok.to_string(), "identifier `viewer` at 3:14");

        let eof = Token::new(TokenKind::Eof, "", 7, 1);
        assert_eq!(eof.to_string(), "end of input at 7:1");
    }
}
