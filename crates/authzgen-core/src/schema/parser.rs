use std::fmt;

use super::ast::{
    DefinitionNode, ObjectTypeRef, Operator, PermissionExpr, PermissionNode, RelationExpr,
    RelationNode,
};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    UnexpectedEof,
    IllegalCharacter,
    MissingOpeningBrace,
    MissingSlash,
    MissingClosingBrace,
    TokenMismatch,
}

impl MismatchReason {
    fn classify(expected: TokenKind, found: TokenKind) -> Self {
        match (expected, found) {
            (e, TokenKind::Eof) if e != TokenKind::Eof => MismatchReason::UnexpectedEof,
            (_, TokenKind::Illegal) => MismatchReason::IllegalCharacter,
            (TokenKind::LBrace, TokenKind::Identifier) => MismatchReason::MissingOpeningBrace,
            (TokenKind::Slash, TokenKind::Identifier) => MismatchReason::MissingSlash,
            (TokenKind::RBrace, _) => MismatchReason::MissingClosingBrace,
            _ => MismatchReason::TokenMismatch,
        }
    }
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MismatchReason::UnexpectedEof => "unexpected end of file",
            MismatchReason::IllegalCharacter => "illegal character encountered",
            MismatchReason::MissingOpeningBrace => {
                "missing opening brace after object type definition"
            }
            MismatchReason::MissingSlash => {
                "missing slash in object type definition (expected format: prefix/name)"
            }
            MismatchReason::MissingClosingBrace => "missing closing brace to end definition block",
            MismatchReason::TokenMismatch => "token mismatch",
        })
    }
}

fn describe_found(kind: &TokenKind, literal: &str) -> String {
    match kind {
        TokenKind::Identifier | TokenKind::Illegal => format!("{kind} '{literal}'"),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{reason}: expected {expected}, got {} at line {line}", describe_found(.found, .literal))]
    UnexpectedToken {
        reason: MismatchReason,
        expected: TokenKind,
        found: TokenKind,
        literal: String,
        line: usize,
        column: usize,
    },
    #[error(
        "expected either '/' (for prefix/name format) or '{{' (for standard format) after identifier '{identifier}', got {} at line {line}",
        describe_found(.found, .literal)
    )]
    AmbiguousObjectType {
        identifier: String,
        found: TokenKind,
        literal: String,
        line: usize,
        column: usize,
    },
    #[error("unexpected {} after permission expression at line {line}", describe_found(.found, .literal))]
    TrailingInput {
        found: TokenKind,
        literal: String,
        line: usize,
        column: usize,
    },
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<ParseError>,
    },
}

impl ParseError {
    fn mismatch(expected: TokenKind, found: &Token) -> Self {
        ParseError::UnexpectedToken {
            reason: MismatchReason::classify(expected, found.kind),
            expected,
            found: found.kind,
            literal: found.text.clone(),
            line: found.line,
            column: found.column,
        }
    }

    fn context(self, context: impl Into<String>) -> Self {
        ParseError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, stripped of enclosing production context.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// 1-based line of the offending token.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::AmbiguousObjectType { line, .. }
            | ParseError::TrailingInput { line, .. } => *line,
            ParseError::Context { source, .. } => source.line(),
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { column, .. }
            | ParseError::AmbiguousObjectType { column, .. }
            | ParseError::TrailingInput { column, .. } => *column,
            ParseError::Context { source, .. } => source.column(),
        }
    }

    /// The token kind the parser wanted, when the failure was a plain mismatch.
    pub fn expected(&self) -> Option<TokenKind> {
        match self.root() {
            ParseError::UnexpectedToken { expected, .. } => Some(*expected),
            _ => None,
        }
    }

    pub fn found(&self) -> TokenKind {
        match self {
            ParseError::UnexpectedToken { found, .. }
            | ParseError::AmbiguousObjectType { found, .. }
            | ParseError::TrailingInput { found, .. } => *found,
            ParseError::Context { source, .. } => source.found(),
        }
    }
}

pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    eof: Token,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, "", line, column),
        }
    }

    pub fn parse_definitions(&mut self) -> Result<Vec<DefinitionNode>, ParseError> {
        let mut definitions = Vec::new();
        while !self.peek().is(TokenKind::Eof) {
            if !self.peek().is(TokenKind::Definition) {
                return Err(ParseError::mismatch(TokenKind::Definition, self.peek()));
            }
            definitions.push(self.parse_definition()?);
        }
        Ok(definitions)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn consume(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let token = self.peek();
        if token.is(expected) {
            let token = token.clone();
            self.advance();
            Ok(token)
        } else {
            Err(ParseError::mismatch(expected, token))
        }
    }

    fn parse_definition(&mut self) -> Result<DefinitionNode, ParseError> {
        let keyword = self.consume(TokenKind::Definition)?;
        let first = self
            .consume(TokenKind::Identifier)
            .map_err(|e| e.context("expected object type identifier after 'definition'"))?;

        let object_type = match self.peek().kind {
            TokenKind::Slash => {
                self.advance();
                let name = self.consume(TokenKind::Identifier).map_err(|e| {
                    e.context(format!("expected object type name after '{}/'", first.text))
                })?;
                ObjectTypeRef::prefixed(first.text, name.text)
            }
            TokenKind::LBrace => ObjectTypeRef::new(first.text),
            _ => {
                let next = self.peek();
                return Err(ParseError::AmbiguousObjectType {
                    identifier: first.text,
                    found: next.kind,
                    literal: next.text.clone(),
                    line: next.line,
                    column: next.column,
                });
            }
        };

        self.consume(TokenKind::LBrace)
            .map_err(|e| e.context(format!("expected '{{' after object type '{object_type}'")))?;

        let mut relations = Vec::new();
        let mut permissions = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Relation => relations.push(self.parse_relation()?),
                TokenKind::Permission => permissions.push(self.parse_permission()?),
                _ => break,
            }
        }

        self.consume(TokenKind::RBrace)
            .map_err(|e| e.context(format!("expected '}}' to close definition '{object_type}'")))?;

        Ok(DefinitionNode {
            object_type,
            relations,
            permissions,
            position: keyword.position(),
        })
    }

    fn parse_relation(&mut self) -> Result<RelationNode, ParseError> {
        let keyword = self.consume(TokenKind::Relation)?;
        let name = self
            .consume(TokenKind::Identifier)
            .map_err(|e| e.context("expected relation name after 'relation' keyword"))?;
        self.consume(TokenKind::Colon)
            .map_err(|e| e.context(format!("expected ':' after relation name '{}'", name.text)))?;
        let expression = self.parse_relation_expression().map_err(|e| {
            e.context(format!("failed to parse expression for relation '{}'", name.text))
        })?;

        Ok(RelationNode {
            name: name.text,
            expression,
            position: keyword.position(),
        })
    }

    fn parse_relation_expression(&mut self) -> Result<RelationExpr, ParseError> {
        let mut left = self.parse_single_relation()?;
        while self.peek().is(TokenKind::Pipe) {
            self.advance();
            let right = self.parse_single_relation()?;
            left = RelationExpr::union(left, right);
        }
        Ok(left)
    }

    fn parse_single_relation(&mut self) -> Result<RelationExpr, ParseError> {
        let mut type_name = self.consume(TokenKind::Identifier)?.text;

        if self.peek().is(TokenKind::Slash) {
            self.advance();
            let name = self
                .consume(TokenKind::Identifier)
                .map_err(|e| e.context(format!("expected type name after '{type_name}/'")))?;
            type_name = format!("{type_name}/{}", name.text);
        }

        let subject_relation = if self.peek().is(TokenKind::Hash) {
            self.advance();
            let fragment = self
                .consume(TokenKind::Identifier)
                .map_err(|e| e.context(format!("expected subject relation after '{type_name}#'")))?;
            Some(fragment.text)
        } else {
            None
        };

        Ok(RelationExpr::Single {
            type_name,
            subject_relation,
        })
    }

    fn parse_permission(&mut self) -> Result<PermissionNode, ParseError> {
        let keyword = self.consume(TokenKind::Permission)?;
        let name = self
            .consume(TokenKind::Identifier)
            .map_err(|e| e.context("expected permission name after 'permission' keyword"))?;
        self.consume(TokenKind::Equal)
            .map_err(|e| e.context(format!("expected '=' after permission name '{}'", name.text)))?;
        let expression = self.parse_permission_expression().map_err(|e| {
            e.context(format!("failed to parse expression for permission '{}'", name.text))
        })?;

        Ok(PermissionNode {
            name: name.text,
            expression,
            position: keyword.position(),
        })
    }

    fn parse_permission_expression(&mut self) -> Result<PermissionExpr, ParseError> {
        let mut left = self.parse_primary()?;
        while self.peek().is(TokenKind::Plus) {
            self.advance();
            let right = self.parse_primary()?;
            left = PermissionExpr::binary(Operator::Union, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<PermissionExpr, ParseError> {
        let mut left = PermissionExpr::Identifier(self.consume(TokenKind::Identifier)?.text);
        while self.peek().is(TokenKind::Arrow) {
            self.advance();
            let right = self.consume(TokenKind::Identifier)?;
            left = PermissionExpr::binary(
                Operator::Arrow,
                left,
                PermissionExpr::Identifier(right.text),
            );
        }
        Ok(left)
    }
}

pub fn parse(tokens: &[Token]) -> Result<Vec<DefinitionNode>, ParseError> {
    Parser::new(tokens).parse_definitions()
}

/// Parse a standalone permission expression that must span the whole token stream.
pub fn parse_permission_expression(tokens: &[Token]) -> Result<PermissionExpr, ParseError> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_permission_expression()?;
    let next = parser.peek();
    if !next.is(TokenKind::Eof) {
        return Err(ParseError::TrailingInput {
            found: next.kind,
            literal: next.text.clone(),
            line: next.line,
            column: next.column,
        });
    }
    Ok(expr)
}

pub fn parse_schema(src: &str) -> Result<Vec<DefinitionNode>, ParseError> {
    parse(&tokenize(src))
}
