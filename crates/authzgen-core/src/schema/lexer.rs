use super::token::{Token, TokenKind, keyword_lookup};

pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the remaining input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.is(TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                return tokens;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let (line, column) = (self.line, self.column);
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, "", line, column);
        };

        let kind = match ch {
            '=' => TokenKind::Equal,
            '+' => TokenKind::Plus,
            '|' => TokenKind::Pipe,
            '*' => TokenKind::Wildcard,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ':' => TokenKind::Colon,
            '/' => TokenKind::Slash,
            '#' => TokenKind::Hash,
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            c if is_ident_start(c) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.advance();
                }
                let text = &self.src[start..self.pos];
                let kind = keyword_lookup(text).unwrap_or(TokenKind::Identifier);
                return Token::new(kind, text, line, column);
            }
            _ => TokenKind::Illegal,
        };

        Token::new(kind, &self.src[start..self.pos], line, column)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    // Loops so that comments directly after whitespace or other comments are
    // all consumed before the next token starts.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_single_eof() {
        let tokens = tokenize("");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0], Token::new(TokenKind::Eof, "", 1, 1));
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("definition relation permission document _private r2d2"),
            vec![
                TokenKind::Definition,
                TokenKind::Relation,
                TokenKind::Permission,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            kinds("= + - | * { } : / # ->"),
            vec![
                TokenKind::Equal,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Pipe,
                TokenKind::Wildcard,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Colon,
                TokenKind::Slash,
                TokenKind::Hash,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn arrow_is_one_token_without_spaces() {
        let tokens = tokenize("parent->view");

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "parent");
        assert_eq!(tokens[1].kind, TokenKind::Arrow);
        assert_eq!(tokens[1].text, "->");
        assert_eq!(tokens[1].column, 7);
        assert_eq!(tokens[2].text, "view");
        assert_eq!(tokens[2].column, 9);
    }

    #[test]
    fn minus_without_gt_falls_back_to_single_char() {
        let tokens = tokenize("a - b");

        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert_eq!(tokens[1].text, "-");
    }

    #[test]
    fn slash_and_comment_are_disambiguated_by_second_slash() {
        let tokens = tokenize("tenant/user // trailing comment\nnext");

        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[3].text, "next");
        assert_eq!(tokens[3].line, 2);
    }

    #[test]
    fn consecutive_comments_and_whitespace_are_skipped() {
        let src = "// one\n   // two\n\t// three\n\ndefinition";
        let tokens = tokenize(src);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Definition);
        assert_eq!(tokens[0].line, 5);
        assert_eq!(tokens[0].column, 1);
    }

    #[test]
    fn comment_at_end_of_input_without_newline() {
        assert_eq!(
            kinds("user // done"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("definition user {\n  relation owner: user\n}");

        let owner = tokens.iter().find(|t| t.text == "owner").unwrap();
        assert_eq!((owner.line, owner.column), (2, 12));

        let rbrace = tokens.iter().find(|t| t.kind == TokenKind::RBrace).unwrap();
        assert_eq!((rbrace.line, rbrace.column), (3, 1));
    }

    #[test]
    fn unknown_characters_become_illegal_tokens() {
        let tokens = tokenize("user & group");

        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].text, "&");
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn non_ascii_character_is_carried_whole() {
        let tokens = tokenize("é");

        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[0].text, "é");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
        assert_eq!(tokens[1].column, 2);
    }

    #[test]
    fn digit_cannot_start_an_identifier() {
        let tokens = tokenize("9lives");

        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[0].text, "9");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "lives");
    }

    #[test]
    fn tokenization_is_deterministic() {
        let src = "definition doc { relation viewer: user | group#member }";

        assert_eq!(tokenize(src), tokenize(src));
    }
}
