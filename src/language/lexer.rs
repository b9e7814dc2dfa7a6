/*!
A single-pass, position-preserving lexer for the formula language.

Whitespace is skipped.
Two-character operators (`->`, `<->`) are matched greedily before single characters, so `-` lexes as negation only when not part of an arrow.
Identifiers are `[A-Za-z_][A-Za-z0-9_]*`; the keywords `all` and `exists` are reclassified as quantifiers, every other identifier is emitted as [Ident](TokenKind::Ident) and classified by the parser.
Numerals `\d+(\.\d+)?` are emitted as identifiers too --- the arithmetic layer recognises them by lexeme.
*/

use crate::types::err::{ParseError, ParseErrorKind, SourceSpan};

use super::token::{Token, TokenKind};

/// Lexes `source` to a token vector terminated by [Eof](TokenKind::Eof).
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut at = 0;

    while at < bytes.len() {
        let c = bytes[at] as char;

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                at += 1;
            }

            '(' => {
                tokens.push(Token::new(TokenKind::LParen, "(", at));
                at += 1;
            }

            ')' => {
                tokens.push(Token::new(TokenKind::RParen, ")", at));
                at += 1;
            }

            ',' => {
                tokens.push(Token::new(TokenKind::Comma, ",", at));
                at += 1;
            }

            '.' => {
                tokens.push(Token::new(TokenKind::Dot, ".", at));
                at += 1;
            }

            '&' => {
                tokens.push(Token::new(TokenKind::And, "&", at));
                at += 1;
            }

            '|' => {
                tokens.push(Token::new(TokenKind::Or, "|", at));
                at += 1;
            }

            '=' => {
                tokens.push(Token::new(TokenKind::Eq, "=", at));
                at += 1;
            }

            '-' => {
                // `->` before `-`.
                if bytes.get(at + 1) == Some(&b'>') {
                    tokens.push(Token::new(TokenKind::Implies, "->", at));
                    at += 2;
                } else {
                    tokens.push(Token::new(TokenKind::Not, "-", at));
                    at += 1;
                }
            }

            '<' => {
                if bytes.get(at + 1) == Some(&b'-') && bytes.get(at + 2) == Some(&b'>') {
                    tokens.push(Token::new(TokenKind::Iff, "<->", at));
                    at += 3;
                } else {
                    return Err(unexpected(source, at, c));
                }
            }

            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = at;
                while at < bytes.len()
                    && ((bytes[at] as char).is_ascii_alphanumeric() || bytes[at] == b'_')
                {
                    at += 1;
                }
                let lexeme = &source[start..at];

                let kind = match lexeme {
                    "all" | "exists" => TokenKind::Quant,
                    _ => TokenKind::Ident,
                };

                tokens.push(Token::new(kind, lexeme, start));
            }

            _ if c.is_ascii_digit() => {
                let start = at;
                while at < bytes.len() && (bytes[at] as char).is_ascii_digit() {
                    at += 1;
                }
                if bytes.get(at) == Some(&b'.')
                    && bytes
                        .get(at + 1)
                        .is_some_and(|b| (*b as char).is_ascii_digit())
                {
                    at += 1;
                    while at < bytes.len() && (bytes[at] as char).is_ascii_digit() {
                        at += 1;
                    }
                }
                tokens.push(Token::new(TokenKind::Ident, &source[start..at], start));
            }

            _ => return Err(unexpected(source, at, c)),
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", source.len()));
    Ok(tokens)
}

fn unexpected(source: &str, offset: usize, c: char) -> ParseError {
    ParseError {
        kind: ParseErrorKind::UnexpectedCharacter(c),
        span: SourceSpan::at(source, offset),
        suggestion: None,
        context: source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("p -> q <-> r & -s | t"),
            vec![
                TokenKind::Ident,
                TokenKind::Implies,
                TokenKind::Ident,
                TokenKind::Iff,
                TokenKind::Ident,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident,
                TokenKind::Or,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quantifier_keywords() {
        let tokens = lex("all x exists y allegro").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Quant);
        assert_eq!(tokens[2].kind, TokenKind::Quant);
        // A keyword prefix does not make a keyword.
        assert_eq!(tokens[4].kind, TokenKind::Ident);
        assert_eq!(tokens[4].lexeme, "allegro");
    }

    #[test]
    fn offsets_preserved() {
        let tokens = lex("p(a, b)").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn numerals() {
        let tokens = lex("lt(1, 23.5)").unwrap();
        assert_eq!(tokens[2].lexeme, "1");
        assert_eq!(tokens[4].lexeme, "23.5");
        assert_eq!(tokens[4].kind, TokenKind::Ident);
    }

    #[test]
    fn arrow_is_greedy() {
        let tokens = lex("-p -> q").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Not);
        assert_eq!(tokens[2].kind, TokenKind::Implies);
    }

    #[test]
    fn unexpected_character() {
        let error = lex("p ? q").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnexpectedCharacter('?'));
        assert_eq!(error.span.start, 2);
    }
}
