//! Tokenizer for filter and token expressions

use crate::error::{Error, Result};

/// Piece of a backtick template literal
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplatePart {
    /// Literal text
    Text(String),
    /// Source of an embedded `${ ... }` expression
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Template(Vec<TemplatePart>),
    Ident(String),
    True,
    False,
    Null,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Question,
    Colon,
    Not,
    And,
    Or,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

/// Split an expression into tokens
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let n = text
                .parse::<f64>()
                .map_err(|_| Error::expression(format!("invalid number '{text}'")))?;
            tokens.push(Token::Number(n));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(match word.as_str() {
                "true" => Token::True,
                "false" => Token::False,
                "null" | "undefined" => Token::Null,
                _ => Token::Ident(word),
            });
            continue;
        }

        if c == '\'' || c == '"' {
            let (s, next) = read_quoted(&chars, i + 1, c)?;
            tokens.push(Token::Str(s));
            i = next;
            continue;
        }

        if c == '`' {
            let (parts, next) = read_template(&chars, i + 1)?;
            tokens.push(Token::Template(parts));
            i = next;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (c, next) {
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('=', Some('=')) if chars.get(i + 2) == Some(&'=') => (Token::StrictEq, 3),
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) if chars.get(i + 2) == Some(&'=') => (Token::StrictNotEq, 3),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('=', _) => {
                return Err(Error::expression("assignment is not allowed"));
            }
            ('!', _) => (Token::Not, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            ('.', _) => (Token::Dot, 1),
            (',', _) => (Token::Comma, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            _ => {
                return Err(Error::expression(format!(
                    "unexpected character '{c}' at position {i}"
                )))
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Read a quoted string starting after the opening quote
fn read_quoted(chars: &[char], mut i: usize, quote: char) -> Result<(String, usize)> {
    let mut out = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((out, i + 1));
        }
        if c == '\\' {
            i += 1;
            let escaped = chars
                .get(i)
                .ok_or_else(|| Error::expression("unterminated string literal"))?;
            out.push(unescape(*escaped));
        } else {
            out.push(c);
        }
        i += 1;
    }
    Err(Error::expression("unterminated string literal"))
}

/// Read a template literal starting after the opening backtick
fn read_template(chars: &[char], mut i: usize) -> Result<(Vec<TemplatePart>, usize)> {
    let mut parts = Vec::new();
    let mut text = String::new();

    while i < chars.len() {
        let c = chars[i];
        match c {
            '`' => {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(text));
                }
                return Ok((parts, i + 1));
            }
            '\\' => {
                i += 1;
                let escaped = chars
                    .get(i)
                    .ok_or_else(|| Error::expression("unterminated template literal"))?;
                text.push(unescape(*escaped));
                i += 1;
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                i += 2;
                let start = i;
                let mut depth = 1;
                while i < chars.len() {
                    match chars[i] {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                if depth != 0 {
                    return Err(Error::expression("unterminated ${ } in template literal"));
                }
                parts.push(TemplatePart::Expr(chars[start..i].iter().collect()));
                i += 1;
            }
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    Err(Error::expression("unterminated template literal"))
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let tokens = tokenize("a === 'x' && b != 2 || !c").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".into()),
                Token::StrictEq,
                Token::Str("x".into()),
                Token::And,
                Token::Ident("b".into()),
                Token::NotEq,
                Token::Number(2.0),
                Token::Or,
                Token::Not,
                Token::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn test_strict_and_loose_equality_tokens() {
        let tokens = tokenize("a == b !== c != d").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".into()),
                Token::Eq,
                Token::Ident("b".into()),
                Token::StrictNotEq,
                Token::Ident("c".into()),
                Token::NotEq,
                Token::Ident("d".into()),
            ]
        );
    }

    #[test]
    fn test_template_literal() {
        let tokens = tokenize("`Bearer ${token}`").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Template(vec![
                TemplatePart::Text("Bearer ".into()),
                TemplatePart::Expr("token".into()),
            ])]
        );
    }

    #[test]
    fn test_rejects_assignment() {
        assert!(tokenize("host = 'x'").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("'abc").is_err());
        assert!(tokenize("`abc ${x").is_err());
    }
}
