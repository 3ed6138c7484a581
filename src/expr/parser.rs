//! Recursive descent parser producing the expression tree

use super::lexer::{tokenize, TemplatePart, Token};
use crate::error::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    Expr(Node),
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Template(Vec<Segment>),
    Ident(String),
    Member(Box<Node>, String),
    Index(Box<Node>, Box<Node>),
    Call {
        target: Box<Node>,
        method: String,
        args: Vec<Node>,
    },
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Logical(LogicalOp, Box<Node>, Box<Node>),
    Conditional(Box<Node>, Box<Node>, Box<Node>),
}

/// Parse a complete expression
pub(crate) fn parse(input: &str) -> Result<Node> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(Error::expression("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(Error::expression(format!(
            "unexpected token {token:?} after end of expression"
        )));
    }
    Ok(node)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(Error::expression(format!(
                "expected {expected:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn expression(&mut self) -> Result<Node> {
        let condition = self.or()?;
        if self.eat(&Token::Question) {
            let then = self.expression()?;
            self.expect(&Token::Colon)?;
            let otherwise = self.expression()?;
            return Ok(Node::Conditional(
                Box::new(condition),
                Box::new(then),
                Box::new(otherwise),
            ));
        }
        Ok(condition)
    }

    fn or(&mut self) -> Result<Node> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = Node::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Node> {
        let mut left = self.equality()?;
        while self.eat(&Token::And) {
            let right = self.equality()?;
            left = Node::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Node> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                Some(Token::StrictEq) => BinaryOp::StrictEq,
                Some(Token::StrictNotEq) => BinaryOp::StrictNotEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.comparison()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn comparison(&mut self) -> Result<Node> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.additive()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn additive(&mut self) -> Result<Node> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Node> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Node> {
        if self.eat(&Token::Not) {
            return Ok(Node::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Node::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Node> {
        let mut node = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let name = match self.advance() {
                    Some(Token::Ident(name)) => name,
                    other => {
                        return Err(Error::expression(format!(
                            "expected property name after '.', found {other:?}"
                        )))
                    }
                };
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    node = Node::Call {
                        target: Box::new(node),
                        method: name,
                        args,
                    };
                } else {
                    node = Node::Member(Box::new(node), name);
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.expression()?;
                self.expect(&Token::RBracket)?;
                node = Node::Index(Box::new(node), Box::new(index));
            } else if self.peek() == Some(&Token::LParen) {
                return Err(Error::expression("function calls are not supported"));
            } else {
                return Ok(node);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma)?;
        }
    }

    fn primary(&mut self) -> Result<Node> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Node::Literal(number(n))),
            Some(Token::Str(s)) => Ok(Node::Literal(Value::String(s))),
            Some(Token::True) => Ok(Node::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Node::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Node::Literal(Value::Null)),
            Some(Token::Ident(name)) => Ok(Node::Ident(name)),
            Some(Token::Template(parts)) => {
                let segments = parts
                    .into_iter()
                    .map(|part| match part {
                        TemplatePart::Text(text) => Ok(Segment::Text(text)),
                        TemplatePart::Expr(src) => Ok(Segment::Expr(parse(&src)?)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::Template(segments))
            }
            Some(Token::LParen) => {
                let node = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(node)
            }
            other => Err(Error::expression(format!("unexpected token {other:?}"))),
        }
    }
}

/// Convert an f64 into a JSON number, keeping integers integral
pub(crate) fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let node = parse("a || b && c").unwrap();
        match node {
            Node::Logical(LogicalOp::Or, _, right) => {
                assert!(matches!(*right, Node::Logical(LogicalOp::And, _, _)));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_method_call() {
        let node = parse("source.startsWith('http')").unwrap();
        assert!(matches!(node, Node::Call { ref method, .. } if method == "startsWith"));
    }

    #[test]
    fn test_rejects_trailing_tokens() {
        assert!(parse("a b").is_err());
        assert!(parse("").is_err());
        assert!(parse("now()").is_err());
    }
}
