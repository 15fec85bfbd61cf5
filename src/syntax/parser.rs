//! Recursive-descent parser for the Trellis DSL.
//!
//! ```text
//! program      := statement* EOF
//! expression   := primary ( '.' IDENT arguments? block? )*
//! primary      := IDENT arguments? block? | STRING | NUMBER | SYMBOL
//!               | 'true' | 'false' | 'nil' | '(' expression ')'
//! arguments    := '(' ( argument (',' argument)* ','? )? ')' | bare_args
//! bare_args    := argument (',' argument)*
//! argument     := IDENT ':' expression | (SYMBOL | STRING) '=>' expression | expression
//! block        := 'do' statement* 'end' | '{' statement* '}'
//! ```
//!
//! Every identifier consumed as a method name is checked against the
//! [`MethodRegistry`] on the spot. A source string naming a method outside the
//! whitelist never yields a complete AST, so nothing from it can execute.
//!
//! Bare (parenthesis-free) argument lists start only with a literal or a `key:`
//! pair, and each bare argument is a single operand: `text "Hi".bg("red")` chains
//! `bg` onto the `text` call, not onto the string.

use log::debug;

use crate::ast::{Block, Literal, LiteralValue, MethodCall, NamedArg, Node, Program};
use crate::config::Limits;
use crate::err_at;
use crate::methods::MethodRegistry;
use crate::syntax::lexer::{tokenize, Token, TokenKind, TokenValue};
use crate::syntax::Span;
use crate::TrellisError;

/// Parses a token stream into a [`Program`], validating method names as it goes.
pub fn parse(
    tokens: Vec<Token>,
    registry: &MethodRegistry,
    limits: &Limits,
) -> Result<Program, TrellisError> {
    Parser::new(tokens, registry, limits).parse_program()
}

/// Tokenizes and parses in one step.
pub fn parse_source(
    source: &str,
    registry: &MethodRegistry,
    limits: &Limits,
) -> Result<Program, TrellisError> {
    parse(tokenize(source)?, registry, limits)
}

// ============================================================================
// PARSER
// ============================================================================

pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    registry: &'r MethodRegistry,
    max_depth: usize,
    max_nodes: usize,
    depth: usize,
    nodes: usize,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Token>, registry: &'r MethodRegistry, limits: &Limits) -> Self {
        Self {
            tokens,
            pos: 0,
            registry,
            max_depth: limits.max_depth,
            max_nodes: limits.max_nodes,
            depth: 0,
            nodes: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek_kind_at(0)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn current_span(&self) -> Span {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn found(&self) -> String {
        self.peek()
            .map_or_else(|| TokenKind::Eof.describe().to_string(), Token::describe)
    }

    fn unexpected(&self, expected: &str) -> TrellisError {
        let span = self.current_span();
        let err = err_at!(
            Parse,
            span,
            "expected {} but found {} at {}",
            expected,
            self.found(),
            span.location()
        );
        if self.peek_kind() == TokenKind::Eof {
            err.at_eof()
        } else {
            err
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, TrellisError> {
        if self.peek_kind() == kind {
            self.advance().ok_or_else(|| self.unexpected(expected))
        } else {
            Err(self.unexpected(expected))
        }
    }

    // ------------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------------

    fn count_node(&mut self, span: Span) -> Result<(), TrellisError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(err_at!(
                Parse,
                span,
                "program exceeds the maximum of {} nodes",
                self.max_nodes
            ));
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), TrellisError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let span = self.current_span();
            return Err(err_at!(
                Parse,
                span,
                "nesting exceeds the maximum depth of {} at {}",
                self.max_depth,
                span.location()
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// The parse-time whitelist gate.
    fn check_method(&self, name: &str, span: Span) -> Result<(), TrellisError> {
        if self.registry.is_allowed(name) {
            return Ok(());
        }
        debug!("rejected method '{}' at {}", name, span);
        Err(err_at!(
            Security,
            span,
            "'{}' is not an allowed method (line {}, column {})",
            name,
            span.line,
            span.column
        )
        .with_help("Only the documented DSL elements, modifiers and helpers can be called."))
    }

    // ------------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------------

    pub fn parse_program(&mut self) -> Result<Program, TrellisError> {
        let start = self.current_span();
        let mut statements = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            statements.push(self.parse_statement()?);
        }
        let span = start.to(self.current_span());
        debug!("parsed {} top-level statements ({} nodes)", statements.len(), self.nodes);
        Ok(Program { statements, span })
    }

    fn parse_statement(&mut self) -> Result<Node, TrellisError> {
        match self.peek_kind() {
            TokenKind::End | TokenKind::RBrace | TokenKind::RParen | TokenKind::Comma => {
                let span = self.current_span();
                Err(err_at!(
                    Parse,
                    span,
                    "unexpected {} at {}",
                    self.found(),
                    span.location()
                ))
            }
            _ => self.parse_expression(),
        }
    }

    fn parse_expression(&mut self) -> Result<Node, TrellisError> {
        self.enter()?;
        let primary = self.parse_primary(true)?;
        let node = self.parse_chain(primary)?;
        self.leave();
        Ok(node)
    }

    /// `( '.' IDENT arguments? block? )*`, left-associative. Each link nests the
    /// receiver one level deeper, so every link counts toward the depth limit.
    fn parse_chain(&mut self, mut node: Node) -> Result<Node, TrellisError> {
        let mut links = 0;
        while self.peek_kind() == TokenKind::Dot {
            self.enter()?;
            links += 1;
            self.advance();
            let (method, span) = self.expect_method_name("a method name after '.'")?;
            let args = self.parse_arguments()?;
            let block = self.parse_block()?;
            let span = node.span().to(span);
            self.count_node(span)?;
            node = Node::MethodCall(MethodCall {
                receiver: Some(Box::new(node)),
                method,
                args,
                block,
                span,
            });
        }
        for _ in 0..links {
            self.leave();
        }
        Ok(node)
    }

    fn expect_method_name(&mut self, expected: &str) -> Result<(String, Span), TrellisError> {
        let token = self.expect(TokenKind::Identifier, expected)?;
        let name = token.text().unwrap_or_default().to_string();
        self.check_method(&name, token.span)?;
        Ok((name, token.span))
    }

    /// With `calls_take_bare_args == false` this parses a single operand: an
    /// identifier call only takes a parenthesized argument list and no block.
    fn parse_primary(&mut self, calls_take_bare_args: bool) -> Result<Node, TrellisError> {
        let span = self.current_span();
        let literal = match (self.peek_kind(), self.peek().map(|t| &t.value)) {
            (TokenKind::String, Some(TokenValue::Text(s))) => Some(LiteralValue::String(s.clone())),
            (TokenKind::Symbol, Some(TokenValue::Text(s))) => Some(LiteralValue::Symbol(s.clone())),
            (TokenKind::Number, Some(TokenValue::Integer(n))) => Some(LiteralValue::Integer(*n)),
            (TokenKind::Number, Some(TokenValue::Float(n))) => Some(LiteralValue::Float(*n)),
            (TokenKind::Identifier, Some(TokenValue::Text(s))) => match s.as_str() {
                "true" => Some(LiteralValue::Bool(true)),
                "false" => Some(LiteralValue::Bool(false)),
                "nil" => Some(LiteralValue::Nil),
                _ => None,
            },
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            self.count_node(span)?;
            return Ok(Node::Literal(Literal { value, span }));
        }

        match self.peek_kind() {
            TokenKind::Identifier => {
                let (method, name_span) = self.expect_method_name("a method name")?;
                let (args, block) = if calls_take_bare_args {
                    (self.parse_arguments()?, self.parse_block()?)
                } else {
                    (self.parse_paren_arguments()?, None)
                };
                self.count_node(name_span)?;
                Ok(Node::MethodCall(MethodCall {
                    receiver: None,
                    method,
                    args,
                    block,
                    span: name_span,
                }))
            }
            TokenKind::LParen => {
                let open = self.current_span();
                self.advance();
                let inner = self.parse_expression()?;
                if self.peek_kind() != TokenKind::RParen {
                    return Err(self.unclosed("')'", "parenthesis", open));
                }
                self.advance();
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, TrellisError> {
        if self.peek_kind() == TokenKind::LParen {
            return self.parse_paren_arguments();
        }
        if !self.starts_bare_argument() {
            return Ok(Vec::new());
        }
        let mut args = vec![self.parse_argument(true)?];
        while self.peek_kind() == TokenKind::Comma {
            self.advance();
            args.push(self.parse_argument(true)?);
        }
        Ok(args)
    }

    fn parse_paren_arguments(&mut self) -> Result<Vec<Node>, TrellisError> {
        if self.peek_kind() != TokenKind::LParen {
            return Ok(Vec::new());
        }
        let open = self.current_span();
        self.advance();
        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.unclosed("')'", "argument list", open)),
                _ => {}
            }
            args.push(self.parse_argument(false)?);
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {}
                TokenKind::Eof => return Err(self.unclosed("')'", "argument list", open)),
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok(args)
    }

    fn starts_bare_argument(&self) -> bool {
        match self.peek_kind() {
            TokenKind::String | TokenKind::Number | TokenKind::Symbol => true,
            TokenKind::Identifier => self.peek_kind_at(1) == TokenKind::Colon,
            _ => false,
        }
    }

    fn parse_argument(&mut self, bare: bool) -> Result<Node, TrellisError> {
        let span = self.current_span();
        let named = match (self.peek_kind(), self.peek_kind_at(1)) {
            (TokenKind::Identifier, TokenKind::Colon) => true,
            (TokenKind::Symbol | TokenKind::String, TokenKind::Arrow) => true,
            _ => false,
        };
        if !named {
            return self.parse_value(bare);
        }

        // Keys are names, not calls: they never pass through the whitelist.
        let key = self
            .advance()
            .and_then(|t| t.text().map(str::to_string))
            .unwrap_or_default();
        self.advance(); // `:` or `=>`
        let value = self.parse_value(bare)?;
        let span = span.to(value.span());
        self.count_node(span)?;
        Ok(Node::NamedArg(NamedArg {
            key,
            value: Box::new(value),
            span,
        }))
    }

    fn parse_value(&mut self, bare: bool) -> Result<Node, TrellisError> {
        if bare {
            self.enter()?;
            let node = self.parse_primary(false)?;
            self.leave();
            Ok(node)
        } else {
            self.parse_expression()
        }
    }

    fn parse_block(&mut self) -> Result<Option<Block>, TrellisError> {
        let (close, close_name) = match self.peek_kind() {
            TokenKind::Do => (TokenKind::End, "'end'"),
            TokenKind::LBrace => (TokenKind::RBrace, "'}'"),
            _ => return Ok(None),
        };
        let open = self.current_span();
        self.advance();
        self.enter()?;

        let mut statements = Vec::new();
        loop {
            let kind = self.peek_kind();
            if kind == close {
                break;
            }
            if kind == TokenKind::Eof {
                return Err(self.unclosed(close_name, "block", open));
            }
            statements.push(self.parse_statement()?);
        }
        let close_span = self.current_span();
        self.advance();
        self.leave();

        let span = open.to(close_span);
        self.count_node(span)?;
        Ok(Some(Block { statements, span }))
    }

    fn unclosed(&self, closer: &str, what: &str, open: Span) -> TrellisError {
        let err = err_at!(
            Parse,
            open,
            "missing {} to close the {} opened at {} (found {})",
            closer,
            what,
            open.location(),
            self.found()
        );
        if self.peek_kind() == TokenKind::Eof {
            err.at_eof()
        } else {
            err
        }
    }
}

#[cfg(test)]
mod parser_unit_tests {
    use super::*;
    use crate::ErrorType;

    fn parse_str(src: &str) -> Result<Program, TrellisError> {
        parse_source(src, &MethodRegistry::standard(), &Limits::default())
    }

    #[test]
    fn named_key_is_not_whitelisted() {
        // `system` as a key is just a name.
        assert!(parse_str("div.data(system: \"x\")").is_ok());
    }

    #[test]
    fn disallowed_method_after_dot_is_security_error() {
        let err = parse_str("text(\"a\").instance_eval(\"x\")").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Security);
    }

    #[test]
    fn missing_end_is_incomplete() {
        let err = parse_str("vstack do\n text(\"a\")").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.is_incomplete_input());
        assert!(err.message().contains("missing 'end'"));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        let src = "div do div do div do div do end end end end";
        let err = parse_source(src, &MethodRegistry::standard(), &limits).unwrap_err();
        assert!(err.message().contains("maximum depth"));
    }

    #[test]
    fn chained_calls_count_toward_depth() {
        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        let registry = MethodRegistry::standard();
        assert!(parse_source("text(\"a\").border.border", &registry, &limits).is_ok());
        let err = parse_source("text(\"a\").border.border.border", &registry, &limits).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.message().contains("maximum depth of 3"));
    }

    #[test]
    fn node_limit_is_enforced() {
        let limits = Limits {
            max_nodes: 4,
            ..Limits::default()
        };
        let src = "text(\"a\") text(\"b\") text(\"c\")";
        let err = parse_source(src, &MethodRegistry::standard(), &limits).unwrap_err();
        assert!(err.message().contains("maximum of 4 nodes"));
    }
}
