use tracing::trace;

use crate::{
    ast::{BinaryOp, ConcatPart, Expr, ExprKind, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Keyword, Lexer, Token, TokenKind},
    value::Value,
};

/// Deepest nesting the parser accepts: parentheses, prefix operators and
/// `**` exponents each open one level.
pub const MAX_DEPTH: usize = 200;

/// Tallest expression tree the parser builds, so long operator chains stay
/// within the evaluator's stack.
pub const MAX_TREE_DEPTH: usize = 1000;

/// How an expression containing `+` is cut into concatenation segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlusSplit {
    /// Every `+` character is a boundary, even inside quotes or parentheses.
    #[default]
    Naive,
    /// Only `+` outside string quotes and at parenthesis depth zero.
    QuoteAware,
}

/// Parses expression text, deciding between concatenation and arithmetic
/// mode before any tokenizing happens.
pub fn parse_expression(source: &str, split: PlusSplit) -> Result<Expr, Diagnostic> {
    let trimmed = source.trim();
    let whole = SourceSpan::new(0, trimmed.len());
    if trimmed.contains('+') {
        let segments = split_segments(trimmed, split);
        if segments.iter().any(|segment| unquote(segment).is_some()) {
            trace!(segments = segments.len(), "concatenation mode");
            let parts = segments.into_iter().map(concat_part).collect();
            return Ok(Expr {
                kind: ExprKind::Concat(parts),
                span: whole,
                depth: 1,
            });
        }
    } else if let Some(text) = unquote(trimmed) {
        return Ok(Expr {
            kind: ExprKind::Literal(Value::string(text)),
            span: whole,
            depth: 1,
        });
    }
    parse_arithmetic(trimmed)
}

/// Parses the arithmetic-mode grammar only.
pub fn parse_arithmetic(source: &str) -> Result<Expr, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Returns the inner text when `text` is wrapped in one matching pair of
/// `"` or `'` quotes that does not recur inside.
pub fn unquote(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|ch| *ch == '"' || *ch == '\'')?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    (!inner.contains(quote)).then_some(inner)
}

fn split_segments(text: &str, split: PlusSplit) -> Vec<&str> {
    let raw: Vec<&str> = match split {
        PlusSplit::Naive => text.split('+').collect(),
        PlusSplit::QuoteAware => {
            let mut segments = Vec::new();
            let mut quote: Option<char> = None;
            let mut depth = 0usize;
            let mut start = 0;
            for (idx, ch) in text.char_indices() {
                match (quote, ch) {
                    (Some(open), _) if ch == open => quote = None,
                    (Some(_), _) => {}
                    (None, '"' | '\'') => quote = Some(ch),
                    (None, '(') => depth += 1,
                    (None, ')') => depth = depth.saturating_sub(1),
                    (None, '+') if depth == 0 => {
                        segments.push(&text[start..idx]);
                        start = idx + 1;
                    }
                    _ => {}
                }
            }
            segments.push(&text[start..]);
            segments
        }
    };
    raw.into_iter().map(str::trim).collect()
}

fn concat_part(segment: &str) -> ConcatPart {
    match unquote(segment) {
        Some(text) => ConcatPart::Literal(text.to_string()),
        None => ConcatPart::SubExpr {
            source: segment.to_string(),
            expr: parse_arithmetic(segment).ok(),
        },
    }
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            nesting: 0,
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_and()?;
        while self.matches_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            expr = binary(BinaryOp::Or, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_not()?;
        while self.matches_keyword(Keyword::And) {
            let right = self.parse_not()?;
            expr = binary(BinaryOp::And, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<Expr, Diagnostic> {
        if self.matches_keyword(Keyword::Not) {
            let operator = self.previous().span;
            let right = self.nested(operator, Self::parse_not)?;
            return unary(UnaryOp::Not, operator, right);
        }
        self.parse_comparison()
    }

    /// `a < b < c` reads as `a < b and b < c`.
    fn parse_comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_sum()?;
        let mut chain: Option<Expr> = None;
        while let Some(op) = self.comparison_operator() {
            let right = self.parse_sum()?;
            let link = binary(op, left, right.clone())?;
            chain = Some(match chain {
                Some(previous) => binary(BinaryOp::And, previous, link)?,
                None => link,
            });
            left = right;
        }
        Ok(chain.unwrap_or(left))
    }

    fn comparison_operator(&mut self) -> Option<BinaryOp> {
        let op = match self.peek().map(|token| &token.kind) {
            Some(TokenKind::EqualEqual) => BinaryOp::Equal,
            Some(TokenKind::BangEqual) => BinaryOp::NotEqual,
            Some(TokenKind::Less) => BinaryOp::Less,
            Some(TokenKind::LessEqual) => BinaryOp::LessEqual,
            Some(TokenKind::Greater) => BinaryOp::Greater,
            Some(TokenKind::GreaterEqual) => BinaryOp::GreaterEqual,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_sum(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_term()?;
        loop {
            let op = if self.matches(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.matches(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_term()?;
            expr = binary(op, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.matches(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.matches(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.matches(TokenKind::DoubleSlash) {
                BinaryOp::FloorDiv
            } else if self.matches(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            expr = binary(op, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        if self.matches(TokenKind::Minus) {
            let operator = self.previous().span;
            let right = self.nested(operator, Self::parse_unary)?;
            return unary(UnaryOp::Negate, operator, right);
        }
        self.parse_power()
    }

    /// `**` is right-associative and binds tighter than a unary minus on its
    /// left, while its right operand may itself be negated.
    fn parse_power(&mut self) -> Result<Expr, Diagnostic> {
        let base = self.parse_primary()?;
        if self.matches(TokenKind::DoubleStar) {
            let operator = self.previous().span;
            let exponent = self.nested(operator, Self::parse_unary)?;
            return binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.advance();
        let kind = match &token.kind {
            TokenKind::Keyword(Keyword::True) => ExprKind::Literal(Value::Bool(true)),
            TokenKind::Keyword(Keyword::False) => ExprKind::Literal(Value::Bool(false)),
            TokenKind::Number => ExprKind::Literal(self.number(&token)?),
            TokenKind::String => ExprKind::Literal(Value::string(token.lexeme.clone())),
            TokenKind::Identifier => ExprKind::Variable(token.lexeme.clone()),
            TokenKind::LParen => {
                let inner = self.nested(token.span, Self::parse_expression)?;
                let rparen = self.consume(TokenKind::RParen, "expected `)` to close group")?;
                return Ok(Expr {
                    kind: inner.kind,
                    span: SourceSpan::new(token.span.start, rparen.span.end),
                    depth: inner.depth,
                });
            }
            TokenKind::Eof => return Err(self.error(&token, "expected expression")),
            _ => {
                return Err(self.error(&token, &format!("unexpected token `{}`", token.lexeme)));
            }
        };
        Ok(Expr {
            kind,
            span: token.span,
            depth: 1,
        })
    }

    fn number(&self, token: &Token) -> Result<Value, Diagnostic> {
        let digits = token.lexeme.replace('_', "");
        let parsed = if digits.contains(['.', 'e', 'E']) {
            digits.parse::<f64>().ok().map(Value::Float)
        } else {
            digits.parse::<i64>().ok().map(Value::Int)
        };
        parsed.ok_or_else(|| {
            self.error(
                token,
                &format!("invalid number literal `{}`", token.lexeme),
            )
        })
    }

    /// Runs `parse` one nesting level deeper, failing once the limit is hit.
    fn nested(
        &mut self,
        span: SourceSpan,
        parse: fn(&mut Self) -> Result<Expr, Diagnostic>,
    ) -> Result<Expr, Diagnostic> {
        if self.nesting >= MAX_DEPTH {
            return Err(too_deep(span));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn expect_end(&mut self) -> Result<(), Diagnostic> {
        match self.peek() {
            Some(token) if token.kind != TokenKind::Eof => {
                Err(self.error(token, &format!("unexpected token `{}`", token.lexeme)))
            }
            _ => Ok(()),
        }
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_keyword(&mut self, keyword: Keyword) -> bool {
        self.matches(TokenKind::Keyword(keyword))
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if let Some(token) = self.peek() {
            token.kind == kind
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
            return self.previous().clone();
        }
        self.tokens[self.tokens.len() - 1].clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Eof) | None)
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string()).with_span(token.span)
    }

    fn error_eof(&self, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string())
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, Diagnostic> {
    let span = SourceSpan::new(left.span.start, right.span.end);
    let depth = 1 + left.depth.max(right.depth);
    if depth > MAX_TREE_DEPTH {
        return Err(too_deep(span));
    }
    Ok(Expr {
        span,
        depth,
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    })
}

fn unary(op: UnaryOp, operator: SourceSpan, operand: Expr) -> Result<Expr, Diagnostic> {
    let span = SourceSpan::new(operator.start, operand.span.end);
    let depth = 1 + operand.depth;
    if depth > MAX_TREE_DEPTH {
        return Err(too_deep(span));
    }
    Ok(Expr {
        span,
        depth,
        kind: ExprKind::Unary {
            op,
            expr: Box::new(operand),
        },
    })
}

fn too_deep(span: SourceSpan) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Parser, "expression nested too deeply").with_span(span)
}
