use crate::ast::{
    Alignment, AtomNode, AtomValue, Clause, ClauseKind, ElementNode, ElementOp, GroupNode, Node,
    Statement,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token};
use crate::span::Span;

/// What ends the sequence currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Term {
    /// A quoted pattern, closed by `"`.
    Quote,
    /// A `[...]` group.
    Bracket,
    /// A `<...>` group.
    Angle,
    /// A `{...}` group.
    Brace,
    /// An unquoted clause pattern, closed by `#` or end of input.
    Statement,
}

/// Parses a full statement: clauses joined by `#`.
pub fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    Parser::new(source)?.statement()
}

struct Parser {
    lexer: Lexer,
}

impl Parser {
    fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Parser {
            lexer: Lexer::new(source)?,
        })
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let mut clauses = vec![self.clause()?];
        while matches!(self.lexer.peek(), Some((Token::Hash, _))) {
            self.lexer.next();
            clauses.push(self.clause()?);
        }
        if let Some((token, span)) = self.lexer.peek() {
            return Err(ParseError::unexpected_token(
                "'#' or end of input",
                token.to_string(),
                *span,
            ));
        }
        let span = clauses
            .iter()
            .skip(1)
            .fold(clauses[0].span, |acc, c| acc.merge(&c.span));
        Ok(Statement { clauses, span })
    }

    fn clause(&mut self) -> Result<Clause, ParseError> {
        let (token, head_span) = self
            .lexer
            .next()
            .ok_or_else(|| ParseError::unexpected_end("a clause"))?;
        let Token::Atom(head) = token else {
            return Err(ParseError::unexpected_token(
                "a clause keyword or parameter name",
                token.to_string(),
                head_span,
            ));
        };
        match head.as_str() {
            "gate" => self.quoted_clause(ClauseKind::Gate, head_span),
            "note" => self.quoted_clause(ClauseKind::Note, head_span),
            "s" | "sample" => self.quoted_clause(ClauseKind::Sample, head_span),
            _ => self.param_clause(head, head_span),
        }
    }

    fn quoted_clause(&mut self, kind: ClauseKind, head_span: Span) -> Result<Clause, ParseError> {
        self.expect(&Token::Quote, "'\"'")?;
        let pattern = self.sequences(Term::Quote)?;
        let (_, close) = self.expect(&Token::Quote, "closing '\"'")?;
        Ok(Clause {
            kind,
            pattern,
            span: head_span.merge(&close),
        })
    }

    fn param_clause(&mut self, head: String, head_span: Span) -> Result<Clause, ParseError> {
        let param = if matches!(self.lexer.peek(), Some((Token::Colon, _))) {
            self.lexer.next();
            let (index, span) = self.number("a parameter index")?;
            if index.fract() != 0.0 || index < 0.0 {
                return Err(ParseError::invalid(
                    "parameter index must be a non-negative integer",
                    span,
                ));
            }
            format!("{head}:{}", index as i64)
        } else {
            head
        };
        let pattern = self.sequences(Term::Statement)?;
        let span = head_span.merge(&pattern.span());
        Ok(Clause {
            kind: ClauseKind::Float { param },
            pattern,
            span,
        })
    }

    /// One or more comma-separated sequences. Multiple sequences stack.
    fn sequences(&mut self, term: Term) -> Result<Node, ParseError> {
        let mut branches = vec![self.sequence(term)?];
        while matches!(self.lexer.peek(), Some((Token::Comma, _))) {
            self.lexer.next();
            branches.push(self.sequence(term)?);
        }
        if branches.len() == 1 {
            return Ok(branches.remove(0));
        }
        let span = branches
            .iter()
            .skip(1)
            .fold(branches[0].span(), |acc, b| acc.merge(&b.span()));
        Ok(Node::Group(GroupNode {
            alignment: Alignment::Stack,
            children: branches,
            steps_override: None,
            span,
        }))
    }

    /// A run of elements up to the terminator. A single element stands for
    /// itself; several become a Fastcat group.
    fn sequence(&mut self, term: Term) -> Result<Node, ParseError> {
        let mut children = self.elements(term)?;
        if children.len() == 1 {
            return Ok(children.remove(0));
        }
        let span = children
            .iter()
            .skip(1)
            .fold(children[0].span(), |acc, c| acc.merge(&c.span()));
        Ok(Node::Group(GroupNode {
            alignment: Alignment::Fastcat,
            children,
            steps_override: None,
            span,
        }))
    }

    fn elements(&mut self, term: Term) -> Result<Vec<Node>, ParseError> {
        let mut children = Vec::new();
        while !self.at_sequence_end(term) {
            children.push(self.element()?);
        }
        if children.is_empty() {
            return Err(match self.lexer.peek() {
                Some((token, span)) => {
                    ParseError::unexpected_token("a pattern", token.to_string(), *span)
                }
                None => ParseError::unexpected_end("a pattern"),
            });
        }
        Ok(children)
    }

    fn at_sequence_end(&self, term: Term) -> bool {
        let Some((token, _)) = self.lexer.peek() else {
            return true;
        };
        if matches!(token, Token::Comma) {
            return true;
        }
        match term {
            Term::Quote => matches!(token, Token::Quote),
            Term::Bracket => matches!(token, Token::RBracket),
            Term::Angle => matches!(token, Token::RAngle),
            Term::Brace => matches!(token, Token::RBrace),
            Term::Statement => matches!(token, Token::Hash),
        }
    }

    /// A slice plus any trailing modifiers.
    fn element(&mut self) -> Result<Node, ParseError> {
        let source = self.slice()?;
        let mut span = source.span();
        let mut ops = Vec::new();
        let mut weight = 1.0;
        loop {
            match self.lexer.peek() {
                Some((Token::Star, _)) => {
                    self.lexer.next();
                    let (n, n_span) = self.number("a speed factor")?;
                    if n <= 0.0 {
                        return Err(ParseError::invalid("speed factor must be positive", n_span));
                    }
                    ops.push(ElementOp::Fast(n));
                    span = span.merge(&n_span);
                }
                Some((Token::Slash, _)) => {
                    self.lexer.next();
                    let (n, n_span) = self.number("a slowdown factor")?;
                    if n <= 0.0 {
                        return Err(ParseError::invalid(
                            "slowdown factor must be positive",
                            n_span,
                        ));
                    }
                    ops.push(ElementOp::Slow(n));
                    span = span.merge(&n_span);
                }
                Some((Token::At, _)) => {
                    self.lexer.next();
                    let (n, n_span) = self.number("a weight")?;
                    if n <= 0.0 {
                        return Err(ParseError::invalid("weight must be positive", n_span));
                    }
                    weight = n;
                    span = span.merge(&n_span);
                }
                Some((Token::LParen, open)) => {
                    let open = *open;
                    self.lexer.next();
                    let (pulses, _) = self.number("a pulse count")?;
                    self.expect(&Token::Comma, "','")?;
                    let (steps, _) = self.number("a step count")?;
                    let rotation = if matches!(self.lexer.peek(), Some((Token::Comma, _))) {
                        self.lexer.next();
                        Some(self.number("a rotation")?.0)
                    } else {
                        None
                    };
                    let (_, close) = self.expect(&Token::RParen, "')'")?;
                    let op_span = open.merge(&close);
                    ops.push(ElementOp::Euclid {
                        pulses,
                        steps,
                        rotation,
                        span: op_span,
                    });
                    span = span.merge(&close);
                }
                Some((Token::DotDot, _)) => {
                    self.lexer.next();
                    let end = self.slice()?;
                    span = span.merge(&end.span());
                    ops.push(ElementOp::Range { end });
                }
                _ => break,
            }
        }
        if ops.is_empty() && weight == 1.0 {
            return Ok(source);
        }
        Ok(Node::Element(Box::new(ElementNode {
            source,
            ops,
            weight,
            span,
        })))
    }

    fn slice(&mut self) -> Result<Node, ParseError> {
        let (token, span) = self
            .lexer
            .next()
            .ok_or_else(|| ParseError::unexpected_end("a pattern"))?;
        match token {
            Token::Number(n) => Ok(Node::Atom(AtomNode {
                value: AtomValue::Number(n),
                span,
            })),
            Token::Atom(name) => Ok(Node::Atom(AtomNode {
                value: AtomValue::Name(name),
                span,
            })),
            Token::Tilde => Ok(Node::Atom(AtomNode {
                value: AtomValue::Rest,
                span,
            })),
            Token::LBracket => {
                let inner = self.sequences(Term::Bracket)?;
                let (_, close) = self.expect(&Token::RBracket, "']'")?;
                Ok(self.regroup(inner, Alignment::Fastcat, span.merge(&close)))
            }
            Token::LAngle => {
                let children = self.elements(Term::Angle)?;
                let (_, close) = self.expect(&Token::RAngle, "'>'")?;
                Ok(Node::Group(GroupNode {
                    alignment: Alignment::Slowcat,
                    children,
                    steps_override: None,
                    span: span.merge(&close),
                }))
            }
            Token::LBrace => self.polymeter(span),
            other => Err(ParseError::unexpected_token(
                "a pattern",
                other.to_string(),
                span,
            )),
        }
    }

    /// Rewraps a bracket body so the group keeps the delimiter span. A
    /// stacked body stays a stack; anything else becomes (or remains) a
    /// group with the given alignment.
    fn regroup(&self, inner: Node, alignment: Alignment, span: Span) -> Node {
        match inner {
            Node::Group(mut group) => {
                group.span = span;
                Node::Group(group)
            }
            single => Node::Group(GroupNode {
                alignment,
                children: vec![single],
                steps_override: None,
                span,
            }),
        }
    }

    fn polymeter(&mut self, open: Span) -> Result<Node, ParseError> {
        let mut branches = Vec::new();
        loop {
            let children = self.elements(Term::Brace)?;
            let span = children
                .iter()
                .skip(1)
                .fold(children[0].span(), |acc, c| acc.merge(&c.span()));
            branches.push(Node::Group(GroupNode {
                alignment: Alignment::Fastcat,
                children,
                steps_override: None,
                span,
            }));
            if matches!(self.lexer.peek(), Some((Token::Comma, _))) {
                self.lexer.next();
            } else {
                break;
            }
        }
        let (_, close) = self.expect(&Token::RBrace, "'}'")?;
        let mut span = open.merge(&close);
        let steps_override = if matches!(self.lexer.peek(), Some((Token::Bang, _))) {
            self.lexer.next();
            let (n, n_span) = self.number("a step count")?;
            if n.fract() != 0.0 || n < 1.0 {
                return Err(ParseError::invalid(
                    "polymeter step count must be a positive integer",
                    n_span,
                ));
            }
            span = span.merge(&n_span);
            Some(n as u64)
        } else {
            None
        };
        Ok(Node::Group(GroupNode {
            alignment: Alignment::Polymeter,
            children: branches,
            steps_override,
            span,
        }))
    }

    fn number(&mut self, expected: &str) -> Result<(f64, Span), ParseError> {
        match self.lexer.next() {
            Some((Token::Number(n), span)) => Ok((n, span)),
            Some((token, span)) => Err(ParseError::unexpected_token(
                expected,
                token.to_string(),
                span,
            )),
            None => Err(ParseError::unexpected_end(expected)),
        }
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(Token, Span), ParseError> {
        match self.lexer.next() {
            Some((found, span)) if &found == token => Ok((found, span)),
            Some((found, span)) => Err(ParseError::unexpected_token(
                expected,
                found.to_string(),
                span,
            )),
            None => Err(ParseError::unexpected_end(expected)),
        }
    }
}
