use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // covers sample names ("bd", "hh27") and note names ("c4", "c#3")
    #[regex(r"[a-zA-Z][a-zA-Z0-9_#-]*", |lex| lex.slice().to_owned())]
    Atom(String),

    #[token("\"")]
    Quote,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("~")]
    Tilde,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("@")]
    At,
    #[token("!")]
    Bang,
    #[token("..")]
    DotDot,
    #[token("#")]
    Hash,
    #[token(":")]
    Colon,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Atom(s) => write!(f, "{s}"),
            Token::Quote => write!(f, "\""),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Tilde => write!(f, "~"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::At => write!(f, "@"),
            Token::Bang => write!(f, "!"),
            Token::DotDot => write!(f, ".."),
            Token::Hash => write!(f, "#"),
            Token::Colon => write!(f, ":"),
        }
    }
}

/// Tokenizes the whole source up front so the parser can peek freely.
#[derive(Debug)]
pub struct Lexer {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        for (result, range) in Token::lexer(source).spanned() {
            let span = Span::from(range);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(ParseError::InvalidToken {
                        text: source[span.to_range()].to_string(),
                        span,
                    })
                }
            }
        }
        Ok(Lexer { tokens, pos: 0 })
    }

    pub fn peek(&self) -> Option<&(Token, Span)> {
        self.tokens.get(self.pos)
    }

    pub fn next(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Span just past the final token, for end-of-input diagnostics.
    pub fn end_span(&self) -> Span {
        match self.tokens.last() {
            Some((_, span)) => Span::new(span.end, span.end),
            None => Span::new(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source).unwrap();
        let mut out = Vec::new();
        while let Some((token, _)) = lexer.next() {
            out.push(token);
        }
        out
    }

    #[test]
    fn lexes_a_simple_sequence() {
        assert_eq!(
            kinds("bd ~ sd"),
            vec![
                Token::Atom("bd".into()),
                Token::Tilde,
                Token::Atom("sd".into()),
            ]
        );
    }

    #[test]
    fn sharp_stays_inside_note_names() {
        assert_eq!(
            kinds("c#3 # db3"),
            vec![
                Token::Atom("c#3".into()),
                Token::Hash,
                Token::Atom("db3".into()),
            ]
        );
    }

    #[test]
    fn range_needs_no_whitespace() {
        assert_eq!(
            kinds("0..3"),
            vec![Token::Number(0.0), Token::DotDot, Token::Number(3.0)]
        );
    }

    #[test]
    fn numbers_lex_with_decimals_and_signs() {
        assert_eq!(kinds("0.25 -3"), vec![Token::Number(0.25), Token::Number(-3.0)]);
    }

    #[test]
    fn param_headers_split_on_colon() {
        assert_eq!(
            kinds("hold:0"),
            vec![Token::Atom("hold".into()), Token::Colon, Token::Number(0.0)]
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = Lexer::new("bd $ sd").unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { .. }));
    }

    #[test]
    fn tracks_spans() {
        let mut lexer = Lexer::new("bd sd").unwrap();
        let (_, first) = lexer.next().unwrap();
        let (_, second) = lexer.next().unwrap();
        assert_eq!(first, Span::new(0, 2));
        assert_eq!(second, Span::new(3, 5));
    }
}
