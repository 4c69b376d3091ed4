// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // yes, silly, but atomic operations are cheap for this use case
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,

    // unsupported tokens
    XGreater,
    XLess,
    XEqual,
    XPipe,
    XOpenSquareBracket,
    XCloseSquareBracket,
    XOpenCurly,
    XCloseCurly,
}

impl TokTyp {
    pub const fn is_unsupported(&self) -> bool {
        match self {
            Self::Ident
            | Self::Number
            | Self::Op(_)
            | Self::Comma
            | Self::OpenParen
            | Self::CloseParen => false,

            // unsupported tokens
            Self::XGreater
            | Self::XLess
            | Self::XEqual
            | Self::XPipe
            | Self::XOpenSquareBracket
            | Self::XCloseSquareBracket
            | Self::XOpenCurly
            | Self::XCloseCurly => true,
        }
    }

    /// Whether a `-` directly after this token subtracts rather than negates.
    const fn ends_operand(&self) -> bool {
        matches!(self, Self::Ident | Self::Number | Self::CloseParen)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(TokTyp),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    pos: usize,         // byte offset, only ever advanced past ascii
    prev: Option<TokTyp>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            pos: 0,
            prev: None,
            has_errored: false,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn span(&self, start: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, self.pos - start)
    }

    pub fn trim_whitespace(&mut self) {
        while let Some(chr) = self.peek_at(0) {
            if chr.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn consume_unambiguous(&mut self, chr: u8) -> Option<TokTyp> {
        let typ = match chr {
            b'+' => TokTyp::Op(OperatorTyp::Add),
            b'*' => TokTyp::Op(OperatorTyp::Mul),
            b'/' => TokTyp::Op(OperatorTyp::Div),
            b'^' => TokTyp::Op(OperatorTyp::Pow),
            b',' => TokTyp::Comma,
            b'(' => TokTyp::OpenParen,
            b')' => TokTyp::CloseParen,

            b'>' => TokTyp::XGreater,
            b'<' => TokTyp::XLess,
            b'=' => TokTyp::XEqual,
            b'|' => TokTyp::XPipe,
            b'[' => TokTyp::XOpenSquareBracket,
            b']' => TokTyp::XCloseSquareBracket,
            b'{' => TokTyp::XOpenCurly,
            b'}' => TokTyp::XCloseCurly,
            _ => return None,
        };
        self.pos += 1;
        Some(typ)
    }

    fn consume_while<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(u8) -> bool,
    {
        let start = self.pos;
        while let Some(chr) = self.peek_at(0) {
            if predicate(chr) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos - start
    }

    fn consume_number(&mut self) {
        self.consume_while(|chr| chr.is_ascii_digit() || chr == b'.');

        // optional exponent, only taken if digits actually follow
        if let Some(b'e' | b'E') = self.peek_at(0) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if self
                .peek_at(1 + sign)
                .map(|chr| chr.is_ascii_digit())
                .unwrap_or(false)
            {
                self.pos += 1 + sign;
                self.consume_while(|chr| chr.is_ascii_digit());
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let start = self.pos;
        let chr = self.peek_at(0)?;
        let typ = if let Some(typ) = self.consume_unambiguous(chr) {
            typ
        } else if chr == b'-' {
            // distinguish subtraction from negation
            self.pos += 1;
            if self.prev.map(|prev| prev.ends_operand()).unwrap_or(false) {
                TokTyp::Op(OperatorTyp::Sub)
            } else {
                TokTyp::Op(OperatorTyp::Neg)
            }
        } else if chr.is_ascii_alphabetic() {
            self.consume_while(|chr| chr.is_ascii_alphanumeric() || chr == b'_');
            TokTyp::Ident
        } else if chr.is_ascii_digit() || chr == b'.' {
            self.consume_number();
            TokTyp::Number
        } else {
            self.has_errored = true;
            // NOTE(unicode): highlight a single byte, good enough for ascii input
            return Some(Err(LexErr {
                typ: LexErrTyp::InvalidChar,
                loc: SubStr::new(Arc::clone(self.src), start, 1),
            }));
        };

        let loc = self.span(start);
        if typ.is_unsupported() {
            self.has_errored = true;
            return Some(Err(LexErr {
                typ: LexErrTyp::Unsupported(typ),
                loc,
            }));
        }
        self.prev = Some(typ);
        Some(Ok(Tok { typ, loc }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(src: &str) -> Vec<TokTyp> {
        let src = Arc::new(src.to_string());
        Lexer::new(&src).map(|tok| tok.unwrap().typ).collect()
    }

    #[test]
    fn minus_after_operand_is_subtraction() {
        use TokTyp::{CloseParen, Ident, Number, Op, OpenParen};
        assert_eq!(
            types("2-x"),
            vec![Number, Op(OperatorTyp::Sub), Ident]
        );
        assert_eq!(
            types("-(x)-1"),
            vec![
                Op(OperatorTyp::Neg),
                OpenParen,
                Ident,
                CloseParen,
                Op(OperatorTyp::Sub),
                Number
            ]
        );
        assert_eq!(
            types("x^-2"),
            vec![Ident, Op(OperatorTyp::Pow), Op(OperatorTyp::Neg), Number]
        );
    }

    #[test]
    fn number_with_exponent_is_one_token() {
        let src = Arc::new(String::from("1.5e-3*x"));
        let toks: Vec<Tok> = Lexer::new(&src).map(Result::unwrap).collect();
        assert_eq!(toks[0].typ, TokTyp::Number);
        assert_eq!(toks[0].loc.get(), "1.5e-3");
        assert_eq!(toks.len(), 3);
    }

    #[test]
    fn trailing_e_is_not_an_exponent() {
        let src = Arc::new(String::from("2e"));
        let toks: Vec<Tok> = Lexer::new(&src).map(Result::unwrap).collect();
        assert_eq!(toks[0].loc.get(), "2");
        assert_eq!(toks[1].typ, TokTyp::Ident);
    }

    #[test]
    fn unsupported_token_stops_lexing() {
        let src = Arc::new(String::from("y = x"));
        let mut lex = Lexer::new(&src);
        assert!(lex.next().unwrap().is_ok());
        let err = lex.next().unwrap().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Unsupported(TokTyp::XEqual));
        assert_eq!(err.loc.start(), 2);
        assert!(lex.next().is_none());
    }
}
