// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
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

    /// 1-based column in characters, for diagnostics.
    pub fn column(&self) -> usize {
        self.src[..self.start].chars().count() + 1
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

    pub fn shift_right(&mut self, by: usize) {
        self.len += by;
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

    /// Whether a `-` following this token negates rather than subtracts.
    const fn expects_operand(prev: Option<Self>) -> bool {
        match prev {
            None => true,
            Some(Self::Op(_) | Self::Comma | Self::OpenParen) => true,
            Some(_) => false,
        }
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
    cur: Peekable<CharIndices<'src>>,
    prev: Option<TokTyp>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            prev: None,
            has_errored: false,
        }
    }

    fn loc(&self, start: usize, len: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, len)
    }

    pub fn trim_whitespace(&mut self) {
        while self.cur.next_if(|(_, chr)| chr.is_whitespace()).is_some() {}
    }

    pub fn consume_unambiguous(&mut self) -> Option<Tok> {
        let (idx, chr) = self.cur.peek().copied()?;
        let typ = match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '%' => TokTyp::Op(OperatorTyp::Rem),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,

            '>' => TokTyp::XGreater,
            '<' => TokTyp::XLess,
            '=' => TokTyp::XEqual,
            '|' => TokTyp::XPipe,
            '[' => TokTyp::XOpenSquareBracket,
            ']' => TokTyp::XCloseSquareBracket,
            '{' => TokTyp::XOpenCurly,
            '}' => TokTyp::XCloseCurly,
            _ => return None,
        };
        self.cur.next();
        Some(Tok {
            typ,
            loc: self.loc(idx, chr.len_utf8()),
        })
    }

    /// Gathers characters into a token of type `typ` for as long as
    /// `predicate` holds. Returns `None` if not even one character matched.
    pub fn consume_by<P>(&mut self, next_idx: usize, typ: TokTyp, predicate: P) -> Option<Tok>
    where
        P: Fn(char) -> bool,
    {
        let mut tok = Tok {
            typ,
            loc: self.loc(next_idx, 0),
        };
        while let Some((_, chr)) = self.cur.next_if(|(_, chr)| predicate(*chr)) {
            tok.loc.shift_right(chr.len_utf8());
        }
        (!tok.loc.is_empty()).then_some(tok)
    }

    fn consume_ident(&mut self, next_idx: usize, first: char) -> Option<Tok> {
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        self.consume_by(next_idx, TokTyp::Ident, |chr| {
            chr.is_ascii_alphanumeric() || chr == '_'
        })
    }

    fn consume_number(&mut self, next_idx: usize) -> Option<Tok> {
        let mut tok = self.consume_by(next_idx, TokTyp::Number, |chr| {
            chr.is_ascii_digit() || chr == '.'
        })?;

        // exponent, only when digits actually follow, so `2e` stays `2 e`
        let mut ahead = self.cur.clone();
        if let Some((_, 'e' | 'E')) = ahead.next() {
            let mut len = 1;
            if let Some((_, '+' | '-')) = ahead.peek() {
                ahead.next();
                len += 1;
            }
            if ahead.peek().is_some_and(|(_, chr)| chr.is_ascii_digit()) {
                for _ in 0..len {
                    self.cur.next();
                }
                tok.loc.shift_right(len);
                while self.cur.next_if(|(_, chr)| chr.is_ascii_digit()).is_some() {
                    tok.loc.shift_right(1);
                }
            }
        }
        Some(tok)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (next_idx, next_chr) = self.cur.peek().copied()?;
        let ret = if let Some(tok) = self.consume_unambiguous() {
            Ok(tok)
        } else if next_chr == '-' {
            // distinguish subtraction from negation
            self.cur.next();
            let typ = if TokTyp::expects_operand(self.prev) {
                TokTyp::Op(OperatorTyp::Neg)
            } else {
                TokTyp::Op(OperatorTyp::Sub)
            };
            Ok(Tok {
                typ,
                loc: self.loc(next_idx, 1),
            })
        } else if let Some(tok) = self.consume_ident(next_idx, next_chr) {
            Ok(tok)
        } else if let Some(tok) = self.consume_number(next_idx) {
            Ok(tok)
        } else {
            self.has_errored = true;
            Err(LexErr {
                typ: LexErrTyp::InvalidChar,
                loc: self.loc(next_idx, next_chr.len_utf8()),
            })
        };

        match ret {
            Ok(tok) if tok.typ.is_unsupported() => {
                self.has_errored = true;
                Some(Err(LexErr {
                    typ: LexErrTyp::Unsupported(tok.typ),
                    loc: tok.loc,
                }))
            }
            Ok(tok) => {
                self.prev = Some(tok.typ);
                Some(Ok(tok))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
