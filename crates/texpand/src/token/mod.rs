//! Tokens, control sequence names and category codes.

pub mod catcode;
pub mod lexer;

pub use catcode::CatCode;
use std::collections::HashMap;
use std::num;

/// Handle for an interned control sequence name.
///
/// The name itself lives in a [CsNameInterner].
/// Handles are cheap to copy and compare, which keeps [Token] `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsName(num::NonZeroU32);

/// String interner for control sequence names.
#[derive(Debug, Default)]
pub struct CsNameInterner {
    names: Vec<Box<str>>,
    index: HashMap<Box<str>, CsName>,
}

impl CsNameInterner {
    /// Returns the handle for the name, interning it if needed.
    pub fn get_or_intern(&mut self, name: &str) -> CsName {
        if let Some(cs_name) = self.index.get(name) {
            return *cs_name;
        }
        self.names.push(name.into());
        // The vector is never empty here, so the handle is non-zero.
        let raw = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        let cs_name = CsName(num::NonZeroU32::MIN.saturating_add(raw - 1));
        self.index.insert(name.into(), cs_name);
        cs_name
    }

    /// Returns the handle for the name if it has been interned.
    pub fn get(&self, name: &str) -> Option<CsName> {
        self.index.get(name).copied()
    }

    pub fn resolve(&self, cs_name: CsName) -> Option<&str> {
        self.names
            .get(cs_name.0.get() as usize - 1)
            .map(|name| name.as_ref())
    }
}

/// A TeX token.
///
/// Space and end-of-line characters never appear as their own token:
///     the lexer turns them into `Other(' ')`.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum Token {
    BeginGroup(char),
    EndGroup(char),
    MathShift(char),
    AlignmentTab(char),
    /// A parameter marker `#1`..`#9`; the payload is the parameter number.
    Parameter(u8),
    Superscript(char),
    Subscript(char),
    Letter(char),
    Other(char),
    Active(char),
    ControlSequence(CsName),
    /// Internal sentinel appended to every macro expansion.
    ///
    /// Reading it pops the macro's call frame.
    StackPop,
}

impl Token {
    /// Builds a character token for a character of the given category.
    ///
    /// Returns [None] for categories that the lexer never emits as character tokens.
    pub fn new(c: char, code: CatCode) -> Option<Token> {
        Some(match code {
            CatCode::BeginGroup => Token::BeginGroup(c),
            CatCode::EndGroup => Token::EndGroup(c),
            CatCode::MathShift => Token::MathShift(c),
            CatCode::AlignmentTab => Token::AlignmentTab(c),
            CatCode::Superscript => Token::Superscript(c),
            CatCode::Subscript => Token::Subscript(c),
            CatCode::Letter => Token::Letter(c),
            CatCode::Other => Token::Other(c),
            CatCode::Active => Token::Active(c),
            CatCode::Space | CatCode::EndOfLine => Token::Other(' '),
            CatCode::Escape
            | CatCode::Parameter
            | CatCode::Ignored
            | CatCode::Comment
            | CatCode::Invalid => return None,
        })
    }

    /// The character of a character token.
    pub fn char(&self) -> Option<char> {
        match *self {
            Token::BeginGroup(c)
            | Token::EndGroup(c)
            | Token::MathShift(c)
            | Token::AlignmentTab(c)
            | Token::Superscript(c)
            | Token::Subscript(c)
            | Token::Letter(c)
            | Token::Other(c)
            | Token::Active(c) => Some(c),
            Token::Parameter(_) | Token::ControlSequence(_) | Token::StackPop => None,
        }
    }

    pub fn cs_name(&self) -> Option<CsName> {
        match self {
            Token::ControlSequence(cs_name) => Some(*cs_name),
            _ => None,
        }
    }

    /// Writes the token the way it would appear in source code.
    pub fn write(&self, interner: &CsNameInterner, out: &mut String) {
        match self {
            Token::ControlSequence(cs_name) => {
                out.push('\\');
                out.push_str(interner.resolve(*cs_name).unwrap_or("?"));
            }
            Token::Parameter(n) => {
                out.push('#');
                out.push(char::from(b'0' + n));
            }
            Token::StackPop => {}
            _ => {
                if let Some(c) = self.char() {
                    out.push(c);
                }
            }
        }
    }

    /// Returns the source code representation of this token.
    pub fn to_string(&self, interner: &CsNameInterner) -> String {
        let mut s = String::new();
        self.write(interner, &mut s);
        s
    }
}

/// Writes a list of tokens as source code.
///
/// A space is inserted after a control word that is followed by a letter,
///     so that the result tokenizes back to the same list.
pub fn write_tokens<'a, T>(tokens: T, interner: &CsNameInterner) -> String
where
    T: IntoIterator<Item = &'a Token>,
{
    let mut result = String::new();
    let mut after_control_word = false;
    for token in tokens {
        if after_control_word && matches!(token, Token::Letter(_)) {
            result.push(' ');
        }
        token.write(interner, &mut result);
        after_control_word = match token {
            Token::ControlSequence(cs_name) => interner
                .resolve(*cs_name)
                .map(|name| name.chars().all(|c| c.is_ascii_alphabetic()) && !name.is_empty())
                .unwrap_or(false),
            _ => false,
        };
    }
    result
}
