//! Category codes and the per-block category code table.

use CatCode::*;

/// The 16 category codes.
///
/// Each variant's documentation gives the character that has that code in the default table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatCode {
    /// Introduces a control sequence.
    /// Example: `\`.
    ///
    /// Never seen outside of the lexer.
    Escape = 0,
    /// Begins a group.
    /// Example: `{`.
    BeginGroup = 1,
    /// Ends a group.
    /// Example: `}`.
    EndGroup = 2,
    /// Example: `$`.
    MathShift = 3,
    /// Example: `&`.
    AlignmentTab = 4,
    /// Marks the end of a line.
    /// Example: `\n`.
    ///
    /// Behaves like [Space] in the middle of a line.
    /// At the start of a line it produces `\par`.
    /// It also terminates a [Comment].
    EndOfLine = 5,
    /// Introduces a parameter number in a macro pattern or body.
    /// Example: `#`.
    Parameter = 6,
    /// Example: `^`.
    Superscript = 7,
    /// Example: `_`.
    Subscript = 8,
    /// Dropped by the lexer.
    Ignored = 9,
    /// Whitespace. Examples: ` ` and tab.
    Space = 10,
    /// A character that can be part of a multi-character control sequence name.
    /// Examples: `[a-zA-Z]`.
    Letter = 11,
    /// Everything else.
    /// Example: `@`.
    #[default]
    Other = 12,
    /// A character that stands for itself but is looked at like a command.
    /// Example: `~`.
    Active = 13,
    /// Starts a comment running to the end of the line.
    /// Example: `%`.
    Comment = 14,
    /// A character that may not appear in the input.
    /// Examples: ASCII null and delete.
    Invalid = 15,
}

impl TryFrom<u8> for CatCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Escape,
            1 => BeginGroup,
            2 => EndGroup,
            3 => MathShift,
            4 => AlignmentTab,
            5 => EndOfLine,
            6 => Parameter,
            7 => Superscript,
            8 => Subscript,
            9 => Ignored,
            10 => Space,
            11 => Letter,
            12 => Other,
            13 => Active,
            14 => Comment,
            15 => Invalid,
            _ => return Err(value),
        })
    }
}

impl std::fmt::Display for CatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, *self as u8)
    }
}

/// Number of characters with an entry in a category code table.
pub const TABLE_SIZE: usize = 128;

/// A category code table covering the ASCII range.
///
/// Characters outside ASCII always have category [Other].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table([CatCode; TABLE_SIZE]);

impl Table {
    pub fn get(&self, c: char) -> CatCode {
        match self.0.get(c as usize) {
            Some(code) => *code,
            None => Other,
        }
    }

    /// Sets the code for an ASCII character.
    /// Returns false if the character has no entry in the table.
    pub fn set(&mut self, c: char, code: CatCode) -> bool {
        match self.0.get_mut(c as usize) {
            Some(entry) => {
                *entry = code;
                true
            }
            None => false,
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Table(DEFAULTS)
    }
}

/// The engine's default category codes.
pub const DEFAULTS: [CatCode; TABLE_SIZE] = build_defaults();

const fn build_defaults() -> [CatCode; TABLE_SIZE] {
    let mut table = [Other; TABLE_SIZE];
    let mut i = 0;
    while i < TABLE_SIZE {
        let c = i as u8;
        if c.is_ascii_alphabetic() {
            table[i] = Letter;
        }
        i += 1;
    }
    table[0] = Invalid;
    table[0x7F] = Invalid;
    table[b'\\' as usize] = Escape;
    table[b'{' as usize] = BeginGroup;
    table[b'}' as usize] = EndGroup;
    table[b'$' as usize] = MathShift;
    table[b'&' as usize] = AlignmentTab;
    table[b'\n' as usize] = EndOfLine;
    table[b'#' as usize] = Parameter;
    table[b'^' as usize] = Superscript;
    table[b'_' as usize] = Subscript;
    table[b' ' as usize] = Space;
    table[b'\t' as usize] = Space;
    table[b'~' as usize] = Active;
    table[b'%' as usize] = Comment;
    table
}
