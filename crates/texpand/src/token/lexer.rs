//! The lexer, which turns characters into tokens.
//!
//! The lexer is "just in time": it only produces the next token when that token is requested.
//! Category codes can change while the input is being processed (`\catcode` is itself a
//! command that runs between two tokens), so characters are classified at the moment they are
//! read and never ahead of time.
//!
//! Whitespace handling is driven by a three state machine, following TeX:
//!
//! - [State::NewLine]: at the start of a line. Spaces are dropped and an end-of-line
//!   character produces `\par`.
//! - [State::MidLine]: after ordinary content. A space or end-of-line character produces a
//!   single space token.
//! - [State::SkipSpace]: after a space or a control sequence. Spaces and end-of-line
//!   characters are dropped. The control symbol made from an end-of-line character is the
//!   exception and leaves the lexer in [State::MidLine].
//!
//! A comment runs up to and including the end-of-line character and does not change the state.

use crate::error::Kind;
use crate::token::catcode::{self, CatCode};
use crate::token::{CsName, CsNameInterner, Token};
use crate::vm::source;

/// Longest control sequence name the lexer accepts.
pub const MAX_CS_NAME_LEN: usize = 1024;

/// Line discipline state of the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    NewLine,
    MidLine,
    SkipSpace,
}

#[derive(Debug, Default)]
pub struct Lexer {
    state: State,
    // Control sequence names are assembled in a shared buffer to avoid allocating for each one.
    buffer: String,
}

impl Lexer {
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the next token, or [None] at the end of the input.
    pub fn next(
        &mut self,
        sources: &mut source::Stack,
        cat_codes: &catcode::Table,
        cs_name_interner: &mut CsNameInterner,
    ) -> Result<Option<Token>, Kind> {
        while let Some(raw) = sources.read_char(cat_codes) {
            let token = match raw.code {
                CatCode::Space => match self.state {
                    State::NewLine | State::SkipSpace => continue,
                    State::MidLine => {
                        self.state = State::SkipSpace;
                        Token::Other(' ')
                    }
                },
                CatCode::EndOfLine => {
                    let state = std::mem::replace(&mut self.state, State::NewLine);
                    match state {
                        State::NewLine => {
                            Token::ControlSequence(cs_name_interner.get_or_intern("par"))
                        }
                        State::SkipSpace => continue,
                        State::MidLine => Token::Other(' '),
                    }
                }
                CatCode::Comment => {
                    while let Some(next) = sources.read_char(cat_codes) {
                        if next.code == CatCode::EndOfLine {
                            break;
                        }
                    }
                    continue;
                }
                CatCode::Parameter => {
                    self.state = State::MidLine;
                    match sources.read_char(cat_codes) {
                        Some(next) if next.code == CatCode::Parameter => Token::Other(raw.char),
                        Some(next) if ('1'..='9').contains(&next.char) => {
                            Token::Parameter(next.char as u8 - b'0')
                        }
                        next => {
                            return Err(Kind::MalformedParameter(match next {
                                None => "`#` at the end of the input".into(),
                                Some(next) => format!(
                                    "`#` must be followed by a digit 1-9 or `#`, found `{}`",
                                    next.char
                                ),
                            }))
                        }
                    }
                }
                CatCode::Escape => Token::ControlSequence(self.read_control_sequence(
                    sources,
                    cat_codes,
                    cs_name_interner,
                )?),
                CatCode::Ignored => continue,
                CatCode::Invalid => return Err(Kind::InvalidCharacter(raw.char)),
                code => {
                    self.state = State::MidLine;
                    match Token::new(raw.char, code) {
                        Some(token) => token,
                        None => continue,
                    }
                }
            };
            return Ok(Some(token));
        }
        Ok(None)
    }

    fn read_control_sequence(
        &mut self,
        sources: &mut source::Stack,
        cat_codes: &catcode::Table,
        cs_name_interner: &mut CsNameInterner,
    ) -> Result<CsName, Kind> {
        self.buffer.clear();
        match sources.read_char(cat_codes) {
            None => {
                self.state = State::MidLine;
            }
            Some(raw) if raw.code == CatCode::EndOfLine => {
                self.state = State::MidLine;
            }
            Some(raw) if raw.code == CatCode::Letter => {
                self.buffer.push(raw.char);
                while let Some(raw) = sources.read_char(cat_codes) {
                    if raw.code != CatCode::Letter {
                        sources.unread_char();
                        break;
                    }
                    if self.buffer.len() >= MAX_CS_NAME_LEN {
                        return Err(Kind::ControlSequenceTooLong(MAX_CS_NAME_LEN));
                    }
                    self.buffer.push(raw.char);
                }
                self.state = State::SkipSpace;
            }
            Some(raw) => {
                self.buffer.push(raw.char);
                self.state = State::SkipSpace;
            }
        }
        Ok(cs_name_interner.get_or_intern(&self.buffer))
    }
}
