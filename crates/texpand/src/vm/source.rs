//! The stack of character sources that feeds the lexer.

use crate::token::catcode::{self, CatCode};

/// A character read from a source, classified by the current category code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChar {
    pub char: char,
    pub code: CatCode,
}

/// A position in a source, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub name: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the last character read; 0 if nothing on the line has been read.
    pub column: usize,
    /// Full text of the line, without the trailing newline.
    pub line_content: String,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    offset: usize,
    line: usize,
    column: usize,
    line_start: usize,
}

#[derive(Debug)]
struct Source {
    name: String,
    text: String,
    position: Position,
    previous: Option<Position>,
}

impl Source {
    fn next_char(&mut self) -> Option<char> {
        let c = self.text[self.position.offset..].chars().next()?;
        self.previous = Some(self.position);
        let p = &mut self.position;
        p.offset += c.len_utf8();
        if c == '\n' {
            p.line += 1;
            p.column = 0;
            p.line_start = p.offset;
        } else {
            p.column += 1;
        }
        Some(c)
    }

    fn location(&self) -> Location {
        // If the last character read was a newline, report the line it ended.
        let (p, column) = match self.previous {
            Some(previous) if previous.line != self.position.line => {
                (previous, previous.column + 1)
            }
            _ => (self.position, self.position.column),
        };
        let rest = &self.text[p.line_start..];
        let line_content = match rest.find('\n') {
            None => rest,
            Some(i) => &rest[..i],
        };
        Location {
            name: self.name.clone(),
            line: p.line,
            column,
            line_content: line_content.to_string(),
        }
    }
}

/// A LIFO stack of character sources.
///
/// Reads come from the top source.
/// An exhausted source is popped transparently and reading continues with the source below.
#[derive(Debug, Default)]
pub struct Stack {
    sources: Vec<Source>,
    last_location: Option<Location>,
}

impl Stack {
    /// Pushes a new source; it is read before the remainder of the current source.
    pub fn push(&mut self, name: String, text: String) {
        tracing::debug!(name, depth = self.sources.len() + 1, "pushing input source");
        self.sources.push(Source {
            name,
            text,
            position: Position {
                offset: 0,
                line: 1,
                column: 0,
                line_start: 0,
            },
            previous: None,
        });
    }

    pub fn depth(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Reads the next character, classifying it using the provided table.
    ///
    /// Returns [None] once every source is exhausted.
    pub fn read_char(&mut self, cat_codes: &catcode::Table) -> Option<RawChar> {
        loop {
            let source = self.sources.last_mut()?;
            if let Some(c) = source.next_char() {
                return Some(RawChar {
                    char: c,
                    code: cat_codes.get(c),
                });
            }
            self.last_location = Some(source.location());
            tracing::debug!(name = source.name, "input source exhausted");
            self.sources.pop();
        }
    }

    /// Puts the last character read back onto its source.
    ///
    /// Only one character can be put back per read.
    pub fn unread_char(&mut self) {
        if let Some(source) = self.sources.last_mut() {
            if let Some(previous) = source.previous.take() {
                source.position = previous;
            }
        }
    }

    /// Location of the last character read.
    pub fn location(&self) -> Option<Location> {
        match self.sources.last() {
            Some(source) => Some(source.location()),
            None => self.last_location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(stack: &mut Stack) -> String {
        let table = catcode::Table::default();
        let mut s = String::new();
        while let Some(raw) = stack.read_char(&table) {
            s.push(raw.char);
        }
        s
    }

    #[test]
    fn pushed_source_is_read_first() {
        let mut stack = Stack::default();
        stack.push("outer".into(), "abc".into());
        let table = catcode::Table::default();
        assert_eq!(stack.read_char(&table).map(|r| r.char), Some('a'));
        stack.push("inner".into(), "XY".into());
        assert_eq!(read_all(&mut stack), "XYbc");
        assert!(stack.is_empty());
    }

    #[test]
    fn classification_uses_table() {
        let mut stack = Stack::default();
        stack.push("b".into(), "\\a{".into());
        let table = catcode::Table::default();
        let codes: Vec<CatCode> = std::iter::from_fn(|| stack.read_char(&table))
            .map(|r| r.code)
            .collect();
        assert_eq!(
            codes,
            vec![CatCode::Escape, CatCode::Letter, CatCode::BeginGroup]
        );
    }

    #[test]
    fn unread_char() {
        let mut stack = Stack::default();
        stack.push("b".into(), "ab".into());
        let table = catcode::Table::default();
        stack.read_char(&table);
        stack.read_char(&table);
        stack.unread_char();
        assert_eq!(read_all(&mut stack), "b");
    }

    #[test]
    fn location_tracks_lines_and_columns() {
        let mut stack = Stack::default();
        stack.push("file.tex".into(), "ab\ncde\nf".into());
        let table = catcode::Table::default();
        for _ in 0..5 {
            stack.read_char(&table);
        }
        let location = stack.location().unwrap();
        assert_eq!(location.name, "file.tex");
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 2);
        assert_eq!(location.line_content, "cde");
    }

    #[test]
    fn location_after_exhaustion() {
        let mut stack = Stack::default();
        stack.push("file.tex".into(), "xy".into());
        read_all(&mut stack);
        let location = stack.location().unwrap();
        assert_eq!(location.line, 1);
        assert_eq!(location.column, 2);
        assert_eq!(location.line_content, "xy");
    }
}
