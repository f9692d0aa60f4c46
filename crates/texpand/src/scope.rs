//! Blocks: the nested scopes holding category codes and command bindings.
//!
//! A block is opened by every `{` the engine processes and closed by the matching `}`.
//! Opening a block copies the category code table of the enclosing block
//!     and starts an empty command table.
//! Lookups walk from the innermost block out to the root,
//!     so a definition made inside a group shadows the outer one until the group closes.

use crate::command::Command;
use crate::token::catcode::{self, CatCode};
use crate::token::CsName;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct Block {
    cat_codes: catcode::Table,
    commands: HashMap<CsName, Command>,
}

/// The chain of open blocks. The root block always exists.
#[derive(Debug)]
pub struct Blocks {
    // Index 0 is the root block.
    blocks: Vec<Block>,
}

impl Default for Blocks {
    fn default() -> Self {
        Blocks {
            blocks: vec![Block::default()],
        }
    }
}

impl Blocks {
    /// Number of groups currently open; 0 when only the root block exists.
    pub fn depth(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn begin_group(&mut self) {
        let cat_codes = self.current().cat_codes.clone();
        self.blocks.push(Block {
            cat_codes,
            commands: HashMap::new(),
        });
        tracing::trace!(depth = self.depth(), "entered group");
    }

    /// Closes the innermost group, discarding its local definitions.
    ///
    /// Returns false if only the root block is open; the root block is never removed.
    pub fn end_group(&mut self) -> bool {
        if self.blocks.len() == 1 {
            return false;
        }
        self.blocks.pop();
        tracing::trace!(depth = self.depth(), "left group");
        true
    }

    pub fn cat_codes(&self) -> &catcode::Table {
        &self.current().cat_codes
    }

    /// Sets the category code of an ASCII character.
    ///
    /// A local change only affects the current block.
    /// A global change is written to every open block.
    /// Returns false if the character is outside the table.
    pub fn set_cat_code(&mut self, c: char, code: CatCode, global: bool) -> bool {
        if global {
            self.blocks
                .iter_mut()
                .fold(true, |ok, block| block.cat_codes.set(c, code) && ok)
        } else {
            self.current_mut().cat_codes.set(c, code)
        }
    }

    /// Binds a command to a name.
    ///
    /// A local definition replaces a binding in the current block and shadows any binding in
    ///     an enclosing block.
    /// A global definition is written to the root block and removes the name from every inner
    ///     block, so it is visible immediately and survives the end of the current group.
    pub fn define(&mut self, name: CsName, command: Command, global: bool) {
        if global {
            for block in self.blocks.iter_mut().skip(1) {
                block.commands.remove(&name);
            }
            self.blocks[0].commands.insert(name, command);
        } else {
            self.current_mut().commands.insert(name, command);
        }
    }

    /// Returns the innermost binding for the name.
    pub fn lookup(&self, name: CsName) -> Option<&Command> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.commands.get(&name))
    }

    /// All names with a binding in some open block, without duplicates.
    pub fn names(&self) -> Vec<CsName> {
        let mut names: Vec<CsName> = self
            .blocks
            .iter()
            .flat_map(|block| block.commands.keys().copied())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn current(&self) -> &Block {
        // The root block is never popped.
        &self.blocks[self.blocks.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Block {
        let i = self.blocks.len() - 1;
        &mut self.blocks[i]
    }
}
