//! # Texpand: a TeX-style macro expansion engine.
//!
//! This crate turns a stream of input characters into a stream of output characters
//!     the way the expansion half of TeX does:
//!     characters are tokenized according to category codes,
//!     control sequences are looked up in a scoped table,
//!     and macros are expanded with TeX's argument binding rules.
//! No typesetting is performed.
//!
//! The crate provides the engine. The primitives that input text can use
//!     (`\def`, `\edef`, conditionals and so on) live in the `texpand-stdlib` crate and are
//!     handed to the [VM](vm::VM) when it is created.
//!
//! ```
//! use std::collections::HashMap;
//! use texpand::vm::VM;
//!
//! let mut vm = VM::new(HashMap::new());
//! vm.push_source("input.tex", "Hello, {World}!").unwrap();
//! assert_eq!(vm.read_to_string().unwrap(), "Hello, World!");
//! ```

pub mod command;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod scope;
pub mod texmacro;
pub mod token;
pub mod vm;
