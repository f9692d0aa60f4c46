//! Texpand prelude.
//!
//! The types almost every primitive needs.
//! ```
//! use texpand::prelude::*;
//! ```

pub use crate::command::{BuiltIn, Command, Primitive};
pub use crate::error::{Error, Kind, Result};
pub use crate::token::Token;
pub use crate::vm::VM;
