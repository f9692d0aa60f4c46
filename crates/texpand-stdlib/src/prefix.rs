//! The `\global` prefix command
//!
//! `\global` sets a flag on the VM.
//! Every command that can be prefixed with `\global` reads the flag exactly once using
//!     [VM::take_global] or through [VM::define], which resets it.
//! It is essential that *all* code paths of such a command reset the flag,
//!     even if they don't use the result,
//!     otherwise `\global` would leak into a later, unrelated definition.
//! For example `\gdef` always creates a macro in the global scope, but it still resets the flag.

use texpand::prelude::*;

pub const GLOBAL_DOC: &str = "Make the next definition or category code change global";

/// Get the `\global` command.
pub fn get_global() -> BuiltIn {
    BuiltIn::new(Global).with_doc(GLOBAL_DOC)
}

struct Global;

impl Primitive for Global {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        vm.set_global();
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def;
    use std::collections::HashMap;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        HashMap::from([
            ("def", def::get_def()),
            ("gdef", def::get_gdef()),
            ("global", get_global()),
        ])
    }

    test_suite![
        expansion_equality_tests(
            (global_def, r"{\global\def\a{x}}\a", "x"),
            (global_global_def, r"{\global\global\def\a{x}}\a", "x"),
            (global_gdef, r"{\global\gdef\a{x}}\a", "x"),
            (global_flag_waits_for_definition, r"{\global ab\def\a{x}}\a", "abx"),
        ),
        failure_tests(
            (gdef_resets_global_flag, r"\global\gdef\a{x}{\def\b{y}}\b", UndefinedMacro),
            (global_only_applies_once, r"{\global\def\a{x}\def\b{y}}\a\b", UndefinedMacro),
        ),
    ];
}
