//! Commands that alter the expansion process

use texpand::prelude::*;

pub const EXPANDAFTER_DOC: &str = "Expand the token after the next one, then put the next one back in front";

/// Get the `\expandafter` command.
///
/// As in TeX,
///     the second token is expanded exactly once, and only if it is a control sequence.
pub fn get_expandafter() -> BuiltIn {
    BuiltIn::new(ExpandAfter).with_doc(EXPANDAFTER_DOC)
}

struct ExpandAfter;

impl Primitive for ExpandAfter {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let first = vm.read_token_or_err("reading the first argument of `\\expandafter`")?;
        let second = vm.read_token_or_err("reading the second argument of `\\expandafter`")?;
        let mut result = vec![first];
        match vm.expand_once(second)? {
            Some(expansion) => result.extend(expansion),
            None => result.push(second),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def;
    use std::collections::HashMap;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        HashMap::from([("def", def::get_def()), ("expandafter", get_expandafter())])
    }

    test_suite![
        expansion_equality_tests(
            (
                expandafter_expands_second_token,
                r"\def\a{xy}\def\b#1{[#1]}\expandafter\b\a",
                "[x]y"
            ),
            (
                expandafter_without_expansion_first,
                r"\def\a{xy}\def\b#1{[#1]}\b\a",
                "[xy]"
            ),
            (expandafter_characters, r"\expandafter ab", "ab"),
            (
                expandafter_second_is_character,
                r"\def\b#1{[#1]}\expandafter\b c",
                "[c]"
            ),
            (
                expandafter_chained,
                r"\def\a{1}\def\b{2}\def\c#1#2{(#1#2)}\expandafter\c\expandafter\a\b",
                "(12)"
            ),
            (
                expandafter_defines_with_expanded_name,
                r"\def\n{\x}\expandafter\def\n{X}\x",
                "X"
            ),
        ),
        failure_tests(
            (expandafter_end_of_input, r"\expandafter", PrematureEndOfInput),
            (expandafter_one_token, r"\expandafter a", PrematureEndOfInput),
            (expandafter_undefined, r"\expandafter a\undefined", UndefinedMacro),
        ),
    ];
}
