//! The `\uppercase` and `\lowercase` commands

use texpand::error::Kind;
use texpand::prelude::*;

pub const UPPERCASE_DOC: &str = "Convert the letters of a group to upper case";
pub const LOWERCASE_DOC: &str = "Convert the letters of a group to lower case";

/// Get the `\uppercase` command.
pub fn get_uppercase() -> BuiltIn {
    BuiltIn::new(ChangeCase(char::to_ascii_uppercase)).with_doc(UPPERCASE_DOC)
}

/// Get the `\lowercase` command.
pub fn get_lowercase() -> BuiltIn {
    BuiltIn::new(ChangeCase(char::to_ascii_lowercase)).with_doc(LOWERCASE_DOC)
}

struct ChangeCase(fn(&char) -> char);

impl Primitive for ChangeCase {
    fn call(&self, token: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let mut block = match vm.read_block()? {
            Some(block) => block,
            None => {
                let name = token.to_string(vm.cs_name_interner());
                return Err(match vm.read_token()? {
                    None => vm.error(Kind::PrematureEndOfInput(format![
                        "reading the argument of `{name}`"
                    ])),
                    Some(found) => {
                        let found = found.to_string(vm.cs_name_interner());
                        vm.error(Kind::UnexpectedToken(format![
                            "expected `{{` after `{name}`, found `{found}`"
                        ]))
                    }
                });
            }
        };
        // Only letters change; control sequence names are left alone.
        for t in block.iter_mut() {
            if let Token::Letter(c) = t {
                *c = (self.0)(c);
            }
        }
        Ok(block)
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
            ("lowercase", get_lowercase()),
            ("uppercase", get_uppercase()),
        ])
    }

    test_suite![
        expansion_equality_tests(
            (uppercase_letters, r"\uppercase{abC1}", "ABC1"),
            (lowercase_letters, r"\lowercase{AbC1}", "abc1"),
            (uppercase_nested_groups, r"\uppercase{a{b}c}", "ABC"),
            (uppercase_does_not_expand, r"\def\a{x}\uppercase{\a}", "x"),
            (uppercase_leaves_non_ascii, r"\uppercase{é}", "é"),
        ),
        failure_tests(
            (uppercase_no_group, r"\uppercase a", UnexpectedToken),
            (uppercase_end_of_input, r"\uppercase", PrematureEndOfInput),
            (uppercase_unterminated_group, r"\uppercase{a", PrematureEndOfInput),
        ),
    ];
}
