//! The `\par` command

use texpand::prelude::*;

pub const PAR_DOC: &str = "End a paragraph; expands to a blank line";

/// Get the `\par` command.
///
/// The lexer produces `\par` for every blank line in the input.
pub fn get_par() -> BuiltIn {
    BuiltIn::new(Par).with_doc(PAR_DOC)
}

struct Par;

impl Primitive for Par {
    fn call(&self, _: Token, _: &mut VM) -> Result<Vec<Token>> {
        Ok(vec![Token::Other('\n'), Token::Other('\n')])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        HashMap::from([("par", get_par())])
    }

    test_suite![
        expansion_output_tests(
            (explicit_par, r"a\par b", "a\n\nb"),
            (blank_line, "a\n\nb", "a \n\nb"),
            (blank_lines_at_start, "\n\na", "\n\n\n\na"),
            (comment_then_blank_line, "a%\n\nb", "a b"),
            (comment_on_own_line_then_blank_line, "a\n%\n\nb", "a \n\nb"),
            (comment_then_indented_line, "a%c\n   b", "a b"),
            (spaces_collapse, "a   b\n   c", "a b c"),
        ),
    ];
}
