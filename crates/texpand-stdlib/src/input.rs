//! The `\input` command

use std::path;
use texpand::parse;
use texpand::prelude::*;

pub const INPUT_DOC: &str = "Insert the contents of a file into the input";

/// Extension added to file names that don't have one.
pub const DEFAULT_EXTENSION: &str = "tex";

/// Get the `\input` command.
pub fn get_input() -> BuiltIn {
    BuiltIn::new(Input).with_doc(INPUT_DOC)
}

struct Input;

impl Primitive for Input {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let file_name = parse::read_file_name(vm)?;
        let file_path = resolve(&file_name, DEFAULT_EXTENSION);
        tracing::debug!(path = %file_path.display(), "reading input file");
        vm.push_file(&file_path)?;
        Ok(Vec::new())
    }
}

/// Adds the default extension to a file name without one.
pub fn resolve(file_name: &str, default_extension: &str) -> path::PathBuf {
    let mut file_path = path::PathBuf::from(file_name);
    if file_path.extension().is_none() {
        file_path.set_extension(default_extension);
    }
    file_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def;
    use std::collections::HashMap;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        HashMap::from([("def", def::get_def()), ("input", get_input())])
    }

    #[test]
    fn resolve_adds_extension() {
        assert_eq!(resolve("a", "tex"), path::PathBuf::from("a.tex"));
        assert_eq!(resolve("a.sty", "tex"), path::PathBuf::from("a.sty"));
        assert_eq!(resolve("dir/a", "tex"), path::PathBuf::from("dir/a.tex"));
    }

    test_suite![
        options(
            TestOption::BuiltInCommands(built_in_commands),
            TestOption::Files(vec![
                ("file1.tex", "content1\n"),
                ("file2.tex", "content2%\n"),
                ("file3.tex", r"\input nested/file4"),
                ("nested/file4.tex", "content4"),
                ("macros.tex", r"\def\hello{Hola Mundo}"),
                ("loop.tex", r"\input loop "),
            ]),
        ),
        expansion_equality_tests(
            (basic_case, r"\input file1 hello", "content1 hello"),
            (input_together, r"\input file2 hello", "content2hello"),
            (basic_case_with_ext, r"\input file1.tex", "content1 "),
            (nested, r"\input file3", "content4"),
            (definitions_survive_the_file, r"\input macros \hello", "Hola Mundo"),
            (
                input_in_macro,
                r"\def\chapter#1{\input #1 }\chapter{file1}",
                "content1 "
            ),
        ),
        failure_tests(
            (missing_file, r"\input missing", IoFailure),
            (missing_file_name, r"\input", UnexpectedToken),
            (self_inclusion, r"\input loop", InputStackOverflow),
        ),
    ];
}
