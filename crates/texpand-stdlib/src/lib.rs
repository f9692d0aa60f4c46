//! # The Texpand standard library
//!
//! This crate contains implementations of TeX primitives for Texpand.
//! Each module provides one or a few related primitives through `get_<name>` functions,
//!     and [built_ins] returns all of them keyed by the names they are usually bound to.

use std::collections::HashMap;
use texpand::command::BuiltIn;

pub mod case;
pub mod catcode;
pub mod conditional;
pub mod def;
pub mod expansion;
pub mod input;
pub mod io;
pub mod par;
pub mod prefix;

/// Returns all of the primitives in the standard library.
pub fn built_ins() -> HashMap<&'static str, BuiltIn> {
    let streams = io::Streams::new_shared();
    HashMap::from([
        ("catcode", catcode::get_catcode()),
        ("def", def::get_def()),
        ("edef", def::get_edef()),
        ("else", conditional::get_else()),
        ("expandafter", expansion::get_expandafter()),
        ("fi", conditional::get_fi()),
        ("gdef", def::get_gdef()),
        ("global", prefix::get_global()),
        ("ifdefined", conditional::get_ifdefined()),
        ("iffalse", conditional::get_iffalse()),
        ("iftrue", conditional::get_iftrue()),
        ("input", input::get_input()),
        ("lowercase", case::get_lowercase()),
        ("openout", io::get_openout(&streams)),
        ("par", par::get_par()),
        ("uppercase", case::get_uppercase()),
        ("write", io::get_write(&streams)),
        ("xdef", def::get_xdef()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        built_ins()
    }

    #[test]
    fn every_built_in_is_documented() {
        for (name, built_in) in built_ins() {
            assert!(built_in.doc().is_some(), "`\\{name}` has no documentation");
        }
    }

    // Deep expansion recurses on the host stack, so these run with the stack size of a main thread.
    fn run_with_large_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(8 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    fn nested_edefs(depth: usize) -> String {
        format!("{}{}\\a", r"\edef\a{x".repeat(depth), "}".repeat(depth))
    }

    #[test]
    fn edef_calling_itself() {
        run_with_large_stack(|| {
            run_failure_test(
                r"\def\a{\edef\b{\a}}\a",
                "MaxExpansionDepthExceeded",
                &[TestOption::BuiltInCommands(built_in_commands)],
            );
        });
    }

    #[test]
    fn long_expandafter_chain() {
        run_with_large_stack(|| {
            let input = format!("{}ab", r"\expandafter".repeat(5000));
            run_failure_test(
                &input,
                "MaxExpansionDepthExceeded",
                &[TestOption::BuiltInCommands(built_in_commands)],
            );
        });
    }

    #[test]
    fn deeply_nested_edefs() {
        run_with_large_stack(|| {
            run_failure_test(
                &nested_edefs(50000),
                "MaxExpansionDepthExceeded",
                &[TestOption::BuiltInCommands(built_in_commands)],
            );
        });
    }

    #[test]
    fn moderately_nested_edefs() {
        run_with_large_stack(|| {
            run_expansion_output_test(
                &nested_edefs(100),
                "x",
                &[TestOption::BuiltInCommands(built_in_commands)],
            );
        });
    }

    #[test]
    fn nested_edefs_respect_configured_limit() {
        run_failure_test(
            &nested_edefs(20),
            "MaxExpansionDepthExceeded",
            &[
                TestOption::BuiltInCommands(built_in_commands),
                TestOption::VMOptions(texpand::vm::Options {
                    max_expansion_depth: 30,
                    ..Default::default()
                }),
            ],
        );
    }

    test_suite![
        expansion_equality_tests(
            (
                ifdefined_selects_branch,
                r"\def\a{x}\ifdefined\a\uppercase{y}\else n\fi",
                "Y"
            ),
            (uppercase_does_not_expand, r"\def\x{hello}\uppercase{\x}", "hello"),
            (
                expandafter_before_uppercase,
                r"\def\x{hello}\expandafter\uppercase\expandafter{\x}",
                "HELLO"
            ),
            (
                macro_with_conditional_default,
                r"\def\greet#1{\ifdefined#1#1\else world\fi}\def\name{you}\greet\name,\greet\nobody",
                "you,world"
            ),
            (
                catcode_makes_at_a_letter,
                r"\catcode64=11\def\my@macro{ok}\my@macro",
                "ok"
            ),
            (
                edef_with_conditional,
                r"\def\a{1}\edef\b{\ifdefined\a yes\else no\fi}\def\a{}\b",
                "yes"
            ),
        ),
        failure_tests(
            (undefined_in_taken_branch, r"\iftrue\nope\fi", UndefinedMacro),
            (extra_fi_after_macro, r"\def\a{\fi}\a", UnexpectedToken),
        ),
    ];
}
