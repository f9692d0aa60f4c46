/*!
Texpand unit testing library

This is a crate for writing unit tests for code that uses Texpand.
It is used extensively in the Texpand standard library,
    so the unit tests there are good examples of what this crate can do.

## Test types

### Expansion equality tests

Run using [`run_expansion_equality_test`].

These tests verify that two different snippets expand to the same output.
For example, an expansion equality test can verify that
```tex
\def\HelloWorld{Hola Mundo}\HelloWorld - \HelloWorld
```
and
```tex
Hola Mundo - Hola Mundo
```
produce the same output.
The second input is usually a constant.

### Expansion output tests

Run using [`run_expansion_output_test`].

These tests verify that a snippet expands to an exact string.
They are useful when the expected output contains characters that the lexer would
    treat specially, like newlines.

### Failure tests

Run using [`run_failure_test`].

These tests verify that a snippet fails to expand with an error of a specific kind.

## The test suite macro

The preferred way to write a suite of unit tests is to use the [`test_suite`] macro.
See the macro's documentation for instructions on using it.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use texpand::command::BuiltIn;
use texpand::error;
use texpand::vm::{self, VM};

/// A file system that lives in memory.
///
/// Clones share the same files,
///     so a test can keep a handle and inspect what the VM wrote.
#[derive(Default, Clone, Debug)]
pub struct InMemoryFileSystem {
    files: Rc<RefCell<HashMap<PathBuf, String>>>,
}

impl InMemoryFileSystem {
    pub fn add<P: AsRef<Path>>(&self, path: P, contents: &str) {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), contents.to_string());
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl vm::FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        match self.files.borrow().get(path) {
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "file not found",
            )),
            Some(contents) => Ok(contents.clone()),
        }
    }

    fn write_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        self.files.borrow_mut().insert(
            path.to_path_buf(),
            String::from_utf8_lossy(contents).into_owned(),
        );
        Ok(())
    }

    fn append_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        match self.files.borrow_mut().get_mut(path) {
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "file not found",
            )),
            Some(file) => {
                file.push_str(&String::from_utf8_lossy(contents));
                Ok(())
            }
        }
    }
}

/// Option passed to a test runner.
pub enum TestOption<'a> {
    /// The built-in commands are the result of invoking the provided static function.
    ///
    /// Overrides previous `BuiltInCommands` or `BuiltInCommandsDyn` options.
    BuiltInCommands(fn() -> HashMap<&'static str, BuiltIn>),

    /// The built-in commands are the result of invoking the provided closure.
    ///
    /// Overrides previous `BuiltInCommands` or `BuiltInCommandsDyn` options.
    BuiltInCommandsDyn(Box<dyn Fn() -> HashMap<&'static str, BuiltIn> + 'a>),

    /// The provided closure is invoked after the VM is created and before execution starts.
    ///
    /// Overrides previous `CustomVMInitializationDyn` options.
    CustomVMInitializationDyn(Box<dyn Fn(&mut VM) + 'a>),

    /// Options of the VM.
    VMOptions(vm::Options),

    /// Files placed in an in-memory file system before execution starts.
    ///
    /// Without this option the VM uses the real file system.
    Files(Vec<(&'a str, &'a str)>),
}

struct ResolvedOptions<'a> {
    built_in_commands: &'a dyn Fn() -> HashMap<&'static str, BuiltIn>,
    custom_vm_initialization: &'a dyn Fn(&mut VM),
    vm_options: vm::Options,
    files: Option<&'a [(&'a str, &'a str)]>,
}

impl<'a> ResolvedOptions<'a> {
    fn new(options: &'a [TestOption<'a>]) -> Self {
        let mut resolved = Self {
            built_in_commands: &HashMap::new,
            custom_vm_initialization: &|_| {},
            vm_options: Default::default(),
            files: None,
        };
        for option in options {
            match option {
                TestOption::BuiltInCommands(f) => resolved.built_in_commands = f,
                TestOption::BuiltInCommandsDyn(f) => resolved.built_in_commands = f,
                TestOption::CustomVMInitializationDyn(f) => resolved.custom_vm_initialization = f,
                TestOption::VMOptions(o) => resolved.vm_options = o.clone(),
                TestOption::Files(files) => resolved.files = Some(files.as_slice()),
            }
        }
        resolved
    }
}

fn initialize_vm(options: &ResolvedOptions) -> VM {
    let mut vm = VM::new_with_options((options.built_in_commands)(), options.vm_options.clone());
    if let Some(files) = options.files {
        let file_system = InMemoryFileSystem::default();
        for (path, contents) in files {
            file_system.add(path, contents);
        }
        vm.file_system = Box::new(file_system);
    }
    (options.custom_vm_initialization)(&mut vm);
    vm
}

fn execute_source_code(vm: &mut VM, source: &str) -> error::Result<String> {
    vm.push_source("testing.tex", source)?;
    vm.read_to_string()
}

fn expand(source: &str, options: &ResolvedOptions) -> String {
    let mut vm = initialize_vm(options);
    match execute_source_code(&mut vm, source) {
        Ok(output) => output,
        Err(err) => {
            println!("{err}");
            panic!("expansion of {source:?} failed: {}", err.kind);
        }
    }
}

/// Run an expansion equality test.
///
/// The test passes if the two provided input strings expand to the same output.
pub fn run_expansion_equality_test(lhs: &str, rhs: &str, options: &[TestOption]) {
    let options = ResolvedOptions::new(options);
    let output_1 = expand(lhs, &options);
    let output_2 = expand(rhs, &options);
    similar_asserts::assert_eq!(lhs: output_1, rhs: output_2);
}

/// Run an expansion output test.
///
/// The test passes if the input expands to exactly the expected string.
pub fn run_expansion_output_test(input: &str, expected: &str, options: &[TestOption]) {
    let options = ResolvedOptions::new(options);
    let output = expand(input, &options);
    similar_asserts::assert_eq!(got: output.as_str(), want: expected);
}

/// Run a failure test.
///
/// The test passes if expansion of the provided input fails with an error of the given kind.
/// The kind is given by its name, see [texpand::error::Kind::name].
pub fn run_failure_test(input: &str, expected_kind: &str, options: &[TestOption]) {
    let options = ResolvedOptions::new(options);
    let mut vm = initialize_vm(&options);
    match execute_source_code(&mut vm, input) {
        Ok(output) => {
            println!("Expansion succeeded:");
            println!("{output}");
            panic!("Expansion failure test did not pass: expansion successful");
        }
        Err(err) => {
            println!("{err}");
            assert_eq!(
                err.kind.name(),
                expected_kind,
                "expansion failed with the wrong kind of error"
            );
        }
    }
}

/// Macro to generate a suite of unit tests
///
/// The general use of this macros looks like this:
/// ```
/// # use texpand_testing::*;
/// # use std::collections::HashMap;
/// # fn built_in_commands() -> HashMap<&'static str, texpand::command::BuiltIn> {
/// #     HashMap::new()
/// # }
/// test_suite![
///     options(TestOption::BuiltInCommands(built_in_commands)),
///     expansion_equality_tests(
///         (case_1, "a{b}", "ab"),
///     ),
///     expansion_output_tests(
///         (case_2, "a  b", "a b"),
///     ),
///     failure_tests(
///         (case_3, "\\undefined", UndefinedMacro),
///     ),
/// ];
/// ```
///
/// The arguments to the macro are:
///
/// - `options(option_1, option_2, ..., option_n)`: options to pass to the test runner.
///     This is a list of values of type [TestOption].
///     The options can be omitted, in which case they default to
///     `options(TestOption::BuiltInCommands(built_in_commands))`,
///     where `built_in_commands` is a function in the current scope.
///
/// - `expansion_equality_tests(cases...)`: each case is of the form (case name, left hand side, right hand side).
///     The data here is fed into the [run_expansion_equality_test] test runner.
///
/// - `expansion_output_tests(cases...)`: each case is of the form (case name, input, expected output).
///     The data here is fed into the [run_expansion_output_test] test runner.
///
/// - `failure_tests(cases...)`: each case is of the form (case name, input, error kind).
///     The error kind is the name of a variant of [texpand::error::Kind].
///     The data here is fed into the [run_failure_test] test runner.
///
/// Only one `options()` argument may be provided, and if provided it must be in the first position.
/// Zero or more of the other arguments may be provided, and in any order.
#[macro_export]
macro_rules! test_suite {
    ( @options $options: tt, expansion_equality_tests ( $( ($name: ident, $lhs: expr, $rhs: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let lhs = $lhs;
                let rhs = $rhs;
                let options = vec! $options;
                texpand_testing::run_expansion_equality_test(&lhs, &rhs, &options);
            }
        )*
    );
    ( @options $options: tt, expansion_output_tests ( $( ($name: ident, $input: expr, $output: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let output = $output;
                let options = vec! $options;
                texpand_testing::run_expansion_output_test(&input, &output, &options);
            }
        )*
    );
    ( @options $options: tt, failure_tests ( $( ($name: ident, $input: expr, $kind: ident $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let options = vec! $options;
                texpand_testing::run_failure_test(&input, stringify!($kind), &options);
            }
        )*
    );
    ( @options $options: tt, $test_kind: ident $test_cases: tt $(,)? ) => (
        compile_error!("Invalid keyword: test_suite! only accepts the following keywords: `options`, `expansion_equality_tests`, `expansion_output_tests`, `failure_tests`");
    );
    ( options $options: tt, $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        $(
            texpand_testing::test_suite![@options $options, $test_kind $test_cases,];
        )+
    );
    ( $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        texpand_testing::test_suite![options (texpand_testing::TestOption::BuiltInCommands(built_in_commands)), $( $test_kind $test_cases, )+ ];
    );
}
