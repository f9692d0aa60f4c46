//! Numbered output streams (`\openout` and `\write`)
//!
//! There are 16 streams, numbered 0 through 15.
//! `\openout` binds a stream to a file, creating or truncating it.
//! `\write` expands a group and appends the result, followed by a newline, to the file of a
//!     stream.
//! The two commands share the table of streams.

use std::cell::RefCell;
use std::path;
use std::rc::Rc;
use texpand::error::Kind;
use texpand::parse;
use texpand::prelude::*;
use texpand::token;

pub const OPENOUT_DOC: &str = "Open a numbered output stream: \\openout<n>=<file name>";
pub const WRITE_DOC: &str = "Expand a group and write it to a numbered output stream: \\write<n>{<tokens>}";

/// Number of output streams.
pub const NUM_STREAMS: usize = 16;

/// The files the output streams are bound to.
#[derive(Debug, Default)]
pub struct Streams {
    files: [Option<path::PathBuf>; NUM_STREAMS],
}

impl Streams {
    /// Creates the table shared by `\openout` and `\write`.
    pub fn new_shared() -> Rc<RefCell<Streams>> {
        Default::default()
    }
}

/// Get the `\openout` command.
pub fn get_openout(streams: &Rc<RefCell<Streams>>) -> BuiltIn {
    BuiltIn::new(OpenOut {
        streams: streams.clone(),
    })
    .with_doc(OPENOUT_DOC)
}

/// Get the `\write` command.
pub fn get_write(streams: &Rc<RefCell<Streams>>) -> BuiltIn {
    BuiltIn::new(Write {
        streams: streams.clone(),
    })
    .with_doc(WRITE_DOC)
}

fn read_stream_number(vm: &mut VM) -> Result<usize> {
    let n = parse::read_number(vm, "a stream number")? as usize;
    if n >= NUM_STREAMS {
        return Err(vm
            .error(Kind::IoFailure(format!["stream number {n} is out of range"]))
            .with_note(format![
                "stream numbers must be between 0 and {} inclusive",
                NUM_STREAMS - 1
            ]));
    }
    Ok(n)
}

struct OpenOut {
    streams: Rc<RefCell<Streams>>,
}

impl Primitive for OpenOut {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let n = read_stream_number(vm)?;
        parse::read_optional_equals(vm)?;
        let file_path = path::PathBuf::from(parse::read_file_name(vm)?);
        if let Err(err) = vm.file_system.write_bytes(&file_path, b"") {
            return Err(vm.error(Kind::IoFailure(format![
                "could not open `{}` for writing: {err}",
                file_path.display()
            ])));
        }
        tracing::debug!(stream = n, path = %file_path.display(), "opened output stream");
        self.streams.borrow_mut().files[n] = Some(file_path);
        Ok(vec![])
    }
}

struct Write {
    streams: Rc<RefCell<Streams>>,
}

impl Primitive for Write {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let n = read_stream_number(vm)?;
        parse::skip_spaces(vm)?;
        let tokens = match vm.read_and_expand_block()? {
            Some(tokens) => tokens,
            None => {
                return Err(match vm.read_token()? {
                    None => vm.error(Kind::PrematureEndOfInput(
                        "reading the text of `\\write`".into(),
                    )),
                    Some(found) => {
                        let found = found.to_string(vm.cs_name_interner());
                        vm.error(Kind::UnexpectedToken(format![
                            "expected `{{` after the stream number of `\\write`, found `{found}`"
                        ]))
                    }
                })
            }
        };
        let file_path = match &self.streams.borrow().files[n] {
            Some(file_path) => file_path.clone(),
            None => {
                return Err(vm
                    .error(Kind::IoFailure(format!["stream {n} is not open"]))
                    .with_note(format!["open the stream first with `\\openout{n}=<file name>`"]))
            }
        };
        let mut text = token::write_tokens(&tokens, vm.cs_name_interner());
        text.push('\n');
        if let Err(err) = vm.file_system.append_bytes(&file_path, text.as_bytes()) {
            return Err(vm.error(Kind::IoFailure(format![
                "could not write to `{}`: {err}",
                file_path.display()
            ])));
        }
        tracing::trace!(stream = n, text = text.trim_end(), "wrote to output stream");
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def;
    use std::collections::HashMap;
    use texpand::vm::FileSystem;
    use texpand_testing::*;

    fn built_in_commands() -> HashMap<&'static str, BuiltIn> {
        let streams = Streams::new_shared();
        HashMap::from([
            ("def", def::get_def()),
            ("openout", get_openout(&streams)),
            ("write", get_write(&streams)),
        ])
    }

    fn run(input: &str) -> (Result<String>, InMemoryFileSystem) {
        let file_system = InMemoryFileSystem::default();
        let mut vm = VM::new(built_in_commands());
        vm.file_system = Box::new(file_system.clone());
        vm.push_source("input.tex", input).unwrap();
        (vm.read_to_string(), file_system)
    }

    #[test]
    fn write_appends_lines() {
        let (output, file_system) = run(r"\openout3=out.txt\write3{hello}\write3{world}");
        assert_eq!(output.unwrap(), "");
        assert_eq!(file_system.get("out.txt"), Some("hello\nworld\n".to_string()));
    }

    #[test]
    fn write_expands_its_argument() {
        let (output, file_system) = run(r"\def\a{x}\openout1 out.txt \write1{\a\a}after");
        assert_eq!(output.unwrap(), "after");
        assert_eq!(file_system.get("out.txt"), Some("xx\n".to_string()));
    }

    #[test]
    fn openout_truncates() {
        let file_system = InMemoryFileSystem::default();
        file_system.add("out.txt", "old contents");
        let mut vm = VM::new(built_in_commands());
        vm.file_system = Box::new(file_system.clone());
        vm.push_source("input.tex", r"\openout0=out.txt").unwrap();
        vm.read_to_string().unwrap();
        assert_eq!(file_system.get("out.txt"), Some("".to_string()));
    }

    #[test]
    fn reopening_a_stream_switches_files() {
        let (output, file_system) =
            run(r"\openout2=a.txt\write2{1}\openout2=b.txt\write2{2}");
        output.unwrap();
        assert_eq!(file_system.get("a.txt"), Some("1\n".to_string()));
        assert_eq!(file_system.get("b.txt"), Some("2\n".to_string()));
    }

    struct ReadOnlyFileSystem;

    impl FileSystem for ReadOnlyFileSystem {
        fn read_to_string(&self, _: &path::Path) -> std::io::Result<String> {
            Ok(String::new())
        }
        fn write_bytes(&self, _: &path::Path, _: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
        fn append_bytes(&self, _: &path::Path, _: &[u8]) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file system",
            ))
        }
    }

    #[test]
    fn write_failure() {
        let mut vm = VM::new(built_in_commands());
        vm.file_system = Box::new(ReadOnlyFileSystem);
        vm.push_source("input.tex", r"\openout2=a.txt\write2{1}")
            .unwrap();
        let err = vm.read_to_string().unwrap_err();
        assert_eq!(
            err.kind,
            Kind::IoFailure("could not write to `a.txt`: read-only file system".into())
        );
    }

    test_suite![
        options(
            TestOption::BuiltInCommands(built_in_commands),
            TestOption::Files(vec![]),
        ),
        expansion_equality_tests(
            (openout_produces_no_output, r"\openout1=a.txt b", "b"),
            (write_produces_no_output, r"\openout1=a.txt\write1{a}b", "b"),
        ),
        failure_tests(
            (write_to_unopened_stream, r"\write2{x}", IoFailure),
            (stream_number_out_of_range, r"\openout16=x.txt", IoFailure),
            (write_stream_number_out_of_range, r"\write99{x}", IoFailure),
            (missing_stream_number, r"\openout=x.txt", UnexpectedToken),
            (write_without_group, r"\openout1=o.txt\write1 x", UnexpectedToken),
            (write_end_of_input, r"\openout1=o.txt\write1", PrematureEndOfInput),
            (openout_without_file_name, r"\openout1={}", UnexpectedToken),
        ),
    ];
}
