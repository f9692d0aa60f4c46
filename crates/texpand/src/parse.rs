//! Parsing of the small syntactic elements primitives take as arguments.
//!
//! Everything here reads raw tokens: nothing is expanded.

use crate::error::{self, Kind};
use crate::token::Token;
use crate::vm::VM;

/// Largest number of digits in a number.
pub const MAX_DIGITS: usize = 9;

/// Consumes space tokens.
pub fn skip_spaces(vm: &mut VM) -> error::Result<()> {
    while let Some(token) = vm.read_token()? {
        if token != Token::Other(' ') {
            vm.unread_token(token);
            break;
        }
    }
    Ok(())
}

/// Consumes optional spaces, an optional `=`, and further optional spaces.
pub fn read_optional_equals(vm: &mut VM) -> error::Result<()> {
    skip_spaces(vm)?;
    match vm.read_token()? {
        Some(Token::Other('=')) => skip_spaces(vm),
        Some(token) => {
            vm.unread_token(token);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Reads a non-negative decimal number, after optional leading spaces.
///
/// The token that ends the number is left in the input.
/// `what` describes the number in error messages, for example "a stream number".
pub fn read_number(vm: &mut VM, what: &str) -> error::Result<u32> {
    skip_spaces(vm)?;
    let mut n = 0_u32;
    let mut digits = 0_usize;
    while let Some(token) = vm.read_token()? {
        let digit = match token {
            Token::Other(c) => c.to_digit(10),
            _ => None,
        };
        match digit {
            Some(d) if digits < MAX_DIGITS => {
                n = n * 10 + d;
                digits += 1;
            }
            _ => {
                vm.unread_token(token);
                break;
            }
        }
    }
    if digits == 0 {
        let found = match vm.read_token()? {
            None => "the end of the input".to_string(),
            Some(token) => {
                vm.unread_token(token);
                format!["`{}`", token.to_string(vm.cs_name_interner())]
            }
        };
        return Err(vm.error(Kind::UnexpectedToken(format![
            "expected {what}, found {found}"
        ])));
    }
    Ok(n)
}

/// Reads a file name, after optional leading spaces.
///
/// The name is made of letter and other characters.
/// A space ends the name and is consumed; any other token ends the name and is left in the input.
pub fn read_file_name(vm: &mut VM) -> error::Result<String> {
    skip_spaces(vm)?;
    let mut name = String::new();
    while let Some(token) = vm.read_token()? {
        match token {
            Token::Other(' ') => break,
            Token::Letter(c) | Token::Other(c) => name.push(c),
            _ => {
                vm.unread_token(token);
                break;
            }
        }
    }
    if name.is_empty() {
        return Err(vm.error(Kind::UnexpectedToken("expected a file name".into())));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn new_vm(input: &str) -> VM {
        let mut vm = VM::new(HashMap::new());
        vm.push_source("input.tex", input).unwrap();
        vm
    }

    #[test]
    fn number() {
        let mut vm = new_vm("  42x");
        assert_eq!(read_number(&mut vm, "a number").unwrap(), 42);
        assert_eq!(vm.read_token().unwrap(), Some(Token::Letter('x')));
    }

    #[test]
    fn number_is_bounded() {
        let mut vm = new_vm("12345678901");
        assert_eq!(read_number(&mut vm, "a number").unwrap(), 123456789);
        assert_eq!(vm.read_token().unwrap(), Some(Token::Other('0')));
    }

    #[test]
    fn missing_number() {
        let mut vm = new_vm("x");
        let err = read_number(&mut vm, "a stream number").unwrap_err();
        assert_eq!(
            err.kind,
            Kind::UnexpectedToken("expected a stream number, found `x`".into())
        );
    }

    #[test]
    fn optional_equals() {
        for input in ["= 5", "5", " =5"] {
            let mut vm = new_vm(input);
            read_optional_equals(&mut vm).unwrap();
            assert_eq!(read_number(&mut vm, "a number").unwrap(), 5);
        }
    }

    #[test]
    fn file_name_ends_at_space() {
        let mut vm = new_vm(" dir/chapter.tex rest");
        assert_eq!(read_file_name(&mut vm).unwrap(), "dir/chapter.tex");
        assert_eq!(vm.read_token().unwrap(), Some(Token::Letter('r')));
    }

    #[test]
    fn file_name_ends_at_group() {
        let mut vm = new_vm("out{");
        assert_eq!(read_file_name(&mut vm).unwrap(), "out");
        assert_eq!(vm.read_token().unwrap(), Some(Token::BeginGroup('{')));
    }

    #[test]
    fn empty_file_name() {
        let mut vm = new_vm("{");
        let err = read_file_name(&mut vm).unwrap_err();
        assert!(matches!(err.kind, Kind::UnexpectedToken(_)));
    }
}
