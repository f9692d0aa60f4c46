//! Conditional primitives (`\iftrue`, `\iffalse`, `\ifdefined`, `\else` and `\fi`)
//!
//! A conditional is resolved in one go when it is expanded.
//! The taken branch is collected without being expanded,
//!     the other branch is skipped,
//!     and the taken branch is returned as the expansion of the conditional.
//! The `\else` and `\fi` that end the taken branch are therefore consumed before the branch
//!     itself is expanded, and meeting either primitive during expansion is an error.
//!
//! While collecting or skipping,
//!     control sequences are recognized by the tag of the command they are bound to.
//! Every `\if...` primitive carries the same tag so that nested conditionals are stepped over
//!     with their own `\else` and `\fi`.

use texpand::command::StaticTag;
use texpand::error::Kind;
use texpand::prelude::*;

pub const ELSE_DOC: &str = "Start the else branch of a conditional";
pub const FI_DOC: &str = "End a conditional";
pub const IFTRUE_DOC: &str = "Evaluate the true branch";
pub const IFFALSE_DOC: &str = "Evaluate the false branch";
pub const IFDEFINED_DOC: &str = "Check whether a control sequence is defined";

static IF_TAG: StaticTag = StaticTag::new();
static ELSE_TAG: StaticTag = StaticTag::new();
static FI_TAG: StaticTag = StaticTag::new();

/// Get the `\iftrue` command.
pub fn get_iftrue() -> BuiltIn {
    BuiltIn::new(If(true))
        .with_tag(IF_TAG.get())
        .with_doc(IFTRUE_DOC)
}

/// Get the `\iffalse` command.
pub fn get_iffalse() -> BuiltIn {
    BuiltIn::new(If(false))
        .with_tag(IF_TAG.get())
        .with_doc(IFFALSE_DOC)
}

/// Get the `\ifdefined` command.
pub fn get_ifdefined() -> BuiltIn {
    BuiltIn::new(IfDefined)
        .with_tag(IF_TAG.get())
        .with_doc(IFDEFINED_DOC)
}

/// Get the `\else` command.
pub fn get_else() -> BuiltIn {
    BuiltIn::new(Extra("else"))
        .with_tag(ELSE_TAG.get())
        .with_doc(ELSE_DOC)
}

/// Get the `\fi` command.
pub fn get_fi() -> BuiltIn {
    BuiltIn::new(Extra("fi"))
        .with_tag(FI_TAG.get())
        .with_doc(FI_DOC)
}

struct If(bool);

impl Primitive for If {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        if self.0 {
            let (branch, end) = scan_branch(vm, true)?;
            if end == BranchEnd::Else {
                let (_, end) = scan_branch(vm, false)?;
                if end == BranchEnd::Else {
                    return Err(extra_else(vm));
                }
            }
            Ok(branch)
        } else {
            let (_, end) = scan_branch(vm, false)?;
            match end {
                BranchEnd::Fi => Ok(vec![]),
                BranchEnd::Else => {
                    let (branch, end) = scan_branch(vm, true)?;
                    if end == BranchEnd::Else {
                        return Err(extra_else(vm));
                    }
                    Ok(branch)
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum BranchEnd {
    Else,
    Fi,
}

/// Reads raw tokens up to the `\else` or `\fi` that belongs to the current conditional.
///
/// The tokens are returned if `collect` is true and dropped otherwise.
/// The final `\else` or `\fi` is consumed and not returned.
fn scan_branch(vm: &mut VM, collect: bool) -> Result<(Vec<Token>, BranchEnd)> {
    let mut branch = vec![];
    let mut depth = 0_usize;
    loop {
        let token = match vm.read_token()? {
            None => {
                let doing = if collect {
                    "reading the branch of a conditional"
                } else {
                    "skipping the branch of a conditional"
                };
                return Err(vm
                    .error(Kind::PrematureEndOfInput(doing.into()))
                    .with_note("every conditional must be terminated by a `\\fi`"));
            }
            Some(token) => token,
        };
        let tag = match token {
            Token::ControlSequence(cs_name) => vm.lookup(cs_name).and_then(Command::tag),
            _ => None,
        };
        if tag == Some(IF_TAG.get()) {
            depth += 1;
        } else if tag == Some(FI_TAG.get()) {
            if depth == 0 {
                return Ok((branch, BranchEnd::Fi));
            }
            depth -= 1;
        } else if tag == Some(ELSE_TAG.get()) && depth == 0 {
            return Ok((branch, BranchEnd::Else));
        }
        if collect {
            branch.push(token);
        }
    }
}

fn extra_else(vm: &VM) -> Box<texpand::error::Error> {
    vm.error(Kind::UnexpectedToken("extra `\\else`".into()))
        .with_note("a conditional has at most one `\\else` branch")
}

struct IfDefined;

impl Primitive for IfDefined {
    fn call(&self, token: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let defined = match vm.read_token()? {
            None => {
                return Err(vm.error(Kind::PrematureEndOfInput(
                    "reading the argument of `\\ifdefined`".into(),
                )))
            }
            Some(Token::ControlSequence(cs_name)) => vm.lookup(cs_name).is_some(),
            Some(other) => {
                let found = other.to_string(vm.cs_name_interner());
                return Err(vm
                    .error(Kind::UnexpectedToken(format![
                        "expected a control sequence after `{}`, found `{found}`",
                        token.to_string(vm.cs_name_interner())
                    ])));
            }
        };
        let name = if defined { "iftrue" } else { "iffalse" };
        let cs_name = vm.cs_name_interner_mut().get_or_intern(name);
        Ok(vec![Token::ControlSequence(cs_name)])
    }
}

/// `\else` and `\fi` reached outside of the scanning done by a conditional.
struct Extra(&'static str);

impl Primitive for Extra {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        Err(vm
            .error(Kind::UnexpectedToken(format!["extra `\\{}`", self.0]))
            .with_note("no conditional is waiting for this token"))
    }
}
