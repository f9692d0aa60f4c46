//! Primitives for creating user-defined macros (`\def` and friends).

use std::rc;
use texpand::error::Kind;
use texpand::prelude::*;
use texpand::texmacro::{Macro, Parameter};

pub const DEF_DOC: &str = "Define a custom macro";
pub const EDEF_DOC: &str = "Define a custom macro, fully expanding the replacement text first";
pub const GDEF_DOC: &str = "Define a custom macro globally; equivalent to \\global\\def";
pub const XDEF_DOC: &str = "Define a custom macro globally, fully expanding the replacement text first; equivalent to \\global\\edef";

/// Get the `\def` command.
pub fn get_def() -> BuiltIn {
    BuiltIn::new(Def {
        global: false,
        expand: false,
    })
    .with_doc(DEF_DOC)
}

/// Get the `\edef` command.
pub fn get_edef() -> BuiltIn {
    BuiltIn::new(Def {
        global: false,
        expand: true,
    })
    .with_doc(EDEF_DOC)
}

/// Get the `\gdef` command.
pub fn get_gdef() -> BuiltIn {
    BuiltIn::new(Def {
        global: true,
        expand: false,
    })
    .with_doc(GDEF_DOC)
}

/// Get the `\xdef` command.
pub fn get_xdef() -> BuiltIn {
    BuiltIn::new(Def {
        global: true,
        expand: true,
    })
    .with_doc(XDEF_DOC)
}

struct Def {
    global: bool,
    expand: bool,
}

impl Primitive for Def {
    fn call(&self, def_token: Token, vm: &mut VM) -> Result<Vec<Token>> {
        // The flag is taken now so that definitions made while an \edef body is expanded
        // do not consume it.
        let global = vm.take_global() || self.global;
        let name = parse_target(def_token, vm)?;
        let (prefix, parameters) = parse_prefix_and_parameters(vm)?;
        let body = if self.expand {
            vm.read_and_expand_block()?
        } else {
            vm.read_block()?
        };
        // The parameter text only ends at a `{`, which was left in the input.
        let body = body.unwrap_or_default();
        let user_defined_macro = Macro::new(prefix, parameters, body);
        if global {
            vm.set_global();
        }
        vm.define(name, Command::Macro(rc::Rc::new(user_defined_macro)));
        Ok(vec![])
    }
}

fn parse_target(def_token: Token, vm: &mut VM) -> Result<texpand::token::CsName> {
    let def = def_token.to_string(vm.cs_name_interner());
    match vm.read_token()? {
        None => Err(vm.error(Kind::PrematureEndOfInput(format![
            "reading the name of the macro defined by `{def}`"
        ]))),
        Some(Token::ControlSequence(cs_name)) => Ok(cs_name),
        Some(token) => {
            let found = token.to_string(vm.cs_name_interner());
            Err(vm
                .error(Kind::UnexpectedToken(format![
                    "expected a control sequence after `{def}`, found `{found}`"
                ]))
                .with_note("the first argument of a macro definition is the name of the macro"))
        }
    }
}

enum RawParameter {
    Undelimited,
    Delimited(Vec<Token>),
}

impl RawParameter {
    fn push(&mut self, t: Token) {
        match self {
            RawParameter::Undelimited => {
                *self = RawParameter::Delimited(vec![t]);
            }
            RawParameter::Delimited(vec) => {
                vec.push(t);
            }
        }
    }
}

/// Reads the parameter text of a definition, up to but excluding the `{` that starts the body.
fn parse_prefix_and_parameters(vm: &mut VM) -> Result<(Vec<Token>, Vec<Parameter>)> {
    let mut prefix = Vec::new();
    let mut parameters: Vec<RawParameter> = Vec::new();
    loop {
        let token = match vm.read_token()? {
            None => {
                return Err(vm
                    .error(Kind::PrematureEndOfInput(
                        "reading the parameter text of a macro".into(),
                    ))
                    .with_note("the parameter text of a macro must end with a `{`"))
            }
            Some(token) => token,
        };
        match token {
            Token::BeginGroup(_) => {
                vm.unread_token(token);
                break;
            }
            Token::EndGroup(_) => {
                return Err(vm.error(Kind::UnbalancedGroup(
                    "unexpected `}` in the parameter text of a macro".into(),
                )));
            }
            Token::Parameter(n) => {
                if n as usize != parameters.len() + 1 {
                    return Err(vm
                        .error(Kind::MalformedParameter(format![
                            "unexpected parameter number {n}"
                        ]))
                        .with_note(format![
                            "this macro has {} parameter(s) so far, so parameter number #{} was expected",
                            parameters.len(),
                            parameters.len() + 1
                        ]));
                }
                parameters.push(RawParameter::Undelimited);
            }
            _ => match parameters.last_mut() {
                None => prefix.push(token),
                Some(parameter) => parameter.push(token),
            },
        }
    }
    let parameters = parameters
        .into_iter()
        .map(|p| match p {
            RawParameter::Undelimited => Parameter::Undelimited,
            RawParameter::Delimited(vec) => Parameter::Delimited(vec),
        })
        .collect();
    Ok((prefix, parameters))
}
