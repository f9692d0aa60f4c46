//! User defined macros and the argument binder.

use crate::error;
use crate::error::Kind;
use crate::token;
use crate::token::Token;
use crate::vm::VM;

/// A user defined macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    prefix: Vec<Token>,
    parameters: Vec<Parameter>,
    replacements: Vec<Replacement>,
}

/// A piece of a replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// A list of tokens copied as-is.
    Tokens(Vec<Token>),

    /// The argument bound to a parameter, as a 0-based index.
    ///
    /// The index is always less than the number of parameters of the macro.
    Parameter(usize),
}

/// A macro parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// A parameter followed directly by another parameter or by the end of the pattern.
    Undelimited,
    /// A parameter followed by the given non-empty run of tokens.
    Delimited(Vec<Token>),
}

impl Macro {
    /// Create a new macro.
    ///
    /// `Parameter(i)` tokens in the body with `i` at most the number of parameters become
    ///     references to arguments.
    /// Larger numbers are kept as plain tokens,
    ///     so that a definition made by this macro can declare its own parameters.
    pub fn new(prefix: Vec<Token>, parameters: Vec<Parameter>, body: Vec<Token>) -> Macro {
        let mut replacements = vec![];
        let mut tokens = vec![];
        for token in body {
            match token {
                Token::Parameter(n) if (n as usize) <= parameters.len() => {
                    if !tokens.is_empty() {
                        replacements.push(Replacement::Tokens(std::mem::take(&mut tokens)));
                    }
                    replacements.push(Replacement::Parameter(n as usize - 1));
                }
                _ => tokens.push(token),
            }
        }
        if !tokens.is_empty() {
            replacements.push(Replacement::Tokens(tokens));
        }
        Macro {
            prefix,
            parameters,
            replacements,
        }
    }

    pub fn prefix(&self) -> &[Token] {
        &self.prefix
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// The replacement text as it was written in the definition.
    pub fn body_tokens(&self) -> Vec<Token> {
        let mut result = vec![];
        for replacement in &self.replacements {
            match replacement {
                Replacement::Tokens(tokens) => result.extend(tokens),
                Replacement::Parameter(i) => result.push(Token::Parameter(*i as u8 + 1)),
            }
        }
        result
    }

    /// Reads the arguments of an invocation of this macro from the VM's input.
    ///
    /// `token` is the control sequence that invoked the macro; it is used in error messages.
    pub fn bind(&self, token: Token, vm: &mut VM) -> error::Result<Vec<Vec<Token>>> {
        for expected in &self.prefix {
            let found = next_argument_token(vm, token, 0)?;
            if found != *expected {
                let interner = vm.cs_name_interner();
                let (expected, found) = (expected.to_string(interner), found.to_string(interner));
                let prefix = token::write_tokens(&self.prefix, interner);
                return Err(vm
                    .error(Kind::ArgumentMismatch(cs_name(vm, token)))
                    .with_note(format!["expected `{expected}` but found `{found}`"])
                    .with_note(format!["the macro must be followed by `{prefix}`"]));
            }
        }
        let mut arguments = Vec::with_capacity(self.parameters.len());
        for (i, parameter) in self.parameters.iter().enumerate() {
            let argument = match parameter {
                Parameter::Undelimited => bind_undelimited(vm, token, i + 1)?,
                Parameter::Delimited(delimiter) => bind_delimited(vm, token, i + 1, delimiter)?,
            };
            tracing::trace!(
                parameter = i + 1,
                argument = token::write_tokens(&argument, vm.cs_name_interner()),
                "bound macro argument"
            );
            arguments.push(argument);
        }
        Ok(arguments)
    }

    /// Appends the replacement text to `result`, with each parameter replaced by its argument.
    ///
    /// Returns [None] if an argument referenced by the text is missing.
    pub fn substitute(&self, arguments: &[Vec<Token>], result: &mut Vec<Token>) -> Option<()> {
        for replacement in &self.replacements {
            match replacement {
                Replacement::Tokens(tokens) => result.extend(tokens),
                Replacement::Parameter(i) => result.extend(arguments.get(*i)?),
            }
        }
        Some(())
    }
}

fn cs_name(vm: &VM, token: Token) -> String {
    match token.cs_name() {
        Some(cs_name) => vm
            .cs_name_interner()
            .resolve(cs_name)
            .unwrap_or_default()
            .to_string(),
        None => token.to_string(vm.cs_name_interner()),
    }
}

fn next_argument_token(vm: &mut VM, token: Token, param_num: usize) -> error::Result<Token> {
    let doing = match param_num {
        0 => "matching the prefix of a user-defined macro".to_string(),
        n => format!["reading argument {n} of a user-defined macro"],
    };
    match vm.read_token()? {
        None => Err(vm
            .error(Kind::PrematureEndOfInput(doing))
            .with_note(format!["the macro is `\\{}`", cs_name(vm, token)])),
        Some(Token::Parameter(n)) => Err(vm
            .error(Kind::MalformedParameter(format![
                "parameter `#{n}` used outside of a macro body"
            ]))
            .with_note(format!["this happened while {doing}"])),
        Some(t) => Ok(t),
    }
}

fn bind_undelimited(vm: &mut VM, token: Token, param_num: usize) -> error::Result<Vec<Token>> {
    loop {
        let t = next_argument_token(vm, token, param_num)?;
        match t {
            Token::Other(' ') => continue,
            Token::BeginGroup(_) => {
                let mut argument = vec![];
                finish_balanced_group(vm, token, param_num, &mut argument)?;
                return Ok(argument);
            }
            Token::EndGroup(_) => {
                return Err(vm
                    .error(Kind::UnbalancedGroup(format![
                        "argument {param_num} of `\\{}` starts with a `}}`",
                        cs_name(vm, token)
                    ]))
                    .with_note("an undelimited argument is a single token or a balanced group"))
            }
            t => return Ok(vec![t]),
        }
    }
}

/// Reads tokens up to and excluding the `}` that closes an already opened group.
fn finish_balanced_group(
    vm: &mut VM,
    token: Token,
    param_num: usize,
    result: &mut Vec<Token>,
) -> error::Result<()> {
    let mut depth = 1_usize;
    loop {
        let t = next_argument_token(vm, token, param_num)?;
        match t {
            Token::BeginGroup(_) => depth += 1,
            Token::EndGroup(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
        result.push(t);
    }
}

// Delimiter matching only happens outside of braces.
// While a partial match is in progress, `restart` remembers the first position after the
// start of the match at which the delimiter could start again.
// On a mismatch the tokens before that position belong to the argument and the rest of the
// partial match is read again.
fn bind_delimited(
    vm: &mut VM,
    token: Token,
    param_num: usize,
    delimiter: &[Token],
) -> error::Result<Vec<Token>> {
    let mut argument = vec![];
    let mut matched = 0_usize;
    let mut restart = 0_usize;
    let mut depth = 0_usize;
    loop {
        let t = next_argument_token(vm, token, param_num)?;
        if depth > 0 {
            match t {
                Token::BeginGroup(_) => depth += 1,
                Token::EndGroup(_) => depth -= 1,
                _ => {}
            }
            argument.push(t);
            continue;
        }
        if t == delimiter[matched] {
            if restart == 0 && matched > 0 && t == delimiter[0] {
                restart = matched;
            }
            matched += 1;
            if matched == delimiter.len() {
                break;
            }
            continue;
        }
        if matched > 0 {
            let keep = match restart {
                0 => matched,
                s => s,
            };
            argument.extend(&delimiter[..keep]);
            vm.unread_token(t);
            vm.push_tokens(&delimiter[keep..matched]);
            matched = 0;
            restart = 0;
            continue;
        }
        match t {
            Token::BeginGroup(_) => depth += 1,
            Token::EndGroup(_) => {
                return Err(vm
                    .error(Kind::UnbalancedGroup(format![
                        "argument {param_num} of `\\{}` contains an unmatched `}}`",
                        cs_name(vm, token)
                    ]))
                    .with_note(format![
                        "the argument is delimited by `{}`",
                        token::write_tokens(delimiter, vm.cs_name_interner())
                    ]))
            }
            _ => {}
        }
        argument.push(t);
    }
    if is_single_group(&argument) {
        argument.pop();
        argument.remove(0);
    }
    Ok(argument)
}

/// Whether the list is exactly one balanced group, like `{a{b}c}`.
fn is_single_group(list: &[Token]) -> bool {
    if !matches!(list.first(), Some(Token::BeginGroup(_))) {
        return false;
    }
    let mut depth = 0_usize;
    for (i, t) in list.iter().enumerate() {
        match t {
            Token::BeginGroup(_) => depth += 1,
            Token::EndGroup(_) => {
                depth -= 1;
                if depth == 0 {
                    return i == list.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_body() {
        let m = Macro::new(
            vec![],
            vec![Parameter::Undelimited, Parameter::Undelimited],
            vec![
                Token::Letter('a'),
                Token::Parameter(2),
                Token::Parameter(1),
                Token::Parameter(3),
            ],
        );
        assert_eq!(
            m.replacements(),
            &[
                Replacement::Tokens(vec![Token::Letter('a')]),
                Replacement::Parameter(1),
                Replacement::Parameter(0),
                Replacement::Tokens(vec![Token::Parameter(3)]),
            ]
        );
        assert_eq!(
            m.body_tokens(),
            vec![
                Token::Letter('a'),
                Token::Parameter(2),
                Token::Parameter(1),
                Token::Parameter(3),
            ]
        );
    }

    #[test]
    fn substitute() {
        let m = Macro::new(
            vec![],
            vec![Parameter::Undelimited],
            vec![Token::Other('['), Token::Parameter(1), Token::Other(']')],
        );
        let mut result = vec![];
        let arguments = vec![vec![Token::Letter('x'), Token::Letter('y')]];
        assert_eq!(m.substitute(&arguments, &mut result), Some(()));
        assert_eq!(
            result,
            vec![
                Token::Other('['),
                Token::Letter('x'),
                Token::Letter('y'),
                Token::Other(']')
            ]
        );
        assert_eq!(m.substitute(&[], &mut result), None);
    }

    #[test]
    fn single_group() {
        let b = Token::BeginGroup('{');
        let e = Token::EndGroup('}');
        let x = Token::Letter('x');
        assert!(is_single_group(&[b, x, b, x, e, e]));
        assert!(!is_single_group(&[b, x, e, b, x, e]));
        assert!(!is_single_group(&[x, b, e]));
        assert!(!is_single_group(&[]));
    }
}
