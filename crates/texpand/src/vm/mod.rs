//! The Texpand virtual machine (VM)
//!
//! The VM owns every piece of mutable state of a run:
//!     the stack of character sources,
//!     the lexer,
//!     the pending tokens,
//!     the chain of blocks with their category codes and command bindings,
//!     and the stack of macro call frames.
//!
//! Input flows as
//! ```text
//! sources -> lexer -> pending tokens -> expansion -> output characters
//! ```
//! Pending tokens always take priority over the lexer.
//! Expansion never recurses into the main loop:
//!     a command returns its replacement tokens, they are placed at the front of the
//!     pending tokens, and the main loop reads them like any other input.
//! The pending tokens are therefore the work list of the expansion process.
//!
//! Every macro expansion pushes a [CallFrame] and ends with a [Token::StackPop] sentinel.
//! [VM::read_token] consumes the sentinel and pops the frame, so the number of live frames
//!     is the current expansion depth.
//! It is bounded by [Options::max_expansion_depth].

use crate::command::{BuiltIn, Command};
use crate::error::{self, spellcheck, Error, Kind};
use crate::scope;
use crate::token::catcode::CatCode;
use crate::token::lexer;
use crate::token::{CsName, CsNameInterner, Token};
use std::collections::HashMap;
use std::path::Path;

pub mod source;

/// Configuration of a VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of macro expansions that may be in progress at once.
    ///
    /// The same limit applies to expansions nested inside primitives such as `\edef`
    ///     and `\expandafter`.
    pub max_expansion_depth: usize,
    /// Maximum number of input sources that may be open at once.
    pub max_input_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_expansion_depth: 1000,
            max_input_depth: 100,
        }
    }
}

/// File system operations performed by the VM and its primitives.
///
/// These operations are extracted to a trait so that they can be mocked out in unit tests.
pub trait FileSystem {
    /// Read the entire contents of a file into a string.
    ///
    /// This is implemented by [std::fs::read_to_string].
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Create or truncate a file and write the bytes to it.
    ///
    /// This is implemented by [std::fs::write].
    fn write_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;

    /// Append bytes to an existing file.
    fn append_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

/// The file system of the host.
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }

    fn append_bytes(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
        file.write_all(contents)
    }
}

/// Activation record of a macro expansion in progress.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// The control sequence that invoked the macro.
    pub token: Token,
    /// The bound arguments; `arguments[0]` is `#1`.
    pub arguments: Vec<Vec<Token>>,
}

/// The Texpand virtual machine.
pub struct VM {
    sources: source::Stack,
    lexer: lexer::Lexer,
    // Stored in reverse: the next token to read is the last element.
    pending: Vec<Token>,
    blocks: scope::Blocks,
    frames: Vec<CallFrame>,
    // Expansions and expanded blocks currently running on the host stack.
    nesting: usize,
    cs_name_interner: CsNameInterner,
    global: bool,
    options: Options,
    docs: HashMap<CsName, &'static str>,

    /// File system operations.
    ///
    /// By default this is real operations on the file system.
    pub file_system: Box<dyn FileSystem>,
}

impl VM {
    /// Create a new VM with the given built-in commands and default options.
    pub fn new(built_ins: HashMap<&str, BuiltIn>) -> VM {
        VM::new_with_options(built_ins, Options::default())
    }

    pub fn new_with_options(built_ins: HashMap<&str, BuiltIn>, options: Options) -> VM {
        let mut vm = VM {
            sources: Default::default(),
            lexer: Default::default(),
            pending: vec![],
            blocks: Default::default(),
            frames: vec![],
            nesting: 0,
            cs_name_interner: Default::default(),
            global: false,
            options,
            docs: Default::default(),
            file_system: Box::new(RealFileSystem),
        };
        for (name, built_in) in built_ins {
            let cs_name = vm.cs_name_interner.get_or_intern(name);
            if let Some(doc) = built_in.doc() {
                vm.docs.insert(cs_name, doc);
            }
            vm.blocks.define(cs_name, built_in.cmd().clone(), true);
        }
        vm
    }

    /// Adds an in-memory source to the top of the input.
    ///
    /// It is read before whatever remains of the current input.
    pub fn push_source<N: Into<String>, T: Into<String>>(
        &mut self,
        name: N,
        text: T,
    ) -> error::Result<()> {
        self.push(name.into(), text.into())
    }

    /// Reads a file through the [FileSystem] and adds it to the top of the input.
    pub fn push_file(&mut self, path: &Path) -> error::Result<()> {
        let text = match self.file_system.read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                return Err(self.error(Kind::IoFailure(format![
                    "could not read `{}`: {err}",
                    path.display()
                ])))
            }
        };
        self.push(path.display().to_string(), text)
    }

    fn push(&mut self, name: String, text: String) -> error::Result<()> {
        if self.sources.depth() >= self.options.max_input_depth {
            return Err(self
                .error(Kind::InputStackOverflow(self.options.max_input_depth))
                .with_note(format!["while opening `{name}`"]));
        }
        self.sources.push(name, text);
        Ok(())
    }

    pub fn cs_name_interner(&self) -> &CsNameInterner {
        &self.cs_name_interner
    }

    pub fn cs_name_interner_mut(&mut self) -> &mut CsNameInterner {
        &mut self.cs_name_interner
    }

    /// Documentation of the built-in command bound to the name, if any.
    pub fn doc(&self, name: &str) -> Option<&'static str> {
        let cs_name = self.cs_name_interner.get(name)?;
        self.docs.get(&cs_name).copied()
    }

    /// Names of every bound command, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .blocks
            .names()
            .into_iter()
            .filter_map(|cs_name| self.cs_name_interner.resolve(cs_name))
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the next unexpanded token, or [None] at the end of the input.
    ///
    /// Pending tokens are returned before new tokens are lexed.
    /// [Token::StackPop] sentinels are consumed here and never returned.
    pub fn read_token(&mut self) -> error::Result<Option<Token>> {
        loop {
            let token = match self.pending.pop() {
                Some(token) => token,
                None => {
                    let result = self.lexer.next(
                        &mut self.sources,
                        self.blocks.cat_codes(),
                        &mut self.cs_name_interner,
                    );
                    match result {
                        Ok(Some(token)) => token,
                        Ok(None) => return Ok(None),
                        Err(kind) => return Err(self.error(kind)),
                    }
                }
            };
            if token == Token::StackPop {
                if let Some(frame) = self.frames.pop() {
                    tracing::trace!(
                        name = frame.token.to_string(&self.cs_name_interner),
                        depth = self.frames.len(),
                        "finished macro expansion"
                    );
                }
                continue;
            }
            return Ok(Some(token));
        }
    }

    /// Puts a token back at the front of the input.
    pub fn unread_token(&mut self, token: Token) {
        self.pending.push(token);
    }

    /// Puts tokens at the front of the input, to be read in order.
    pub fn push_tokens(&mut self, tokens: &[Token]) {
        self.pending.extend(tokens.iter().rev());
    }

    /// Reads one balanced `{...}` group without expanding it.
    ///
    /// The outer braces are not included in the result.
    /// If the next token is not a `{` it is left in the input and [None] is returned.
    pub fn read_block(&mut self) -> error::Result<Option<Vec<Token>>> {
        if !self.open_block()? {
            return Ok(None);
        }
        let mut depth = 1_usize;
        let mut result = vec![];
        loop {
            let token = self.read_token_or_err("reading a block")?;
            match token {
                Token::BeginGroup(_) => depth += 1,
                Token::EndGroup(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Some(result));
                    }
                }
                _ => {}
            }
            result.push(token);
        }
    }

    /// Reads one balanced `{...}` group, expanding every control sequence in it.
    ///
    /// Nested groups enter and exit their own blocks while they are read.
    /// Parameter tokens are kept as they are.
    /// If the next token is not a `{` it is left in the input and [None] is returned.
    pub fn read_and_expand_block(&mut self) -> error::Result<Option<Vec<Token>>> {
        if !self.open_block()? {
            return Ok(None);
        }
        self.enter_nested("expanding a block")?;
        let result = self.expand_block_contents();
        self.nesting -= 1;
        result.map(Some)
    }

    fn expand_block_contents(&mut self) -> error::Result<Vec<Token>> {
        let mut depth = 1_usize;
        let mut result = vec![];
        loop {
            let token = self.read_token_or_err("expanding a block")?;
            match token {
                Token::ControlSequence(_) => {
                    self.macro_replace(token)?;
                    continue;
                }
                Token::BeginGroup(_) => {
                    depth += 1;
                    self.begin_group();
                }
                Token::EndGroup(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(result);
                    }
                    self.end_group()?;
                }
                _ => {}
            }
            result.push(token);
        }
    }

    // Primitives like `\edef` and `\expandafter` expand their input by calling back into the
    // VM, so these calls nest on the host stack. The nesting shares the expansion depth limit.
    fn enter_nested(&mut self, doing: &str) -> error::Result<()> {
        if self.nesting >= self.options.max_expansion_depth {
            return Err(self
                .error(Kind::MaxExpansionDepthExceeded(
                    self.options.max_expansion_depth,
                ))
                .with_note(format!["the limit was reached while {doing}"])
                .with_note(
                    "expansions nested inside primitive arguments count towards the limit",
                ));
        }
        self.nesting += 1;
        Ok(())
    }

    fn open_block(&mut self) -> error::Result<bool> {
        match self.read_token()? {
            Some(Token::BeginGroup(_)) => Ok(true),
            Some(token) => {
                self.unread_token(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Reads the next token, failing with [Kind::PrematureEndOfInput] at the end of the input.
    pub fn read_token_or_err(&mut self, doing: &str) -> error::Result<Token> {
        match self.read_token()? {
            Some(token) => Ok(token),
            None => Err(self.error(Kind::PrematureEndOfInput(doing.to_string()))),
        }
    }

    /// Expands a token once and returns the result without adding it to the input.
    ///
    /// Returns [None] if the token is not a control sequence.
    pub fn expand_once(&mut self, token: Token) -> error::Result<Option<Vec<Token>>> {
        let cs_name = match token {
            Token::ControlSequence(cs_name) => cs_name,
            _ => return Ok(None),
        };
        let command = match self.blocks.lookup(cs_name) {
            Some(command) => command.clone(),
            None => return Err(self.undefined_error(cs_name)),
        };
        tracing::trace!(
            name = token.to_string(&self.cs_name_interner),
            depth = self.frames.len(),
            "expanding command"
        );
        self.enter_nested("expanding a command")?;
        let result = match command {
            Command::Macro(m) => self.call_macro(token, &m),
            Command::Primitive(primitive, _) => primitive.call(token, self),
        };
        self.nesting -= 1;
        result.map(Some)
    }

    /// Expands a control sequence and places the result at the front of the input.
    pub fn macro_replace(&mut self, token: Token) -> error::Result<()> {
        if let Some(tokens) = self.expand_once(token)? {
            self.push_tokens(&tokens);
        }
        Ok(())
    }

    /// The generic handler for user defined macros.
    ///
    /// The frame is pushed once the arguments are bound:
    ///     binding can consume the end of enclosing expansions, which pops their frames.
    fn call_macro(
        &mut self,
        token: Token,
        m: &crate::texmacro::Macro,
    ) -> error::Result<Vec<Token>> {
        let arguments = m.bind(token, self)?;
        if self.frames.len() >= self.options.max_expansion_depth {
            return Err(self
                .error(Kind::MaxExpansionDepthExceeded(
                    self.options.max_expansion_depth,
                ))
                .with_note(format![
                    "the limit was reached while expanding `{}`",
                    token.to_string(&self.cs_name_interner)
                ])
                .with_note("a macro that expands to itself never terminates"));
        }
        self.frames.push(CallFrame { token, arguments });
        let mut result = vec![];
        let frame = &self.frames[self.frames.len() - 1];
        if m.substitute(&frame.arguments, &mut result).is_none() {
            return Err(self.error(Kind::MalformedParameter(
                "the replacement text references an unbound parameter".into(),
            )));
        }
        result.push(Token::StackPop);
        Ok(result)
    }

    /// Returns a copy of the argument bound to `#index` in the innermost call frame.
    pub fn parameter_replace(&self, index: u8) -> error::Result<Vec<Token>> {
        let frame = match self.frames.last() {
            Some(frame) => frame,
            None => {
                return Err(self.error(Kind::MalformedParameter(format![
                    "parameter `#{index}` used outside of a macro body"
                ])))
            }
        };
        match frame.arguments.get((index as usize).wrapping_sub(1)) {
            Some(argument) => Ok(argument.clone()),
            None => Err(self
                .error(Kind::MalformedParameter(format![
                    "parameter `#{index}` is not bound"
                ]))
                .with_note(format![
                    "the innermost macro `{}` has {} parameter(s)",
                    frame.token.to_string(&self.cs_name_interner),
                    frame.arguments.len()
                ])),
        }
    }

    /// Reads up to `n` expanded characters into the buffer.
    ///
    /// Returns the number of characters appended; 0 means the input is exhausted.
    pub fn read(&mut self, buf: &mut String, n: usize) -> error::Result<usize> {
        let mut count = 0;
        while count < n {
            let token = match self.read_token()? {
                Some(token) => token,
                None => {
                    let depth = self.blocks.depth();
                    if depth > 0 {
                        return Err(self
                            .error(Kind::UnbalancedGroup("unterminated `{`".into()))
                            .with_note(format![
                                "{depth} group(s) still open at the end of the input"
                            ]));
                    }
                    break;
                }
            };
            match token {
                Token::ControlSequence(_) => self.macro_replace(token)?,
                Token::Parameter(index) => {
                    let argument = self.parameter_replace(index)?;
                    self.push_tokens(&argument);
                }
                Token::BeginGroup(_) => self.begin_group(),
                Token::EndGroup(_) => self.end_group()?,
                Token::StackPop => {}
                _ => {
                    if let Some(c) = token.char() {
                        buf.push(c);
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }

    /// Expands the whole input.
    pub fn read_to_string(&mut self) -> error::Result<String> {
        let mut output = String::new();
        while self.read(&mut output, 4096)? > 0 {}
        Ok(output)
    }

    pub fn begin_group(&mut self) {
        self.blocks.begin_group();
    }

    pub fn end_group(&mut self) -> error::Result<()> {
        if !self.blocks.end_group() {
            return Err(self.error(Kind::UnbalancedGroup("extraneous `}`".into())));
        }
        Ok(())
    }

    pub fn group_depth(&self) -> usize {
        self.blocks.depth()
    }

    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Makes the next definition global.
    pub fn set_global(&mut self) {
        self.global = true;
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Returns the global flag and clears it.
    pub fn take_global(&mut self) -> bool {
        std::mem::take(&mut self.global)
    }

    /// Binds a command to a name, consuming the global flag.
    pub fn define(&mut self, name: CsName, command: Command) {
        let global = std::mem::take(&mut self.global);
        tracing::debug!(
            name = self.cs_name_interner.resolve(name).unwrap_or_default(),
            global,
            kind = %command,
            "defining command"
        );
        self.blocks.define(name, command, global);
    }

    pub fn lookup(&self, name: CsName) -> Option<&Command> {
        self.blocks.lookup(name)
    }

    pub fn cat_code(&self, c: char) -> CatCode {
        self.blocks.cat_codes().get(c)
    }

    /// Sets a category code, consuming the global flag.
    ///
    /// Returns false if the character has no entry in the table.
    pub fn set_cat_code(&mut self, c: char, code: CatCode) -> bool {
        let global = std::mem::take(&mut self.global);
        self.blocks.set_cat_code(c, code, global)
    }

    /// Creates an error at the current position, with the current macro stack.
    pub fn error(&self, kind: Kind) -> Box<Error> {
        let mut err = Error::new(kind);
        err.location = self.sources.location();
        err.stack_trace = self
            .frames
            .iter()
            .map(|frame| match frame.token.cs_name() {
                Some(cs_name) => self
                    .cs_name_interner
                    .resolve(cs_name)
                    .unwrap_or_default()
                    .to_string(),
                None => frame.token.to_string(&self.cs_name_interner),
            })
            .collect();
        err
    }

    fn undefined_error(&self, cs_name: CsName) -> Box<Error> {
        let name = self
            .cs_name_interner
            .resolve(cs_name)
            .unwrap_or_default()
            .to_string();
        let names = self.command_names();
        let max_distance = (name.chars().count() / 3).max(1);
        let close_names = spellcheck::find_close_words(&names, &name, max_distance);
        let mut err = self.error(Kind::UndefinedMacro(name));
        if let Some(close_name) = close_names.first() {
            err = err.with_note(format!["did you mean `\\{close_name}`?"]);
        }
        err
    }
}
