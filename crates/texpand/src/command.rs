//! Commands: the values bound to control sequence names.
//!
//! A command is either a user defined macro, created in the input with primitives like `\def`,
//!     or a primitive implemented in Rust.
//! Every primitive is a type implementing the [Primitive] trait.
//! When the engine reaches a control sequence bound to a primitive it calls
//!     [Primitive::call] with the triggering token.
//! The primitive may read further tokens, raw or expanded, through the [VM],
//!     and returns the list of tokens that replaces the invocation.
//! That list is placed at the front of the pending input and is read next.

use crate::error::Result;
use crate::texmacro;
use crate::token::Token;
use crate::vm::VM;
use std::num;
use std::rc;
use std::sync;

/// A primitive implemented in the engine.
pub trait Primitive {
    /// Runs the primitive. The triggering token has already been consumed.
    fn call(&self, token: Token, vm: &mut VM) -> Result<Vec<Token>>;
}

/// A command bound to a control sequence name.
#[derive(Clone)]
pub enum Command {
    /// A user defined macro.
    ///
    /// The macro body is shared between the definition and every expansion in progress.
    Macro(rc::Rc<texmacro::Macro>),

    /// A primitive, with its optional tag.
    Primitive(rc::Rc<dyn Primitive>, Option<Tag>),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Macro(_) => write![f, "a user-defined macro"],
            Command::Primitive(_, _) => write![f, "a primitive"],
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Macro(m) => f.debug_tuple("Macro").field(m).finish(),
            Command::Primitive(_, tag) => f.debug_tuple("Primitive").field(tag).finish(),
        }
    }
}

impl Command {
    /// Gets the tag associated to this command, or [None] if the command has no tag.
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Command::Primitive(_, tag) => *tag,
            Command::Macro(_) => None,
        }
    }
}

/// A built-in command, provided when the VM is created.
///
/// This is a [Command] together with a documentation string.
#[derive(Clone)]
pub struct BuiltIn {
    cmd: Command,
    doc: Option<&'static str>,
}

impl BuiltIn {
    pub fn new<P: Primitive + 'static>(primitive: P) -> BuiltIn {
        Command::Primitive(rc::Rc::new(primitive), None).into()
    }

    /// Set the tag for this built-in command.
    ///
    /// Tags can only be attached to primitives; the call is ignored for macros.
    pub fn with_tag(mut self, tag: Tag) -> BuiltIn {
        if let Command::Primitive(_, t) = &mut self.cmd {
            *t = Some(tag);
        }
        self
    }

    pub fn with_doc(mut self, doc: &'static str) -> BuiltIn {
        self.doc = Some(doc);
        self
    }

    pub fn cmd(&self) -> &Command {
        &self.cmd
    }

    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }
}

impl From<Command> for BuiltIn {
    fn from(cmd: Command) -> Self {
        BuiltIn { cmd, doc: None }
    }
}

/// A tag is a piece of metadata optionally attached to a primitive.
///
/// Tags let one primitive recognize another one in the raw input.
/// When a conditional skips the branch that is not taken, it must find the matching
///     `\else` and `\fi` and step over nested conditionals,
///     all without expanding anything.
/// It does this by looking up each control sequence it skips and comparing the tag of the
///     bound command with the known tags for `\else`, `\fi` and the `\if` family.
/// The comparison is on the command and not on the name,
///     so a macro that happens to be called `\fi` is not mistaken for the primitive.
///
/// Tags are non-zero 32 bit integers handed out in order from a global counter,
///     so `Option<Tag>` takes up 4 bytes.
#[derive(PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord, Hash)]
pub struct Tag(num::NonZeroU32);

static NEXT_TAG_VALUE: sync::atomic::AtomicU32 = sync::atomic::AtomicU32::new(1);

impl Tag {
    /// Creates a new unique tag.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Tag {
        let n = NEXT_TAG_VALUE.fetch_add(1, sync::atomic::Ordering::Relaxed);
        Tag(num::NonZeroU32::new(n).unwrap_or(num::NonZeroU32::MAX))
    }
}

/// A static tag enables creating a tag in a static variable.
///
/// ```
/// # use texpand::command::StaticTag;
/// static TAG: StaticTag = StaticTag::new();
///
/// assert_eq!(TAG.get(), TAG.get());
/// ```
pub struct StaticTag(sync::OnceLock<Tag>);

impl Default for StaticTag {
    fn default() -> Self {
        StaticTag::new()
    }
}

impl StaticTag {
    pub const fn new() -> StaticTag {
        StaticTag(sync::OnceLock::new())
    }

    /// Get the [Tag], creating it on first use.
    pub fn get(&self) -> Tag {
        *self.0.get_or_init(Tag::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STATIC_TAG_1: StaticTag = StaticTag::new();
    static STATIC_TAG_2: StaticTag = StaticTag::new();

    #[test]
    fn tags_are_unique() {
        let tag_1 = STATIC_TAG_1.get();
        let tag_2 = STATIC_TAG_2.get();
        let other = Tag::new();
        assert_eq!(tag_1, STATIC_TAG_1.get());
        assert_ne!(tag_1, tag_2);
        assert_ne!(tag_1, other);
        assert_ne!(tag_2, other);
    }

    #[test]
    fn tag_size() {
        assert_eq!(std::mem::size_of::<Option<Tag>>(), 4);
    }

    struct Nothing;

    impl Primitive for Nothing {
        fn call(&self, _: Token, _: &mut VM) -> Result<Vec<Token>> {
            Ok(vec![])
        }
    }

    #[test]
    fn built_in_tag_and_doc() {
        let tag = Tag::new();
        let built_in = BuiltIn::new(Nothing).with_tag(tag).with_doc("does nothing");
        assert_eq!(built_in.cmd().tag(), Some(tag));
        assert_eq!(built_in.doc(), Some("does nothing"));
    }
}
