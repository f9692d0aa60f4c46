//! The `\catcode` primitive

use texpand::error::Kind;
use texpand::parse;
use texpand::prelude::*;
use texpand::token::catcode::{CatCode, TABLE_SIZE};

pub const CATCODE_DOC: &str = "Set the category code of a character: \\catcode<char code>=<category code>";

/// Get the `\catcode` command.
pub fn get_catcode() -> BuiltIn {
    BuiltIn::new(SetCatCode).with_doc(CATCODE_DOC)
}

struct SetCatCode;

impl Primitive for SetCatCode {
    fn call(&self, _: Token, vm: &mut VM) -> Result<Vec<Token>> {
        let n = parse::read_number(vm, "a character code")?;
        let c = match char::from_u32(n) {
            Some(c) if (n as usize) < TABLE_SIZE => c,
            _ => {
                return Err(vm
                    .error(Kind::UnexpectedToken(format![
                        "character code {n} is out of range"
                    ]))
                    .with_note(format![
                        "only the category codes of characters 0 to {} can be changed",
                        TABLE_SIZE - 1
                    ]))
            }
        };
        parse::read_optional_equals(vm)?;
        let m = parse::read_number(vm, "a category code")?;
        let code = match u8::try_from(m).ok().and_then(|m| CatCode::try_from(m).ok()) {
            Some(code) => code,
            None => {
                return Err(vm
                    .error(Kind::UnexpectedToken(format![
                        "category code {m} is out of range"
                    ]))
                    .with_note("category codes are between 0 and 15 inclusive"))
            }
        };
        tracing::debug!(char = ?c, %code, global = vm.is_global(), "setting category code");
        vm.set_cat_code(c, code);
        Ok(vec![])
    }
}
