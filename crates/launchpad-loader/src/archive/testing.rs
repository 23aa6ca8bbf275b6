//! Guest modules synthesised for unit tests.

use wasm_encoder::{
    CodeSection, ExportKind, ExportSection, Function, FunctionSection, Instruction, Module,
    TypeSection, ValType,
};

/// A module whose every export is one `() -> i32` function returning `rc`.
pub(crate) fn module_with_exports(names: &[&str], rc: i32) -> Vec<u8> {
    let mut module = Module::new();
    let mut types = TypeSection::new();
    types.ty().function([], [ValType::I32]);
    module.section(&types);

    let mut functions = FunctionSection::new();
    functions.function(0);
    module.section(&functions);

    let mut exports = ExportSection::new();
    for name in names {
        exports.export(name, ExportKind::Func, 0);
    }
    module.section(&exports);

    let mut code = CodeSection::new();
    let mut body = Function::new([]);
    body.instruction(&Instruction::I32Const(rc));
    body.instruction(&Instruction::End);
    code.function(&body);
    module.section(&code);

    module.finish()
}
