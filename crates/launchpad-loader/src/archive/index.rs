//! Export-section scan mapping entry type names to their members.
//!
//! A type `N` is declared by exporting functions named `N::<member>`. Only
//! function exports take part; exports without a `::` separator, with an
//! empty type name, or with an unrecognised member are ignored.

use std::collections::BTreeMap;

use crate::shape::{Capabilities, EntryShape};

/// Separator between the type name and the member in an export name.
pub const MEMBER_SEPARATOR: &str = "::";

/// Export member for [`EntryShape::ActiveTask`].
pub const TASK_MEMBER: &str = "task";
/// Export member for [`EntryShape::FireAndForget`].
pub const RUN_MEMBER: &str = "run";
/// Export member for [`EntryShape::ValueProducing`].
pub const CALL_MEMBER: &str = "call";
/// Export member for [`EntryShape::StaticEntry`].
pub const MAIN_MEMBER: &str = "main";

/// The export member implementing `shape`.
#[must_use]
pub fn member_for(shape: EntryShape) -> &'static str {
    match shape {
        EntryShape::ActiveTask => TASK_MEMBER,
        EntryShape::FireAndForget => RUN_MEMBER,
        EntryShape::ValueProducing => CALL_MEMBER,
        EntryShape::StaticEntry => MAIN_MEMBER,
    }
}

/// The shape implemented by export `member`, if recognised.
#[must_use]
pub fn shape_for(member: &str) -> Option<EntryShape> {
    EntryShape::PRECEDENCE
        .into_iter()
        .find(|shape| member_for(*shape) == member)
}

fn mark(caps: &mut Capabilities, shape: EntryShape) {
    match shape {
        EntryShape::ActiveTask => caps.active_task = true,
        EntryShape::FireAndForget => caps.fire_and_forget = true,
        EntryShape::ValueProducing => caps.value_producing = true,
        EntryShape::StaticEntry => caps.static_entry = true,
    }
}

/// Full export name for `member` of type `name`.
#[must_use]
pub fn export_name(name: &str, member: &str) -> String {
    format!("{name}{MEMBER_SEPARATOR}{member}")
}

/// Scan a module's exports and group them by type name.
///
/// # Errors
///
/// Returns the parser's message if the module is not valid WebAssembly.
pub fn index_exports(wasm_bytes: &[u8]) -> Result<BTreeMap<String, Capabilities>, String> {
    let mut types: BTreeMap<String, Capabilities> = BTreeMap::new();

    for payload in wasmparser::Parser::new(0).parse_all(wasm_bytes) {
        let payload = payload.map_err(|e| format!("failed to parse module: {e}"))?;
        if let wasmparser::Payload::ExportSection(reader) = payload {
            for export in reader {
                let export = export.map_err(|e| format!("failed to read export: {e}"))?;
                if export.kind != wasmparser::ExternalKind::Func {
                    continue;
                }
                let Some((name, member)) = export.name.rsplit_once(MEMBER_SEPARATOR) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                let Some(shape) = shape_for(member) else {
                    continue;
                };
                mark(types.entry(name.to_owned()).or_default(), shape);
            }
        }
    }

    Ok(types)
}
