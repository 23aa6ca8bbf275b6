//! Entry types defined by archive exports, executed through Extism.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use extism::{Manifest, PluginBuilder, Wasm};
use tracing::{debug, error};

use super::config::ArchiveLoaderConfig;
use super::index::{export_name, member_for};
use crate::entry::{ActiveTask, Callable, EntryType, EntryValue, Runnable, StaticEntry};
use crate::error::{LoaderError, LoaderResult};
use crate::shape::{Capabilities, EntryShape};

/// An entry type declared by an archive's `N::<member>` exports.
///
/// Each instantiation builds a fresh guest instance from the archive bytes.
pub struct WasmEntryType {
    name: String,
    archive: PathBuf,
    wasm_bytes: Arc<[u8]>,
    capabilities: Capabilities,
    config: Arc<ArchiveLoaderConfig>,
}

impl WasmEntryType {
    pub(crate) fn new(
        name: String,
        archive: PathBuf,
        wasm_bytes: Arc<[u8]>,
        capabilities: Capabilities,
        config: Arc<ArchiveLoaderConfig>,
    ) -> Self {
        Self {
            name,
            archive,
            wasm_bytes,
            capabilities,
            config,
        }
    }

    /// The archive defining this type.
    #[must_use]
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Build a guest instance bound to the export for `shape`.
    fn guest(&self, shape: EntryShape) -> LoaderResult<GuestCall> {
        if !self.capabilities.supports(shape) {
            return Err(LoaderError::instantiation(
                &self.name,
                shape,
                format!(
                    "archive {} has no '{}' export",
                    self.archive.display(),
                    export_name(&self.name, member_for(shape))
                ),
            ));
        }

        let mut manifest = Manifest::new([Wasm::data(self.wasm_bytes.to_vec())]);
        if let Some(timeout) = self.config.max_execution_time() {
            manifest = manifest.with_timeout(timeout);
        }
        if let Some(pages) = self.config.max_memory_pages() {
            manifest = manifest.with_memory_max(pages);
        }
        for (key, value) in self.config.guest_config() {
            manifest = manifest.with_config_key(key, value);
        }

        let plugin = PluginBuilder::new(manifest)
            .with_wasi(true)
            .build()
            .map_err(|e| {
                LoaderError::instantiation(
                    &self.name,
                    shape,
                    format!("failed to build Extism plugin: {e}"),
                )
            })?;

        debug!(
            entry = %self.name,
            archive = %self.archive.display(),
            %shape,
            "Instantiated archive guest"
        );

        Ok(GuestCall {
            entry: self.name.clone(),
            export: export_name(&self.name, member_for(shape)),
            plugin,
        })
    }
}

impl fmt::Debug for WasmEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WasmEntryType")
            .field("name", &self.name)
            .field("archive", &self.archive)
            .field("wasm_len", &self.wasm_bytes.len())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl EntryType for WasmEntryType {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn construct_task(&self, prefix: &str) -> LoaderResult<Box<dyn ActiveTask>> {
        let call = self.guest(EntryShape::ActiveTask)?;
        Ok(Box::new(WasmTask {
            call,
            prefix: prefix.to_owned(),
        }))
    }

    fn instantiate_runnable(&self) -> LoaderResult<Box<dyn Runnable>> {
        let call = self.guest(EntryShape::FireAndForget)?;
        Ok(Box::new(WasmRunnable { call }))
    }

    fn instantiate_callable(&self) -> LoaderResult<Box<dyn Callable>> {
        let call = self.guest(EntryShape::ValueProducing)?;
        Ok(Box::new(WasmCallable { call }))
    }

    fn static_entry(&self) -> LoaderResult<Box<dyn StaticEntry>> {
        let call = self.guest(EntryShape::StaticEntry)?;
        Ok(Box::new(WasmMain {
            call: Mutex::new(call),
        }))
    }
}

/// A built guest instance and the export it will run.
struct GuestCall {
    entry: String,
    export: String,
    plugin: extism::Plugin,
}

impl GuestCall {
    fn invoke(&mut self, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        self.plugin.call::<&[u8], Vec<u8>>(&self.export, input)
    }
}

struct WasmTask {
    call: GuestCall,
    prefix: String,
}

impl ActiveTask for WasmTask {
    fn run(self: Box<Self>) {
        let WasmTask { mut call, prefix } = *self;
        if let Err(e) = call.invoke(prefix.as_bytes()) {
            error!(entry = %call.entry, export = %call.export, error = %e, "Active task failed");
        }
    }
}

struct WasmRunnable {
    call: GuestCall,
}

impl Runnable for WasmRunnable {
    fn run(&mut self) {
        if let Err(e) = self.call.invoke(&[]) {
            error!(entry = %self.call.entry, export = %self.call.export, error = %e, "Runnable failed");
        }
    }
}

struct WasmCallable {
    call: GuestCall,
}

impl Callable for WasmCallable {
    fn call(&mut self) -> anyhow::Result<EntryValue> {
        let output = self.call.invoke(&[])?;
        Ok(Box::new(output))
    }
}

struct WasmMain {
    call: Mutex<GuestCall>,
}

impl StaticEntry for WasmMain {
    fn invoke(&self, args: &[String]) -> anyhow::Result<()> {
        let input = serde_json::to_vec(args)?;
        let mut call = self
            .call
            .lock()
            .map_err(|e| anyhow::anyhow!("guest lock poisoned: {e}"))?;
        call.invoke(&input)?;
        Ok(())
    }
}
