//! WebAssembly archives as a loading mechanism.
//!
//! Archives on the search path are indexed for `N::<member>` exports and
//! instantiated through Extism on demand.

mod config;
mod context;
mod entry;
pub mod index;
#[cfg(test)]
mod testing;

pub use config::ArchiveLoaderConfig;
pub use context::ArchiveContext;
pub use entry::WasmEntryType;
