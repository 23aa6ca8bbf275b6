//! Search path discovery, entry-point resolution and dispatch for Launchpad.
//!
//! The bootstrap sequence is a chain of hard gates:
//!
//! - [`build_search_path`]: collect the `.wasm` archives under `<home>/lib`
//! - [`EntryResolver`]: open an [`ArchiveContext`] over them and load the
//!   type named by `<prefix>.init`, falling back to a parent context
//! - [`Dispatcher`]: probe the type and start it with the first matching
//!   [`EntryShape`]
//!
//! [`Bootstrap`] runs the whole sequence over a
//! [`ConfigStore`](launchpad_config::ConfigStore).
//!
//! # Loading mechanisms
//!
//! Two [`LoadingContext`] implementations ship with the crate. A
//! [`NativeRegistry`] holds entry types compiled into the host and is the
//! root of every chain. An [`ArchiveContext`] indexes archives for exports
//! named `<type>::task`, `<type>::run`, `<type>::call` and `<type>::main` and
//! runs them through Extism.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod archive;
pub mod bootstrap;
pub mod context;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod native;
pub mod prelude;
pub mod resolver;
pub mod search_path;
pub mod shape;
pub mod version;

pub use archive::{ArchiveContext, ArchiveLoaderConfig, WasmEntryType};
pub use bootstrap::Bootstrap;
pub use context::{LoaderHandle, LoadingContext};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use entry::{
    ActiveTask, Callable, EntryDescriptor, EntryType, EntryValue, Runnable, StaticEntry,
};
pub use error::{LoaderError, LoaderResult};
pub use native::{NativeEntry, NativeRegistry};
pub use resolver::{EntryResolver, ResolvedEntry};
pub use search_path::{ARCHIVE_EXTENSION, SearchPath, build_search_path};
pub use shape::{Capabilities, EntryShape};
pub use version::{report_version, version};
