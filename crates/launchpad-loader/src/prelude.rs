//! Common imports for embedders.
//!
//! ```rust,ignore
//! use launchpad_loader::prelude::*;
//! ```

pub use crate::{
    Bootstrap, DispatchOutcome, Dispatcher, EntryResolver, EntryShape, EntryType, LoaderError,
    LoaderHandle, LoaderResult, LoadingContext, NativeEntry, NativeRegistry,
};
