//! Entry-point traits and the resolved entry descriptor.
//!
//! A loading mechanism hands back an [`EntryType`]: a named, probe-able
//! description of something that can be started. The dispatcher asks it for
//! exactly one of the four start strategies, in the order fixed by
//! [`EntryShape::PRECEDENCE`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::LoaderResult;
use crate::shape::{Capabilities, EntryShape};

/// Value returned by a [`Callable`]. The bootstrapper discards it.
pub type EntryValue = Box<dyn Any + Send>;

/// An entry point that is its own unit of execution.
///
/// Runs to completion on a dedicated thread.
pub trait ActiveTask: Send + 'static {
    /// Body of the task.
    fn run(self: Box<Self>);
}

impl<F> ActiveTask for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)();
    }
}

/// A fire-and-forget entry point, run on a dedicated thread.
pub trait Runnable: Send + 'static {
    /// Run the unit.
    fn run(&mut self);
}

impl<F> Runnable for F
where
    F: FnMut() + Send + 'static,
{
    fn run(&mut self) {
        (*self)();
    }
}

/// A value-producing entry point, called on the bootstrapping thread.
pub trait Callable: Send {
    /// Produce a value or fail. Failures are the unit's own business and do
    /// not abort the bootstrap.
    ///
    /// # Errors
    ///
    /// Whatever the unit's logic reports.
    fn call(&mut self) -> anyhow::Result<EntryValue>;
}

impl<F> Callable for F
where
    F: FnMut() -> anyhow::Result<EntryValue> + Send,
{
    fn call(&mut self) -> anyhow::Result<EntryValue> {
        (*self)()
    }
}

/// A static entry function receiving the bootstrapper's raw arguments.
pub trait StaticEntry: Send {
    /// Invoke the entry function.
    ///
    /// # Errors
    ///
    /// Any failure is fatal to the bootstrap.
    fn invoke(&self, args: &[String]) -> anyhow::Result<()>;
}

/// A resolved, startable entry type.
///
/// Implemented by each loading mechanism. `capabilities` is the probe; the
/// remaining methods construct the unit for one specific shape and report
/// construction problems as [`LoaderError::Instantiation`](crate::LoaderError::Instantiation).
pub trait EntryType: Send + Sync + fmt::Debug {
    /// Fully-qualified name the type was resolved under.
    fn name(&self) -> &str;

    /// Which shapes this type supports.
    fn capabilities(&self) -> Capabilities;

    /// Construct the active task, passing the boot prefix.
    ///
    /// # Errors
    ///
    /// Returns an instantiation error if the type cannot be constructed this way.
    fn construct_task(&self, prefix: &str) -> LoaderResult<Box<dyn ActiveTask>>;

    /// Instantiate the fire-and-forget unit.
    ///
    /// # Errors
    ///
    /// Returns an instantiation error if the type cannot be constructed this way.
    fn instantiate_runnable(&self) -> LoaderResult<Box<dyn Runnable>>;

    /// Instantiate the value-producing unit.
    ///
    /// # Errors
    ///
    /// Returns an instantiation error if the type cannot be constructed this way.
    fn instantiate_callable(&self) -> LoaderResult<Box<dyn Callable>>;

    /// Locate the static entry function.
    ///
    /// # Errors
    ///
    /// Returns an instantiation error if the type has no static entry.
    fn static_entry(&self) -> LoaderResult<Box<dyn StaticEntry>>;
}

/// A resolved entry type together with the shape it will be started as.
#[derive(Debug, Clone)]
pub struct EntryDescriptor {
    entry: Arc<dyn EntryType>,
    shape: EntryShape,
}

impl EntryDescriptor {
    /// Probe `entry` and select its start strategy.
    #[must_use]
    pub fn new(entry: Arc<dyn EntryType>) -> Self {
        let shape = entry.capabilities().select();
        Self { entry, shape }
    }

    /// The resolved entry type.
    #[must_use]
    pub fn entry(&self) -> &Arc<dyn EntryType> {
        &self.entry
    }

    /// The selected start strategy.
    #[must_use]
    pub fn shape(&self) -> EntryShape {
        self.shape
    }

    /// Entry type name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.entry.name()
    }
}
