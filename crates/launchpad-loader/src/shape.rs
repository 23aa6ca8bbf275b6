//! Execution shapes an entry type can expose, and their precedence.

use std::fmt;

/// The start strategy chosen for an entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryShape {
    /// Its own unit of execution, constructed with the boot prefix.
    ActiveTask,
    /// A no-argument `run` operation with no result.
    FireAndForget,
    /// A no-argument operation returning a value or failing.
    ValueProducing,
    /// A static entry function receiving the raw arguments.
    StaticEntry,
}

impl EntryShape {
    /// All shapes in dispatch precedence order. The first one an entry
    /// satisfies wins.
    pub const PRECEDENCE: [Self; 4] = [
        Self::ActiveTask,
        Self::FireAndForget,
        Self::ValueProducing,
        Self::StaticEntry,
    ];
}

impl fmt::Display for EntryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ActiveTask => "active task",
            Self::FireAndForget => "fire-and-forget",
            Self::ValueProducing => "value-producing",
            Self::StaticEntry => "static entry",
        };
        f.write_str(name)
    }
}

/// The result of probing an entry type for the shapes it supports.
///
/// The static entry shape is not probed: it is the fallback when nothing
/// else matches, and a missing static entry is only detected when it is
/// invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Supports [`EntryShape::ActiveTask`].
    pub active_task: bool,
    /// Supports [`EntryShape::FireAndForget`].
    pub fire_and_forget: bool,
    /// Supports [`EntryShape::ValueProducing`].
    pub value_producing: bool,
    /// Declares a static entry function.
    pub static_entry: bool,
}

impl Capabilities {
    /// No shapes at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the probe reported `shape`.
    #[must_use]
    pub fn supports(&self, shape: EntryShape) -> bool {
        match shape {
            EntryShape::ActiveTask => self.active_task,
            EntryShape::FireAndForget => self.fire_and_forget,
            EntryShape::ValueProducing => self.value_producing,
            EntryShape::StaticEntry => self.static_entry,
        }
    }

    /// Pick the highest-precedence shape, falling back to
    /// [`EntryShape::StaticEntry`].
    #[must_use]
    pub fn select(&self) -> EntryShape {
        EntryShape::PRECEDENCE
            .into_iter()
            .find(|shape| self.supports(*shape))
            .unwrap_or(EntryShape::StaticEntry)
    }
}
