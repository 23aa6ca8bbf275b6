//! In-process entry types compiled into the launcher.
//!
//! [`NativeRegistry`] is the root of every context chain: the loading
//! context the bootstrapper itself was built with. Embedders register
//! [`NativeEntry`] values under a fully-qualified name, declaring which
//! shapes each one supports by attaching factories.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::{LoaderHandle, LoadingContext};
use crate::entry::{ActiveTask, Callable, EntryType, Runnable, StaticEntry};
use crate::error::{LoaderError, LoaderResult};
use crate::shape::{Capabilities, EntryShape};

type TaskFactory = Arc<dyn Fn(&str) -> anyhow::Result<Box<dyn ActiveTask>> + Send + Sync>;
type RunnableFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Runnable>> + Send + Sync>;
type CallableFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Callable>> + Send + Sync>;
type MainFn = Arc<dyn Fn(&[String]) -> anyhow::Result<()> + Send + Sync>;

/// An entry type backed by Rust closures.
#[derive(Clone)]
pub struct NativeEntry {
    name: String,
    task: Option<TaskFactory>,
    runnable: Option<RunnableFactory>,
    callable: Option<CallableFactory>,
    main: Option<MainFn>,
}

impl NativeEntry {
    /// An entry with no shapes yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task: None,
            runnable: None,
            callable: None,
            main: None,
        }
    }

    /// Support the active-task shape. The factory receives the boot prefix.
    #[must_use]
    pub fn with_task<F, T>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<T> + Send + Sync + 'static,
        T: ActiveTask,
    {
        self.task = Some(Arc::new(move |prefix: &str| {
            factory(prefix).map(|t| Box::new(t) as Box<dyn ActiveTask>)
        }));
        self
    }

    /// Support the fire-and-forget shape.
    #[must_use]
    pub fn with_runnable<F, R>(mut self, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<R> + Send + Sync + 'static,
        R: Runnable,
    {
        self.runnable = Some(Arc::new(move || {
            factory().map(|r| Box::new(r) as Box<dyn Runnable>)
        }));
        self
    }

    /// Support the value-producing shape.
    #[must_use]
    pub fn with_callable<F, C>(mut self, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
        C: Callable + 'static,
    {
        self.callable = Some(Arc::new(move || {
            factory().map(|c| Box::new(c) as Box<dyn Callable>)
        }));
        self
    }

    /// Provide a static entry function.
    #[must_use]
    pub fn with_main<F>(mut self, main: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.main = Some(Arc::new(main));
        self
    }

    fn missing(&self, shape: EntryShape) -> LoaderError {
        LoaderError::instantiation(&self.name, shape, "entry type does not provide this shape")
    }
}

impl fmt::Debug for NativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEntry")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

impl EntryType for NativeEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            active_task: self.task.is_some(),
            fire_and_forget: self.runnable.is_some(),
            value_producing: self.callable.is_some(),
            static_entry: self.main.is_some(),
        }
    }

    fn construct_task(&self, prefix: &str) -> LoaderResult<Box<dyn ActiveTask>> {
        let factory = self
            .task
            .as_ref()
            .ok_or_else(|| self.missing(EntryShape::ActiveTask))?;
        factory(prefix)
            .map_err(|e| LoaderError::instantiation(&self.name, EntryShape::ActiveTask, e))
    }

    fn instantiate_runnable(&self) -> LoaderResult<Box<dyn Runnable>> {
        let factory = self
            .runnable
            .as_ref()
            .ok_or_else(|| self.missing(EntryShape::FireAndForget))?;
        factory().map_err(|e| LoaderError::instantiation(&self.name, EntryShape::FireAndForget, e))
    }

    fn instantiate_callable(&self) -> LoaderResult<Box<dyn Callable>> {
        let factory = self
            .callable
            .as_ref()
            .ok_or_else(|| self.missing(EntryShape::ValueProducing))?;
        factory().map_err(|e| LoaderError::instantiation(&self.name, EntryShape::ValueProducing, e))
    }

    fn static_entry(&self) -> LoaderResult<Box<dyn StaticEntry>> {
        let main = self
            .main
            .clone()
            .ok_or_else(|| self.missing(EntryShape::StaticEntry))?;
        Ok(Box::new(NativeMain(main)))
    }
}

struct NativeMain(MainFn);

impl StaticEntry for NativeMain {
    fn invoke(&self, args: &[String]) -> anyhow::Result<()> {
        (self.0)(args)
    }
}

/// Loading context over registered [`NativeEntry`] values.
#[derive(Default)]
pub struct NativeRegistry {
    entries: HashMap<String, Arc<NativeEntry>>,
    parent: Option<LoaderHandle>,
}

impl NativeRegistry {
    /// An empty root registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry that falls back to `parent`.
    #[must_use]
    pub fn with_parent(parent: LoaderHandle) -> Self {
        Self {
            entries: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Register an entry, replacing any previous entry with the same name.
    pub fn register(&mut self, entry: NativeEntry) -> &mut Self {
        debug!(entry = %entry.name, "Registered native entry type");
        self.entries.insert(entry.name.clone(), Arc::new(entry));
        self
    }

    /// Registered names, in no particular order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Freeze the registry into a shareable handle.
    #[must_use]
    pub fn into_handle(self) -> LoaderHandle {
        Arc::new(self)
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("entries", &self.names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl LoadingContext for NativeRegistry {
    fn describe(&self) -> String {
        format!("native[{}]", self.entries.len())
    }

    fn parent(&self) -> Option<&LoaderHandle> {
        self.parent.as_ref()
    }

    fn find_local(&self, name: &str) -> LoaderResult<Option<Arc<dyn EntryType>>> {
        Ok(self
            .entries
            .get(name)
            .map(|e| Arc::clone(e) as Arc<dyn EntryType>))
    }
}
