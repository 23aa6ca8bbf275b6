//! Capability dispatch: starting a resolved entry type.
//!
//! The shape chosen at resolution time selects one of four start
//! strategies. Active tasks and fire-and-forget units get a dedicated OS
//! thread named after the boot prefix, and the dispatcher waits for it on a
//! completion channel raced against a [`CancellationToken`]. Value-producing
//! and static entries run on the caller inside `block_in_place`, so they need
//! the multi-threaded runtime.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use launchpad_config::BootPrefix;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::entry::EntryDescriptor;
use crate::error::{LoaderError, LoaderResult};
use crate::shape::EntryShape;

/// How a started entry point ended. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The unit ran to completion.
    Completed,
    /// A value-producing unit reported a failure of its own logic or panicked.
    EntryFailed(String),
    /// The wait for a threaded unit was cancelled. The thread keeps running.
    Interrupted,
    /// A threaded unit died from a panic before completing.
    Abandoned,
}

/// Starts entry types according to their selected shape.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    cancel: CancellationToken,
}

impl Dispatcher {
    /// A dispatcher whose waits are interrupted when `cancel` fires.
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// The token that interrupts waits.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Start `descriptor` using its selected strategy.
    ///
    /// `args` are forwarded verbatim to a static entry and ignored by the
    /// other shapes.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Instantiation`] if the unit cannot be
    /// constructed or started, or if a static entry is missing or fails.
    pub async fn dispatch(
        &self,
        prefix: &BootPrefix,
        descriptor: &EntryDescriptor,
        args: &[String],
    ) -> LoaderResult<DispatchOutcome> {
        let entry = descriptor.entry();
        let name = entry.name();
        let shape = descriptor.shape();
        info!(entry = %name, %shape, "Starting entry point");

        match shape {
            EntryShape::ActiveTask => {
                let task = entry.construct_task(prefix.as_str())?;
                self.start_and_join(prefix, name, shape, move || task.run())
                    .await
            },
            EntryShape::FireAndForget => {
                let mut runnable = entry.instantiate_runnable()?;
                self.start_and_join(prefix, name, shape, move || runnable.run())
                    .await
            },
            EntryShape::ValueProducing => {
                let called = tokio::task::block_in_place(|| {
                    let mut callable = entry.instantiate_callable()?;
                    Ok::<_, LoaderError>(catch_unwind(AssertUnwindSafe(|| callable.call())))
                })?;
                match called {
                    Ok(Ok(_)) => {
                        debug!(entry = %name, "Callable returned; value discarded");
                        Ok(DispatchOutcome::Completed)
                    },
                    Ok(Err(e)) => {
                        let message = format!("{e:#}");
                        error!(entry = %name, error = %message, "Callable failed");
                        Ok(DispatchOutcome::EntryFailed(message))
                    },
                    Err(payload) => {
                        let message = panic_message(&*payload).to_owned();
                        error!(entry = %name, panic = %message, "Callable panicked");
                        Ok(DispatchOutcome::EntryFailed(message))
                    },
                }
            },
            EntryShape::StaticEntry => {
                let invoked = tokio::task::block_in_place(|| {
                    let main = entry.static_entry()?;
                    Ok::<_, LoaderError>(catch_unwind(AssertUnwindSafe(|| main.invoke(args))))
                })?;
                match invoked {
                    Ok(result) => {
                        result.map_err(|e| {
                            LoaderError::instantiation(name, shape, format!("{e:#}"))
                        })?;
                        Ok(DispatchOutcome::Completed)
                    },
                    Err(payload) => Err(LoaderError::instantiation(
                        name,
                        shape,
                        format!("static entry panicked: {}", panic_message(&*payload)),
                    )),
                }
            },
        }
    }

    /// Run `body` on a thread named after the prefix and wait for it.
    async fn start_and_join<F>(
        &self,
        prefix: &BootPrefix,
        name: &str,
        shape: EntryShape,
        body: F,
    ) -> LoaderResult<DispatchOutcome>
    where
        F: FnOnce() + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        std::thread::Builder::new()
            .name(prefix.as_str().to_owned())
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(body));
                let _ = done_tx.send(result);
            })
            .map_err(|e| {
                LoaderError::instantiation(name, shape, format!("failed to start thread: {e}"))
            })?;
        debug!(entry = %name, thread = %prefix, "Entry thread started");

        tokio::select! {
            biased;

            () = self.cancel.cancelled() => {
                warn!(entry = %name, "Interrupted while waiting for the entry thread");
                Ok(DispatchOutcome::Interrupted)
            },
            joined = done_rx => match joined {
                Ok(Ok(())) => {
                    info!(entry = %name, "Entry thread finished");
                    Ok(DispatchOutcome::Completed)
                },
                Ok(Err(payload)) => {
                    error!(entry = %name, panic = panic_message(&*payload), "Entry thread panicked");
                    Ok(DispatchOutcome::Abandoned)
                },
                Err(_) => {
                    error!(entry = %name, "Entry thread exited without reporting");
                    Ok(DispatchOutcome::Abandoned)
                },
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
