//! Callback trait and the ordered registry a host dispatches through

use crate::error::{Error, Result};
use crate::host::TrainerState;

/// Lifecycle event a host dispatches to its callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Training is about to start (before any step).
    FitStart,
    /// A training epoch finished and its metrics are aggregated.
    TrainEpochEnd,
    /// A validation pass finished.
    ValidationEpochEnd,
    /// A test pass finished.
    TestEnd,
}

/// A hook invoked by the training host at named lifecycle points.
///
/// Every method defaults to a no-op so implementors only handle the
/// events they care about.
pub trait Callback {
    /// Name used in error reports and logs.
    fn name(&self) -> &str;

    /// Called once, before any training step.
    fn on_fit_start(&mut self, _trainer: &dyn TrainerState) -> Result<()> {
        Ok(())
    }

    /// Called after each training epoch.
    fn on_train_epoch_end(&mut self, _trainer: &dyn TrainerState) -> Result<()> {
        Ok(())
    }

    /// Called after each validation pass.
    fn on_validation_epoch_end(&mut self, _trainer: &dyn TrainerState) -> Result<()> {
        Ok(())
    }

    /// Called after the test pass.
    fn on_test_end(&mut self, _trainer: &dyn TrainerState) -> Result<()> {
        Ok(())
    }
}

/// Ordered set of callbacks registered with a host.
#[derive(Default)]
pub struct CallbackList {
    callbacks: Vec<Box<dyn Callback>>,
}

impl CallbackList {
    /// Create an empty callback list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn push(&mut self, callback: impl Callback + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Register a callback, builder style.
    #[must_use]
    pub fn with(mut self, callback: impl Callback + 'static) -> Self {
        self.push(callback);
        self
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Names of registered callbacks, in dispatch order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    /// Dispatch `event` to every callback in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing callback and returns its error wrapped in
    /// [`Error::Callback`]; later callbacks do not see the event.
    pub fn dispatch(&mut self, event: LifecycleEvent, trainer: &dyn TrainerState) -> Result<()> {
        for callback in &mut self.callbacks {
            let outcome = match event {
                LifecycleEvent::FitStart => callback.on_fit_start(trainer),
                LifecycleEvent::TrainEpochEnd => callback.on_train_epoch_end(trainer),
                LifecycleEvent::ValidationEpochEnd => callback.on_validation_epoch_end(trainer),
                LifecycleEvent::TestEnd => callback.on_test_end(trainer),
            };
            outcome.map_err(|source| Error::Callback {
                name: callback.name().to_string(),
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    /// Dispatch [`LifecycleEvent::FitStart`].
    ///
    /// # Errors
    ///
    /// See [`CallbackList::dispatch`].
    pub fn fit_start(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.dispatch(LifecycleEvent::FitStart, trainer)
    }

    /// Dispatch [`LifecycleEvent::TrainEpochEnd`].
    ///
    /// # Errors
    ///
    /// See [`CallbackList::dispatch`].
    pub fn train_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.dispatch(LifecycleEvent::TrainEpochEnd, trainer)
    }

    /// Dispatch [`LifecycleEvent::ValidationEpochEnd`].
    ///
    /// # Errors
    ///
    /// See [`CallbackList::dispatch`].
    pub fn validation_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.dispatch(LifecycleEvent::ValidationEpochEnd, trainer)
    }

    /// Dispatch [`LifecycleEvent::TestEnd`].
    ///
    /// # Errors
    ///
    /// See [`CallbackList::dispatch`].
    pub fn test_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.dispatch(LifecycleEvent::TestEnd, trainer)
    }
}

impl std::fmt::Debug for CallbackList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackList")
            .field("callbacks", &self.names())
            .finish()
    }
}
