//! Startup and shutdown of the global cut/paste service.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::app::chord::ChordBindings;
use crate::app::commands::CommandExecutor;
use crate::app::interceptor::{Dispatcher, Interceptor};
use crate::app::mover::Mover;
use crate::app::worker::CommandWorker;
use crate::domain::errors::HookError;
use crate::infra::config::{Config, DispatchMode};
use crate::infra::finder::SelectionProvider;
use crate::infra::hook::KeyboardHook;

/// The running service: one hook, one interceptor, one cut set.
pub struct Service<H: KeyboardHook> {
    hook: H,
    interceptor: Arc<Interceptor>,
    executor: Arc<CommandExecutor>,
    stopped: bool,
}

impl<H: KeyboardHook> Service<H> {
    /// Wire everything together. Fails on invalid chords or when the hook is unavailable here.
    pub fn startup(
        config: &Config,
        hook: H,
        provider: impl SelectionProvider + 'static,
        mover: impl Mover + 'static,
    ) -> Result<Self> {
        let bindings =
            ChordBindings::from_config(&config.chords).context("invalid chord configuration")?;
        hook.probe()?;

        let executor = Arc::new(CommandExecutor::new(provider, mover));
        let dispatcher = match config.dispatch.mode() {
            DispatchMode::Inline => Dispatcher::Inline(Arc::clone(&executor)),
            DispatchMode::Worker => Dispatcher::Worker(CommandWorker::spawn(Arc::clone(&executor))?),
        };

        tracing::info!(
            backend = hook.name(),
            cut = %bindings.cut(),
            paste = %bindings.paste(),
            dispatch = ?config.dispatch.mode(),
            "starting"
        );

        Ok(Self {
            hook,
            interceptor: Arc::new(Interceptor::new(bindings, dispatcher)),
            executor,
            stopped: false,
        })
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Install the hook and deliver events until it stops. Blocks the calling thread.
    pub fn run(&mut self) -> Result<(), HookError> {
        let interceptor = Arc::clone(&self.interceptor);
        let result = self
            .hook
            .run(Box::new(move |event| interceptor.observe(&event)));
        if let Err(err) = &result {
            tracing::error!(error = %err, "keyboard hook could not be installed");
        }
        result
    }

    /// Disable the interceptor and release its worker.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.interceptor.shutdown();
        tracing::info!(
            discarded = self.executor.cut_set().len(),
            "keyboard hook stopped"
        );
    }
}

impl<H: KeyboardHook> Drop for Service<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
