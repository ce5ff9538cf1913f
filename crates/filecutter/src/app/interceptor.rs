//! The hook callback: classify every keystroke and act on the two command chords.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app::chord::ChordBindings;
use crate::app::commands::{ChordOutcome, CommandExecutor};
use crate::app::worker::CommandWorker;
use crate::domain::model::{ChordEvent, Command, Disposition};

/// Where recognized chords run.
pub enum Dispatcher {
    /// On the hook thread, before the hook callback returns.
    Inline(Arc<CommandExecutor>),
    /// On a background worker; the hook callback only enqueues.
    Worker(CommandWorker),
}

impl Dispatcher {
    fn dispatch(&self, command: Command) -> Option<ChordOutcome> {
        match self {
            Dispatcher::Inline(executor) => {
                match panic::catch_unwind(AssertUnwindSafe(|| executor.execute(command))) {
                    Ok(outcome) => Some(outcome),
                    Err(_) => {
                        tracing::error!(command = command.as_str(), "command panicked");
                        None
                    }
                }
            }
            Dispatcher::Worker(worker) => {
                if !worker.submit(command) {
                    tracing::error!(command = command.as_str(), "command worker is gone");
                }
                None
            }
        }
    }

    fn shutdown(&self) {
        if let Dispatcher::Worker(worker) = self {
            worker.shutdown();
        }
    }
}

/// Observes keystrokes and never alters them.
pub struct Interceptor {
    bindings: ChordBindings,
    dispatcher: Dispatcher,
    enabled: AtomicBool,
}

impl Interceptor {
    /// Create an enabled interceptor.
    pub fn new(bindings: ChordBindings, dispatcher: Dispatcher) -> Self {
        Self {
            bindings,
            dispatcher,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Hook entry point. Always lets the event through.
    pub fn observe(&self, event: &ChordEvent) -> Disposition {
        self.handle(event);
        Disposition::PassThrough
    }

    /// Classify and act on one event, returning what happened when it ran inline.
    pub fn handle(&self, event: &ChordEvent) -> Option<ChordOutcome> {
        if !self.is_enabled() {
            return None;
        }
        let command = self.bindings.classify(event)?;
        tracing::info!(
            command = command.as_str(),
            modifiers = %event.modifiers,
            key = %event.key,
            "chord recognized"
        );
        self.dispatcher.dispatch(command)
    }

    /// Stop reacting to chords and release the worker, if any.
    pub fn shutdown(&self) {
        self.disable();
        self.dispatcher.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};

    use parking_lot::Mutex;

    use crate::app::mover::Mover;
    use crate::domain::model::{KeyId, ModifierKey, Modifiers, MoveReport};
    use crate::infra::finder::SelectionProvider;

    #[derive(Default)]
    struct CountingProvider {
        calls: Mutex<usize>,
    }

    impl SelectionProvider for CountingProvider {
        fn current_selection(&self) -> Vec<PathBuf> {
            *self.calls.lock() += 1;
            vec!["/a/file".into()]
        }

        fn current_directory(&self) -> Option<PathBuf> {
            *self.calls.lock() += 1;
            Some("/dest".into())
        }
    }

    #[derive(Default)]
    struct CountingMover {
        calls: Mutex<usize>,
    }

    impl Mover for CountingMover {
        fn move_all(&self, _sources: &[PathBuf], _destination: &Path) -> Vec<MoveReport> {
            *self.calls.lock() += 1;
            Vec::new()
        }
    }

    struct PanickingProvider;

    impl SelectionProvider for PanickingProvider {
        fn current_selection(&self) -> Vec<PathBuf> {
            panic!("automation bridge failed")
        }

        fn current_directory(&self) -> Option<PathBuf> {
            None
        }
    }

    fn inline(
        provider: Arc<CountingProvider>,
        mover: Arc<CountingMover>,
    ) -> (Interceptor, Arc<CommandExecutor>) {
        let executor = Arc::new(CommandExecutor::new(provider, mover));
        let interceptor = Interceptor::new(
            ChordBindings::default(),
            Dispatcher::Inline(Arc::clone(&executor)),
        );
        (interceptor, executor)
    }

    fn key(modifiers: Modifiers, c: char) -> ChordEvent {
        ChordEvent::new(modifiers, KeyId::Char(c))
    }

    #[test]
    fn ordinary_typing_has_no_side_effects() {
        let provider = Arc::new(CountingProvider::default());
        let mover = Arc::new(CountingMover::default());
        let (interceptor, executor) = inline(Arc::clone(&provider), Arc::clone(&mover));

        let typing = [
            key(Modifiers::NONE, 'h'),
            key(Modifiers::NONE, 'x'),
            key(Modifiers::NONE.with(ModifierKey::Shift), 'v'),
            key(Modifiers::COMMAND, 'c'),
            ChordEvent::new(Modifiers::COMMAND, KeyId::Modifier(ModifierKey::Command)),
        ];
        for event in &typing {
            assert_eq!(interceptor.observe(event), Disposition::PassThrough);
        }

        assert_eq!(*provider.calls.lock(), 0);
        assert_eq!(*mover.calls.lock(), 0);
        assert!(executor.cut_set().is_empty());
    }

    #[test]
    fn chords_pass_through_and_act() {
        let provider = Arc::new(CountingProvider::default());
        let mover = Arc::new(CountingMover::default());
        let (interceptor, executor) = inline(Arc::clone(&provider), Arc::clone(&mover));

        assert_eq!(
            interceptor.observe(&key(Modifiers::COMMAND, 'x')),
            Disposition::PassThrough
        );
        assert_eq!(executor.cut_set().len(), 1);

        assert_eq!(
            interceptor.observe(&key(Modifiers::COMMAND, 'v')),
            Disposition::PassThrough
        );
        assert_eq!(*mover.calls.lock(), 1);
        assert!(executor.cut_set().is_empty());
    }

    #[test]
    fn disabled_interceptor_ignores_chords() {
        let provider = Arc::new(CountingProvider::default());
        let mover = Arc::new(CountingMover::default());
        let (interceptor, _) = inline(Arc::clone(&provider), mover);

        interceptor.disable();
        assert_eq!(interceptor.handle(&key(Modifiers::COMMAND, 'x')), None);
        assert_eq!(*provider.calls.lock(), 0);

        interceptor.enable();
        assert_eq!(
            interceptor.handle(&key(Modifiers::COMMAND, 'x')),
            Some(ChordOutcome::Cut { count: 1 })
        );
    }

    #[test]
    fn panic_inside_a_command_is_contained() {
        let executor = Arc::new(CommandExecutor::new(PanickingProvider, CountingMover::default()));
        let interceptor =
            Interceptor::new(ChordBindings::default(), Dispatcher::Inline(executor));

        assert_eq!(
            interceptor.observe(&key(Modifiers::COMMAND, 'x')),
            Disposition::PassThrough
        );
        // Still classifying afterwards.
        assert_eq!(
            interceptor.handle(&key(Modifiers::COMMAND, 'v')),
            Some(ChordOutcome::NothingCut)
        );
    }

    #[test]
    fn worker_dispatch_returns_immediately() {
        let provider = Arc::new(CountingProvider::default());
        let mover = Arc::new(CountingMover::default());
        let executor = Arc::new(CommandExecutor::new(Arc::clone(&provider), Arc::clone(&mover)));
        let worker = CommandWorker::spawn(Arc::clone(&executor)).unwrap();
        let interceptor = Interceptor::new(ChordBindings::default(), Dispatcher::Worker(worker));

        assert_eq!(interceptor.handle(&key(Modifiers::COMMAND, 'x')), None);
        assert_eq!(interceptor.handle(&key(Modifiers::COMMAND, 'v')), None);
        interceptor.shutdown();

        assert_eq!(*mover.calls.lock(), 1);
        assert!(executor.cut_set().is_empty());
        assert!(!interceptor.is_enabled());
    }
}
