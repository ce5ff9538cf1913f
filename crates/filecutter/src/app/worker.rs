//! Background execution of chords so the hook thread never blocks on Finder or the disk.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::app::commands::{ChordOutcome, CommandExecutor};
use crate::domain::model::Command;

type OutcomeObserver = Box<dyn Fn(Command, &ChordOutcome) + Send + 'static>;

/// A single worker thread that executes commands in submission order.
pub struct CommandWorker {
    sender: Mutex<Option<Sender<Command>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CommandWorker {
    /// Start the worker thread.
    pub fn spawn(executor: Arc<CommandExecutor>) -> Result<Self> {
        Self::spawn_with_observer(executor, Box::new(|_, _| {}))
    }

    /// Start the worker thread, calling `observer` after every executed command.
    pub fn spawn_with_observer(
        executor: Arc<CommandExecutor>,
        observer: OutcomeObserver,
    ) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let handle = thread::Builder::new()
            .name("filecutter-worker".into())
            .spawn(move || {
                while let Ok(command) = receiver.recv() {
                    let result =
                        panic::catch_unwind(AssertUnwindSafe(|| executor.execute(command)));
                    match result {
                        Ok(outcome) => observer(command, &outcome),
                        Err(_) => tracing::error!(
                            command = command.as_str(),
                            "command panicked; worker continues"
                        ),
                    }
                }
                tracing::debug!("command worker stopped");
            })
            .context("failed to spawn command worker")?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a command. Returns `false` once the worker has shut down.
    pub fn submit(&self, command: Command) -> bool {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.send(command).is_ok(),
            None => false,
        }
    }

    /// Stop accepting commands, finish the queued ones, and join the thread.
    pub fn shutdown(&self) {
        self.sender.lock().take();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("command worker exited abnormally");
            }
        }
    }
}

impl Drop for CommandWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
