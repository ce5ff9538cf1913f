//! Executing recognized chords against the cut set.

use std::path::PathBuf;

use crate::app::cut::CutSet;
use crate::app::mover::{BatchSummary, Mover};
use crate::domain::model::{Command, MoveReport};
use crate::infra::finder::SelectionProvider;

/// What a single chord accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordOutcome {
    /// The selection replaced the cut set. A count of zero means nothing was selected.
    Cut { count: usize },
    /// Paste with nothing pending; no query or move happened.
    ///
    /// Reported even when the directory would also have been unavailable, since the empty
    /// cut set is checked first.
    NothingCut,
    /// Paste where the target directory could not be resolved; the cut set is untouched.
    DirectoryUnavailable { pending: usize },
    /// A move batch ran and the cut set was cleared.
    Pasted {
        destination: PathBuf,
        reports: Vec<MoveReport>,
    },
}

/// Owns the cut set and the collaborators needed to fill and drain it.
pub struct CommandExecutor {
    cut: CutSet,
    provider: Box<dyn SelectionProvider>,
    mover: Box<dyn Mover>,
}

impl CommandExecutor {
    pub fn new(provider: impl SelectionProvider + 'static, mover: impl Mover + 'static) -> Self {
        Self {
            cut: CutSet::new(),
            provider: Box::new(provider),
            mover: Box::new(mover),
        }
    }

    /// Read-only view of the pending cut set.
    pub fn cut_set(&self) -> &CutSet {
        &self.cut
    }

    pub fn execute(&self, command: Command) -> ChordOutcome {
        match command {
            Command::Cut => self.cut(),
            Command::Paste => self.paste(),
        }
    }

    fn cut(&self) -> ChordOutcome {
        let selection = self.provider.current_selection();
        let count = selection.len();
        if count == 0 {
            tracing::warn!("no files selected for cutting");
        } else {
            tracing::info!(count, paths = ?selection, "cut set populated");
        }
        self.cut.set(selection);
        ChordOutcome::Cut { count }
    }

    fn paste(&self) -> ChordOutcome {
        if self.cut.is_empty() {
            tracing::warn!("paste requested but nothing has been cut");
            return ChordOutcome::NothingCut;
        }

        let Some(destination) = self.provider.current_directory() else {
            let pending = self.cut.len();
            tracing::error!(pending, "could not determine the destination folder");
            return ChordOutcome::DirectoryUnavailable { pending };
        };

        let sources = self.cut.take();
        if sources.is_empty() {
            return ChordOutcome::NothingCut;
        }

        let reports = self.mover.move_all(&sources, &destination);
        let summary = BatchSummary::from_reports(&reports);
        tracing::info!(
            destination = %destination.display(),
            moved = summary.moved,
            missing = summary.missing,
            conflicts = summary.conflicts,
            failed = summary.failed,
            "paste finished"
        );

        ChordOutcome::Pasted {
            destination,
            reports,
        }
    }
}
