//! Moving cut files into their destination.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::model::{MoveOutcome, MoveReport};

/// Moves a batch of paths into a directory, reporting one outcome per path.
pub trait Mover: Send + Sync {
    fn move_all(&self, sources: &[PathBuf], destination: &Path) -> Vec<MoveReport>;
}

impl<T: Mover + ?Sized> Mover for Arc<T> {
    fn move_all(&self, sources: &[PathBuf], destination: &Path) -> Vec<MoveReport> {
        (**self).move_all(sources, destination)
    }
}

/// Renames files into place without ever overwriting an existing entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMover;

impl FileMover {
    pub fn new() -> Self {
        Self
    }

    /// Move one path. Missing sources and occupied destinations are skipped untouched.
    pub fn move_one(&self, source: &Path, destination_dir: &Path) -> MoveReport {
        let Some(file_name) = source.file_name() else {
            return MoveReport {
                source: source.to_path_buf(),
                destination: None,
                outcome: MoveOutcome::Failed("source path has no file name".into()),
            };
        };
        let target = destination_dir.join(file_name);

        let outcome = if !entry_exists(source) {
            MoveOutcome::SourceMissing
        } else if entry_exists(&target) {
            MoveOutcome::DestinationConflict
        } else {
            match fs::rename(source, &target) {
                Ok(()) => MoveOutcome::Moved,
                Err(err) => MoveOutcome::Failed(err.to_string()),
            }
        };

        MoveReport {
            source: source.to_path_buf(),
            destination: Some(target),
            outcome,
        }
    }
}

impl Mover for FileMover {
    fn move_all(&self, sources: &[PathBuf], destination: &Path) -> Vec<MoveReport> {
        let reports: Vec<MoveReport> = sources
            .iter()
            .map(|source| self.move_one(source, destination))
            .collect();

        for report in &reports {
            log_report(report);
        }
        reports
    }
}

/// `symlink_metadata` so a dangling symlink still counts as an entry.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn log_report(report: &MoveReport) {
    let source = report.source.display();
    match &report.outcome {
        MoveOutcome::Moved => {
            let destination = report.destination.as_deref().unwrap_or(Path::new(""));
            tracing::info!(%source, destination = %destination.display(), "moved");
        }
        MoveOutcome::SourceMissing => tracing::warn!(%source, "source no longer exists"),
        MoveOutcome::DestinationConflict => {
            tracing::warn!(%source, "destination already exists, skipped")
        }
        MoveOutcome::Failed(reason) => tracing::error!(%source, %reason, "move failed"),
    }
}

/// Counts of each outcome in a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub moved: usize,
    pub missing: usize,
    pub conflicts: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[MoveReport]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match report.outcome {
                    MoveOutcome::Moved => summary.moved += 1,
                    MoveOutcome::SourceMissing => summary.missing += 1,
                    MoveOutcome::DestinationConflict => summary.conflicts += 1,
                    MoveOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.moved + self.missing + self.conflicts + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;

    #[test]
    fn moves_file_into_destination() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let source = temp.path().join("doc.txt");
        let archive = temp.path().join("Archive");
        fs::write(&source, "hello")?;
        fs::create_dir(&archive)?;

        let reports = FileMover::new().move_all(&[source.clone()], &archive);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, MoveOutcome::Moved);
        assert_eq!(reports[0].destination, Some(archive.join("doc.txt")));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(archive.join("doc.txt"))?, "hello");
        Ok(())
    }

    #[test]
    fn conflict_leaves_both_files_intact() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let source = temp.path().join("report.txt");
        let archive = temp.path().join("Archive");
        fs::create_dir(&archive)?;
        fs::write(&source, "new contents")?;
        fs::write(archive.join("report.txt"), "old contents")?;

        let reports = FileMover::new().move_all(&[source.clone()], &archive);

        assert_eq!(reports[0].outcome, MoveOutcome::DestinationConflict);
        assert_eq!(fs::read_to_string(&source)?, "new contents");
        assert_eq!(
            fs::read_to_string(archive.join("report.txt"))?,
            "old contents"
        );
        Ok(())
    }

    #[test]
    fn missing_source_does_not_stop_the_batch() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("gone.txt");
        let present = temp.path().join("here.txt");
        let archive = temp.path().join("Archive");
        fs::create_dir(&archive)?;
        fs::write(&present, "still here")?;

        let reports = FileMover::new().move_all(&[missing, present.clone()], &archive);

        let outcomes: Vec<_> = reports.iter().map(|r| r.outcome.clone()).collect();
        assert_eq!(outcomes, vec![MoveOutcome::SourceMissing, MoveOutcome::Moved]);
        assert!(archive.join("here.txt").exists());
        Ok(())
    }

    #[test]
    fn moves_directories_whole() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let folder = temp.path().join("photos");
        fs::create_dir_all(folder.join("2024"))?;
        fs::write(folder.join("2024/beach.jpg"), "jpg")?;
        let archive = temp.path().join("Archive");
        fs::create_dir(&archive)?;

        let reports = FileMover::new().move_all(&[folder.clone()], &archive);

        assert_eq!(reports[0].outcome, MoveOutcome::Moved);
        assert!(!folder.exists());
        assert!(archive.join("photos/2024/beach.jpg").exists());
        Ok(())
    }

    #[test]
    fn missing_destination_directory_is_a_failure() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let source = temp.path().join("doc.txt");
        fs::write(&source, "hello")?;

        let reports = FileMover::new().move_all(&[source.clone()], &temp.path().join("nope"));

        assert!(matches!(reports[0].outcome, MoveOutcome::Failed(_)));
        assert!(source.exists());
        Ok(())
    }

    #[test]
    fn root_path_has_no_file_name() {
        let report = FileMover::new().move_one(Path::new("/"), Path::new("/tmp"));
        assert_eq!(report.destination, None);
        assert!(matches!(report.outcome, MoveOutcome::Failed(_)));
    }

    #[test]
    fn summary_counts_each_outcome() {
        let report = |outcome| MoveReport {
            source: "/a".into(),
            destination: None,
            outcome,
        };
        let summary = BatchSummary::from_reports(&[
            report(MoveOutcome::Moved),
            report(MoveOutcome::Moved),
            report(MoveOutcome::SourceMissing),
            report(MoveOutcome::Failed("io".into())),
        ]);
        assert_eq!(summary.moved, 2);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.conflicts, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 4);
    }
}
