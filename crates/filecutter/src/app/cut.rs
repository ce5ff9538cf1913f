//! The pending cut set.

use std::path::PathBuf;

use parking_lot::Mutex;

/// Paths waiting to be pasted. Holds a single generation of cut files.
///
/// Every operation takes the lock for its full duration, so readers never see a half-replaced
/// set and [`CutSet::take`] cannot race with [`CutSet::set`].
#[derive(Debug, Default)]
pub struct CutSet {
    paths: Mutex<Vec<PathBuf>>,
}

impl CutSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `paths`. Earlier cuts are discarded, never merged.
    pub fn set(&self, paths: Vec<PathBuf>) {
        *self.paths.lock() = paths;
    }

    /// Return the current contents and leave the set empty.
    pub fn take(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.paths.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    /// Copy of the current contents for diagnostics.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }
}
