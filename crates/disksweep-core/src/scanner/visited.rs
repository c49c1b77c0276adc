/// Stack-scoped cycle guard for one traversal.
///
/// The set holds the canonical paths of the directories currently open on the
/// recursion stack, not every directory ever seen. Membership is acquired by
/// [`VisitedSet::enter`] and released when the returned [`VisitedFrame`] is
/// dropped, so an early return or a `?` on any path out of a frame can never
/// leak an entry.
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct VisitedSet {
    open: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a frame for `canonical`, or `None` if an ancestor frame for the
    /// same directory is still open (a cycle).
    ///
    /// The frame dereferences to the set so it can be handed to the next
    /// level of recursion.
    pub fn enter(&mut self, canonical: PathBuf) -> Option<VisitedFrame<'_>> {
        if !self.open.insert(canonical.clone()) {
            return None;
        }
        Some(VisitedFrame {
            set: self,
            path: canonical,
        })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.open.contains(path)
    }

    /// Number of frames currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

/// Membership of one directory in a [`VisitedSet`]; removed on drop.
#[derive(Debug)]
pub struct VisitedFrame<'a> {
    set: &'a mut VisitedSet,
    path: PathBuf,
}

impl Deref for VisitedFrame<'_> {
    type Target = VisitedSet;

    fn deref(&self) -> &VisitedSet {
        self.set
    }
}

impl DerefMut for VisitedFrame<'_> {
    fn deref_mut(&mut self) -> &mut VisitedSet {
        self.set
    }
}

impl Drop for VisitedFrame<'_> {
    fn drop(&mut self) {
        self.set.open.remove(&self.path);
    }
}
