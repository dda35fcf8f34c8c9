use crate::artifacts::changescript::script_id::ScriptId;
use derive_new::new;
use std::path::{Path, PathBuf};

/// A changescript as enumerated by a source
///
/// Only the identity and the location of the statement text are carried; the
/// text itself is read on demand through the source so that listing stays cheap.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Changescript {
    id: ScriptId,
    path: PathBuf,
}

impl Changescript {
    pub fn id(&self) -> &ScriptId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ord for Changescript {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Changescript {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
