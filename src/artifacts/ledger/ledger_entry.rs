use crate::artifacts::changescript::script_id::ScriptId;
use chrono::{DateTime, Utc};
use derive_new::new;

/// Append-only record of a changescript that was applied successfully
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LedgerEntry {
    id: ScriptId,
    applied_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn id(&self) -> &ScriptId {
        &self.id
    }

    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    pub fn readable_timestamp(&self) -> String {
        self.applied_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}
