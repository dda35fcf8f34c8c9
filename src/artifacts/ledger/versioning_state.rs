use crate::artifacts::changescript::script_id::ScriptId;

/// Names of the version pointers as stored in the meta table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// Most recently applied changescript (or the baseline)
    CurrentVersion,
    /// `CurrentVersion` as it was when the last checkout started
    FallbackVersion,
    /// Most recent changescript whose execution failed
    LastExceptionVersion,
}

impl MetaKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKey::CurrentVersion => "current_version",
            MetaKey::FallbackVersion => "fallback_version",
            MetaKey::LastExceptionVersion => "last_exception_version",
        }
    }
}

impl std::fmt::Display for MetaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of all three version pointers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersioningState {
    pub current_version: ScriptId,
    pub fallback_version: Option<ScriptId>,
    pub last_exception_version: Option<ScriptId>,
}

impl Default for VersioningState {
    fn default() -> Self {
        Self {
            current_version: ScriptId::baseline(),
            fallback_version: None,
            last_exception_version: None,
        }
    }
}
