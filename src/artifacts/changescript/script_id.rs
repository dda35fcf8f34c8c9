use crate::artifacts::changescript::{SCRIPT_EXTENSION, SCRIPT_FILE_REGEX, SCRIPT_ID_REGEX};
use crate::artifacts::core::error::VersioningError;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

static SCRIPT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCRIPT_ID_REGEX).expect("Invalid changescript id pattern"));

static SCRIPT_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCRIPT_FILE_REGEX).expect("Invalid changescript file pattern"));

/// Identifier of the pointer value written before any changescript is applied
pub const BASELINE_VERSION: &str = "0";

/// Changescript identifier
///
/// The identifier is the file stem exactly as authored (leading zeros are kept,
/// so `0100` and `100` are different identities). Ordering never looks at the
/// text: it compares the numeric key extracted from it, so `9` sorts before `10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptId {
    key: u64,
    name: String,
}

impl ScriptId {
    /// Parse a bare identifier such as `20230501120000`
    pub fn try_parse(name: &str) -> Result<Self, VersioningError> {
        if !SCRIPT_ID_PATTERN.is_match(name) {
            return Err(VersioningError::InvalidScriptName(name.to_string()));
        }

        let key = name
            .parse::<u64>()
            .map_err(|_| VersioningError::InvalidScriptName(name.to_string()))?;

        Ok(Self {
            key,
            name: name.to_string(),
        })
    }

    /// Extract the identifier from a changescript file name
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the name does not follow the changescript convention
    /// (such files are not changescripts at all), an error when it does but the
    /// token cannot be used as an ordering key.
    pub fn try_from_file_name(file_name: &str) -> Result<Option<Self>, VersioningError> {
        match SCRIPT_FILE_PATTERN.captures(file_name) {
            Some(captures) => Self::try_parse(&captures[1])
                .map(Some)
                .map_err(|_| VersioningError::InvalidScriptName(file_name.to_string())),
            None => Ok(None),
        }
    }

    /// Build the canonical identifier for a numeric key (no padding)
    pub fn from_key(key: u64) -> Self {
        Self {
            key,
            name: key.to_string(),
        }
    }

    pub fn baseline() -> Self {
        Self::from_key(0)
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, SCRIPT_EXTENSION)
    }
}

impl Ord for ScriptId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ScriptId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for ScriptId {
    type Err = VersioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

impl AsRef<str> for ScriptId {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
