//! Changescript naming and identity
//!
//! A changescript is a file named after a strictly increasing numeric token,
//! e.g. `20230501120000.sql`. The token is both the script's identity (as the
//! file stem, verbatim) and its ordering key (parsed as an integer).
//!
//! - `script_id`: typed identifier with an explicit numeric ordering key
//! - `changescript`: a listed script and where its statement text lives

pub mod changescript;
pub mod script_id;

/// File extension carried by every changescript
pub const SCRIPT_EXTENSION: &str = "sql";

/// Pattern a file name must match to be picked up as a changescript
pub const SCRIPT_FILE_REGEX: &str = r"^([0-9]+)\.sql$";

/// Pattern a bare identifier must match
pub const SCRIPT_ID_REGEX: &str = r"^[0-9]+$";
