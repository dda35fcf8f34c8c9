use std::path::PathBuf;
use std::time::Duration;

/// What a checkout does after a changescript fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep going with the next changescript
    #[default]
    Continue,
    /// Record the failure and stop; later changescripts are left pending
    Abort,
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub failure_policy: FailurePolicy,
    /// Upper bound on the run time of a single changescript
    pub script_timeout: Option<Duration>,
    /// Lock file held for the whole run, shared by every process using the database
    pub lock_file: Option<PathBuf>,
}
