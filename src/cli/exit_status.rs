use std::process::ExitCode;

/// Process exit status of a potsync run.
///
/// - `Success` (0): catalogs synced, or warnings were allowed
/// - `Failure` (1): warnings were reported under `--deny-warnings`, or `init` found an existing config
/// - `Error` (2): the run itself failed (bad config, unwritable output)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
