use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

/// Boxed future returned by the collaborator traits (`RunStore`,
/// `ResearchProvider`) so they stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reason code attached to every journal line.
///
/// The string form (`DR_*`) is what lands in the log file and is stable;
/// offline tooling greps for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    Disabled,
    PromptPathMissing,
    EnvPathMissing,
    Busy,
    InitFailed,
    PromptReadFailed,
    NoteReadFailed,
    Started,
    RequestFailed,
    PersistFailed,
    CheckFailed,
    Abandoned,
    CompletedOk,
    WriteFailed,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::Disabled => "DR_DISABLED",
            ReasonCode::PromptPathMissing => "DR_PROMPT_PATH_MISSING",
            ReasonCode::EnvPathMissing => "DR_ENV_PATH_MISSING",
            ReasonCode::Busy => "DR_BUSY",
            ReasonCode::InitFailed => "DR_INIT_FAILED",
            ReasonCode::PromptReadFailed => "DR_PROMPT_READ_FAILED",
            ReasonCode::NoteReadFailed => "DR_NOTE_READ_FAILED",
            ReasonCode::Started => "DR_STARTED",
            ReasonCode::RequestFailed => "DR_REQUEST_FAILED",
            ReasonCode::PersistFailed => "DR_PERSIST_FAILED",
            ReasonCode::CheckFailed => "DR_CHECK_FAILED",
            ReasonCode::Abandoned => "DR_ABANDONED",
            ReasonCode::CompletedOk => "DR_OK",
            ReasonCode::WriteFailed => "DR_WRITE_FAILED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasonCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DR_DISABLED" => Ok(ReasonCode::Disabled),
            "DR_PROMPT_PATH_MISSING" => Ok(ReasonCode::PromptPathMissing),
            "DR_ENV_PATH_MISSING" => Ok(ReasonCode::EnvPathMissing),
            "DR_BUSY" => Ok(ReasonCode::Busy),
            "DR_INIT_FAILED" => Ok(ReasonCode::InitFailed),
            "DR_PROMPT_READ_FAILED" => Ok(ReasonCode::PromptReadFailed),
            "DR_NOTE_READ_FAILED" => Ok(ReasonCode::NoteReadFailed),
            "DR_STARTED" => Ok(ReasonCode::Started),
            "DR_REQUEST_FAILED" => Ok(ReasonCode::RequestFailed),
            "DR_PERSIST_FAILED" => Ok(ReasonCode::PersistFailed),
            "DR_CHECK_FAILED" => Ok(ReasonCode::CheckFailed),
            "DR_ABANDONED" => Ok(ReasonCode::Abandoned),
            "DR_OK" => Ok(ReasonCode::CompletedOk),
            "DR_WRITE_FAILED" => Ok(ReasonCode::WriteFailed),
            other => Err(format!("unknown reason code: {other}")),
        }
    }
}

/// Who gets to see a failure.
///
/// - `UserFacing`: notifier + journal.
/// - `Silent`: journal (and tracing) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    UserFacing,
    Silent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_parse_back_from_their_log_form() {
        for code in [
            ReasonCode::Disabled,
            ReasonCode::Started,
            ReasonCode::CompletedOk,
            ReasonCode::WriteFailed,
        ] {
            assert_eq!(code.as_str().parse::<ReasonCode>(), Ok(code));
        }
        assert!("DR_NOPE".parse::<ReasonCode>().is_err());
    }
}
