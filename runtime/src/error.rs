use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exit code attached to every processor error.
///
/// Codes below [`ExitCode::FIRST_USER_EXIT_CODE`] mark fatal conditions:
/// corrupted state or a bug, never a rejection the submitter caused. The
/// block processor must abort block application when it sees one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitCode {
    value: u32,
}

impl ExitCode {
    pub const OK: ExitCode = ExitCode::new(0);

    /// A store read contradicts an invariant the chain guarantees.
    pub const SYS_ILLEGAL_STATE: ExitCode = ExitCode::new(1);
    /// An internal consistency check failed.
    pub const SYS_ASSERTION_FAILED: ExitCode = ExitCode::new(2);

    /// The first exit code a processor may report for a user-caused
    /// rejection. Processors define their own codes from 32 up.
    pub const FIRST_USER_EXIT_CODE: u32 = 16;

    pub const USR_ILLEGAL_ARGUMENT: ExitCode = ExitCode::new(16);
    pub const USR_NOT_FOUND: ExitCode = ExitCode::new(17);
    pub const USR_FORBIDDEN: ExitCode = ExitCode::new(18);

    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    pub const fn value(self) -> u32 {
        self.value
    }

    pub fn is_success(self) -> bool {
        self.value == 0
    }

    /// True for codes that must abort the surrounding block application.
    pub fn is_fatal(self) -> bool {
        !self.is_success() && self.value < Self::FIRST_USER_EXIT_CODE
    }
}

impl Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The error type returned by processor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ProcessorError(exit_code: {exit_code:?}, msg: {msg})")]
pub struct ProcessorError {
    exit_code: ExitCode,
    /// Message for debugging purposes,
    msg: String,
}

impl ProcessorError {
    /// Creates a new ProcessorError. This method does not check that the code
    /// is in the range of valid processor abort codes.
    pub fn unchecked(code: ExitCode, msg: String) -> Self {
        Self { exit_code: code, msg }
    }

    pub fn illegal_argument(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_ILLEGAL_ARGUMENT, msg }
    }
    pub fn not_found(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_NOT_FOUND, msg }
    }
    pub fn forbidden(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_FORBIDDEN, msg }
    }
    pub fn illegal_state(msg: String) -> Self {
        Self { exit_code: ExitCode::SYS_ILLEGAL_STATE, msg }
    }
    pub fn assertion_failed(msg: String) -> Self {
        Self { exit_code: ExitCode::SYS_ASSERTION_FAILED, msg }
    }

    /// Returns the exit code of the error.
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// True when the error indicates corrupted state or a bug rather than a
    /// rejection of the submitted transaction.
    pub fn is_fatal(&self) -> bool {
        self.exit_code.is_fatal()
    }

    /// Error message of the processor error.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Prefix error message with a string message.
    pub fn wrap(mut self, msg: impl AsRef<str>) -> Self {
        self.msg = format!("{}: {}", msg.as_ref(), self.msg);
        self
    }
}

/// Convenience macro for generating processor errors
#[macro_export]
macro_rules! processor_error {
    // Error with only one stringable expression
    ( $code:ident; $msg:expr ) => { $crate::ProcessorError::$code($msg.to_string()) };

    // String with positional arguments
    ( $code:ident; $msg:literal $(, $ex:expr)+ ) => {
        $crate::ProcessorError::$code(format!($msg, $($ex,)*))
    };

    // Error with only one stringable expression, with comma separator
    ( $code:ident, $msg:expr ) => { $crate::processor_error!($code; $msg) };

    // String with positional arguments, with comma separator
    ( $code:ident, $msg:literal $(, $ex:expr)+ ) => {
        $crate::processor_error!($code; $msg $(, $ex)*)
    };
}

// Adds context to a processor error's descriptive message.
pub trait ErrorContext<T> {
    fn context<C>(self, context: C) -> Result<T, ProcessorError>
    where
        C: Display + 'static;

    fn with_context<C, F>(self, f: F) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C;
}

impl<T> ErrorContext<T> for Result<T, ProcessorError> {
    fn context<C>(self, context: C) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
    {
        self.map_err(|mut err| {
            err.msg = format!("{}: {}", context, err.msg);
            err
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|mut err| {
            err.msg = format!("{}: {}", f(), err.msg);
            err
        })
    }
}

// Adapts a target into a processor error.
pub trait AsProcessorError<T>: Sized {
    fn exit_code(self, code: ExitCode) -> Result<T, ProcessorError>;

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ProcessorError>
    where
        C: Display + 'static;

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Display> AsProcessorError<T> for Result<T, E> {
    fn exit_code(self, code: ExitCode) -> Result<T, ProcessorError> {
        self.map_err(|err| ProcessorError { exit_code: code, msg: err.to_string() })
    }

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
    {
        self.map_err(|err| ProcessorError { exit_code: code, msg: format!("{}: {}", context, err) })
    }

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| ProcessorError { exit_code: code, msg: format!("{}: {}", f(), err) })
    }
}

impl<T> AsProcessorError<T> for Option<T> {
    fn exit_code(self, code: ExitCode) -> Result<T, ProcessorError> {
        self.ok_or_else(|| ProcessorError { exit_code: code, msg: "None".to_string() })
    }

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
    {
        self.ok_or_else(|| ProcessorError { exit_code: code, msg: context.to_string() })
    }

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ProcessorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| ProcessorError { exit_code: code, msg: f().to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_codes_sit_below_the_user_range() {
        assert!(ExitCode::SYS_ILLEGAL_STATE.is_fatal());
        assert!(ExitCode::SYS_ASSERTION_FAILED.is_fatal());
        assert!(!ExitCode::OK.is_fatal());
        assert!(!ExitCode::USR_NOT_FOUND.is_fatal());
        assert!(!ExitCode::new(32).is_fatal());
    }

    #[test]
    fn wrap_prefixes_the_message() {
        let err = processor_error!(not_found; "account {} does not exist", 7)
            .wrap("processing contract 0");
        assert_eq!(err.exit_code(), ExitCode::USR_NOT_FOUND);
        assert_eq!(err.msg(), "processing contract 0: account 7 does not exist");
    }

    #[test]
    fn context_code_adapts_foreign_errors() {
        let res: Result<(), String> = Err("boom".to_string());
        let err = res.context_code(ExitCode::SYS_ILLEGAL_STATE, "loading account").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.msg(), "loading account: boom");
    }
}
