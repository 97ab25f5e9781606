/// Error type carried through the CLI and IO layers.
///
/// The forecaster itself never fails; this is for bad input files, invalid
/// settings and export failures. `exit_code` is what `ptrend` exits with:
/// `2` for bad input or configuration, `4` for I/O or internal failures.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Shorthand for a bad-input / bad-config error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Shorthand for an I/O or internal error (exit code 4).
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthands_pick_exit_codes() {
        assert_eq!(AppError::input("bad flag").exit_code(), 2);
        assert_eq!(AppError::io("disk full").exit_code(), 4);
        assert_eq!(AppError::new(3, "x").to_string(), "x");
    }
}
