/// Fatal, user-facing error: configuration problems and filesystem writes.
///
/// Fetch failures never become an `AppError`; see [`FetchError`].
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    /// `exit_code` becomes the process exit status; every fatal path in this
    /// crate (bad configuration, unwritable output) uses 2.
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Status handed to `std::process::ExitCode` by `main`. A run that only
    /// had fetch failures never produces an `AppError`, so it still exits 0.
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

/// Failure of a single fetch unit (one country for WDI, one indicator for WEO).
///
/// Fetchers catch these at the unit boundary, log them and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS).
    Http(String),
    /// Non-success HTTP status.
    Status(u16),
    /// Body was not valid JSON.
    Decode(String),
    /// JSON was valid but not in a shape we can normalize.
    Shape(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(msg) => write!(f, "request failed: {msg}"),
            FetchError::Status(code) => write!(f, "request failed with status {code}"),
            FetchError::Decode(msg) => write!(f, "failed to decode response: {msg}"),
            FetchError::Shape(msg) => write!(f, "unexpected response shape: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
