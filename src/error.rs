use std::fmt;

/// Errors that can occur before the main event loop takes over.
///
/// Everything past `setup()` runs in the infallible dispatch loop; X races
/// there are absorbed by the installed error handler, not propagated here.
#[derive(Debug)]
pub enum WmError {
    DisplayOpenFailed,
    NoScreens,
    AnotherWmRunning,
    InvalidUsage(String),
}

impl fmt::Display for WmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmError::DisplayOpenFailed => write!(f, "cannot open X display"),
            WmError::NoScreens => write!(f, "no screens associated with display"),
            WmError::AnotherWmRunning => {
                write!(f, "another window manager is already running")
            }
            WmError::InvalidUsage(got) => write!(f, "usage: rdwm [-v] (got: {})", got),
        }
    }
}

impl std::error::Error for WmError {}
