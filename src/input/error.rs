//! Input parsing errors

use std::fmt;
use std::error::Error;

/// Why did Config::read fail?
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum InputErrorKind {
    File,
    Location,
    Conversion,
    Invalid,
}

/// Error returned when reading the configuration, or the tables
/// it refers to, fails.
pub struct InputError {
    kind: InputErrorKind,
    path: String,
    cause: String,
}

impl fmt::Debug for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let help_msg = "Usage: ./dotterel input-file";
        match self.kind {
            InputErrorKind::File => write!(f, "Unable to open file \"{}\".\n{}", self.path, help_msg),
            InputErrorKind::Location => write!(f, "Failed to follow specified path \"{}\": component \"{}\" is missing.\n{}", self.path, self.cause, help_msg),
            InputErrorKind::Conversion => write!(f, "Could not convert field \"{}\" to target type.\n{}", self.cause, help_msg),
            InputErrorKind::Invalid => write!(f, "Value of \"{}\" is not valid: {}.\n{}", self.path, self.cause, help_msg),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for InputError {}

impl InputError {
    pub fn file(path: &str) -> Self {
        Self {
            kind: InputErrorKind::File,
            path: path.to_owned(),
            cause: String::new(),
        }
    }

    pub fn location(path: &str, cause: &str) -> Self {
        Self {
            kind: InputErrorKind::Location,
            path: path.to_owned(),
            cause: cause.to_owned(),
        }
    }

    pub fn conversion(path: &str, cause: &str) -> Self {
        Self {
            kind: InputErrorKind::Conversion,
            path: path.to_owned(),
            cause: cause.to_owned(),
        }
    }

    /// The value was read successfully, but is not acceptable, e.g.
    /// a down-sampling factor of zero.
    pub fn invalid(path: &str, cause: &str) -> Self {
        Self {
            kind: InputErrorKind::Invalid,
            path: path.to_owned(),
            cause: cause.to_owned(),
        }
    }

    pub fn kind(&self) -> InputErrorKind {
        self.kind
    }
}
