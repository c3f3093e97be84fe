use std::fmt::{self, Display};

use thiserror::Error;

/// Error type for invalid variable names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidVarNameError {
    #[error("Variable name cannot be empty")]
    Empty,

    #[error("Variable name must start with a letter or '.', got '{0}'")]
    InvalidStart(char),

    #[error("Variable name contains invalid character: '{0}'")]
    InvalidCharacter(char),
}

/// A VarName represents a validated identifier in the source language.
/// Names start with an ASCII letter or `.` and continue with letters,
/// digits, `.` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarName {
    value: String,
}

impl VarName {
    /// Create a new VarName from a string, validating it
    pub fn new(name: &str) -> Result<Self, InvalidVarNameError> {
        Self::validate(name)?;
        Ok(VarName {
            value: name.to_string(),
        })
    }

    fn validate(name: &str) -> Result<(), InvalidVarNameError> {
        let mut chars = name.chars();
        let Some(first_char) = chars.next() else {
            return Err(InvalidVarNameError::Empty);
        };

        if !(first_char.is_ascii_alphabetic() || first_char == '.') {
            return Err(InvalidVarNameError::InvalidStart(first_char));
        }

        for c in chars {
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_') {
                return Err(InvalidVarNameError::InvalidCharacter(c));
            }
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for VarName {
    type Error = InvalidVarNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(VarName { value })
    }
}
