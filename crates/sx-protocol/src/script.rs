//! Script payload

use std::fmt;

use crate::error::ProtocolError;

/// Script text accepted for submission on the execute channel.
///
/// A `Script` is never blank: construction rejects text that is empty after
/// trimming. The text itself is sent verbatim, surrounding whitespace
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script(String);

impl Script {
    /// Validate script text
    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ProtocolError::EmptyScript);
        }
        Ok(Self(text))
    }

    /// Get the script text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the frame text
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_script_rejected() {
        for text in ["", "   ", "\n\t  \r\n"] {
            assert!(matches!(Script::new(text), Err(ProtocolError::EmptyScript)));
        }
    }

    #[test]
    fn test_script_keeps_surrounding_whitespace() {
        let script = Script::new("  print('hi')\n").unwrap();
        assert_eq!(script.as_str(), "  print('hi')\n");
        assert!(!script.is_empty());
    }
}
