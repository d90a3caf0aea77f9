// SPDX: CC0-1.0

/// Result of a validating operation: success plus diagnostics for the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    success: bool,
    messages: Vec<String>,
}

impl Outcome {
    pub const fn success() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
        }
    }

    pub fn failure(messages: Vec<String>) -> Self {
        Self {
            success: false,
            messages,
        }
    }

    /// Succeeds exactly when there is nothing to report.
    pub fn from_messages(messages: Vec<String>) -> Self {
        Self {
            success: messages.is_empty(),
            messages,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.success
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}
