//! Submit success decision.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of comparing a response status with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCheck {
    /// The response counts as a success.
    Success,
    /// The response status differs from the expected one.
    Failure,
}

/// The HTTP status a submit response must carry to count as a success.
///
/// `0` disables the check: every completed response is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuccessStatus(u16);

impl SuccessStatus {
    /// Status checking disabled.
    pub const DISABLED: Self = Self(0);

    /// Highest status code accepted as configuration.
    pub const MAX: u16 = 999;

    /// Creates a success status from a raw code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the raw status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Returns true when status checking is disabled.
    #[must_use]
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }

    /// Compares an actual response status with this expectation.
    #[must_use]
    pub const fn check(self, actual: u16) -> StatusCheck {
        if self.is_disabled() || self.0 == actual {
            StatusCheck::Success
        } else {
            StatusCheck::Failure
        }
    }

    /// Parses a configured status; `None` when it is not a number in `0..=999`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u16>()
            .ok()
            .filter(|code| *code <= Self::MAX)
            .map(Self)
    }
}

impl Default for SuccessStatus {
    fn default() -> Self {
        Self(200)
    }
}

impl fmt::Display for SuccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_expects_200() {
        let status = SuccessStatus::default();
        assert_eq!(status.check(200), StatusCheck::Success);
        assert_eq!(status.check(201), StatusCheck::Failure);
        assert_eq!(status.check(500), StatusCheck::Failure);
    }

    #[test]
    fn zero_disables_checking() {
        let status = SuccessStatus::DISABLED;
        for actual in [0, 200, 204, 404, 500] {
            assert_eq!(status.check(actual), StatusCheck::Success);
        }
    }

    #[test]
    fn exact_match_only() {
        let status = SuccessStatus::new(204);
        assert_eq!(status.check(204), StatusCheck::Success);
        assert_eq!(status.check(200), StatusCheck::Failure);
    }

    #[test]
    fn parse_rejects_non_numbers_and_out_of_range() {
        assert_eq!(SuccessStatus::parse(" 201 "), Some(SuccessStatus::new(201)));
        assert_eq!(SuccessStatus::parse("0"), Some(SuccessStatus::DISABLED));
        assert_eq!(SuccessStatus::parse("abc"), None);
        assert_eq!(SuccessStatus::parse("1000"), None);
        assert_eq!(SuccessStatus::parse("-1"), None);
    }
}
