//! Download progress value type
//!
//! A transfer's completion is tracked as a fraction in [0, 1] with a
//! distinguished "done" value and a percentage rendering for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion fraction of a media transfer
///
/// Values are clamped to [0.0, 1.0] on construction. `Progress::DONE`
/// marks a completed transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    /// Completed transfer
    pub const DONE: Progress = Progress(1.0);

    /// Create a progress value, clamping the fraction to [0.0, 1.0]
    pub fn new(fraction: f64) -> Self {
        Self(fraction.clamp(0.0, 1.0))
    }

    /// Raw fraction in [0.0, 1.0]
    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// Whether the transfer has completed
    pub fn is_done(&self) -> bool {
        self.0 >= 1.0
    }

    /// Integer percentage in [0, 100]
    pub fn percent(&self) -> u32 {
        (self.0 * 100.0) as u32
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rendering() {
        assert_eq!(Progress::new(0.42).to_string(), "42%");
        assert_eq!(Progress::new(0.0).to_string(), "0%");
        assert_eq!(Progress::DONE.to_string(), "100%");
    }

    #[test]
    fn test_done_detection() {
        assert!(Progress::DONE.is_done());
        assert!(!Progress::new(0.999).is_done());
        assert!(!Progress::default().is_done());
    }

    #[test]
    fn test_fraction_is_clamped() {
        assert_eq!(Progress::new(1.5), Progress::DONE);
        assert_eq!(Progress::new(-0.5), Progress::new(0.0));
    }

    #[test]
    fn test_serializes_as_bare_fraction() {
        let json = serde_json::to_string(&Progress::new(0.25)).unwrap();
        assert_eq!(json, "0.25");

        let parsed: Progress = serde_json::from_str("1.0").unwrap();
        assert!(parsed.is_done());
    }
}
