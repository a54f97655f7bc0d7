//! Run length validation

use crate::error::ValidationError;

/// A validated, positive run length in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLength(u32);

impl RunLength {
    pub const MIN: RunLength = RunLength(1);

    pub fn new(minutes: i64) -> Result<Self, ValidationError> {
        if minutes <= 0 {
            return Err(ValidationError::NotPositive(minutes));
        }
        u32::try_from(minutes)
            .map(RunLength)
            .map_err(|_| ValidationError::NotANumber(minutes.to_string()))
    }

    /// Parse free-form user input
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let minutes = input
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotANumber(input.to_string()))?;
        Self::new(minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn seconds(self) -> i64 {
        i64::from(self.0) * 60
    }
}
