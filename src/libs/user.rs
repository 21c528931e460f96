use crate::libs::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static contact urgency of a user, 0 (called first) to 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PriorityClass(u8);

impl PriorityClass {
    pub const MAX: u8 = 2;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for PriorityClass {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(PriorityClass(value as u8))
        } else {
            Err(Error::invalid(format!("priority class must be between 0 and {}, got {}", Self::MAX, value)))
        }
    }
}

impl From<PriorityClass> for i64 {
    fn from(class: PriorityClass) -> Self {
        class.0 as i64
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    /// Digits only, country code included. Dialled as `+<digits>`.
    pub phone_number: String,
    pub priority_class: PriorityClass,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(phone_number: &str, priority_class: PriorityClass) -> Result<Self> {
        Ok(User {
            id: None,
            phone_number: normalize_phone(phone_number)?,
            priority_class,
            created_at: None,
        })
    }

    pub fn dial_string(&self) -> String {
        format!("+{}", self.phone_number)
    }
}

/// Strips a leading `+` and common separators; rejects anything else that is not a digit.
pub fn normalize_phone(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = trimmed.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid(format!("'{}' is not a valid phone number", input)));
    }
    Ok(digits)
}
