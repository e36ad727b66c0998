//! Lookup outcomes
//!
//! A missing key is an expected result, not a failure: operations that can
//! miss return `StoreResult<Outcome<T>>`, keeping `Err` for systems errors.

use super::errors::{StoreError, StoreResult};

/// Result of a keyed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The key was present
    Found(T),
    /// The key was absent
    Missing { key: String },
}

impl<T> Outcome<T> {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Outcome::Missing { key: key.into() }
    }

    /// Returns whether the key was present
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    /// Borrow the value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Found(v) => Some(v),
            Outcome::Missing { .. } => None,
        }
    }

    /// Take the value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Found(v) => Some(v),
            Outcome::Missing { .. } => None,
        }
    }

    /// Convert a miss into `StoreError::KeyNotFound`
    pub fn into_result(self) -> StoreResult<T> {
        match self {
            Outcome::Found(v) => Ok(v),
            Outcome::Missing { key } => Err(StoreError::KeyNotFound(key)),
        }
    }

    /// Transform a found value, passing a miss through unchanged
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Found(v) => Outcome::Found(f(v)),
            Outcome::Missing { key } => Outcome::Missing { key },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found() {
        let outcome = Outcome::Found(1);
        assert!(outcome.is_found());
        assert_eq!(outcome.value(), Some(&1));
        assert_eq!(outcome.map(|v| v + 1).into_result().unwrap(), 2);
    }

    #[test]
    fn test_missing_into_result() {
        let outcome: Outcome<i32> = Outcome::missing("b");
        assert!(!outcome.is_found());
        assert_eq!(outcome.clone().into_value(), None);
        assert_eq!(outcome.clone().map(|v| v + 1), Outcome::missing("b"));
        assert_eq!(
            outcome.into_result().unwrap_err(),
            StoreError::KeyNotFound("b".into())
        );
    }
}
