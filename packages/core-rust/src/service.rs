//! The string service business contract and its canonical implementation.

use std::sync::Arc;

/// Method names used for log records and metric labels.
pub mod method_names {
    pub const UPPERCASE: &str = "uppercase";
    pub const COUNT: &str = "count";
}

/// Business failures that are part of an operation's documented contract.
///
/// These travel to the client as response data, never as transport faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// `uppercase` was called with the empty string.
    #[error("empty string")]
    EmptyInput,
}

/// Operations on strings.
///
/// Decorators implement this same trait around a wrapped `StringService`, so
/// any number of cross-cutting layers can be stacked in any order without
/// touching the business implementation. `count` deliberately has no failure
/// channel.
pub trait StringService: Send + Sync {
    /// Returns `s` converted to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyInput`] when `s` is empty.
    fn uppercase(&self, s: &str) -> Result<String, ServiceError>;

    /// Returns the number of characters in `s`.
    fn count(&self, s: &str) -> usize;
}

impl<T: StringService + ?Sized> StringService for Arc<T> {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        (**self).uppercase(s)
    }

    fn count(&self, s: &str) -> usize {
        (**self).count(s)
    }
}

impl<T: StringService + ?Sized> StringService for &T {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        (**self).uppercase(s)
    }

    fn count(&self, s: &str) -> usize {
        (**self).count(s)
    }
}

impl<T: StringService + ?Sized> StringService for Box<T> {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        (**self).uppercase(s)
    }

    fn count(&self, s: &str) -> usize {
        (**self).count(s)
    }
}

// ---------------------------------------------------------------------------
// BaseStringService
// ---------------------------------------------------------------------------

/// The one canonical `StringService`. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseStringService;

impl StringService for BaseStringService {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        if s.is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        Ok(s.to_uppercase())
    }

    fn count(&self, s: &str) -> usize {
        s.chars().count()
    }
}
