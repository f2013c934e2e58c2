//! Recoverable error conditions of the manager.

use std::fmt::{Display, Formatter};

/// Errors reported by manager operations.
///
/// Invariant violations (undeclared levels, released slots, unbalanced
/// deactivation) are not represented here: they panic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BddError {
    /// A node, chunk or table could not be allocated, or the node limit was hit.
    Overflow,
    /// An edge created by another manager was passed to this one.
    ForeignManager,
    /// A function was constrained by the constant zero.
    EmptyConstraint,
    /// A set operation got an operand that is not a cube.
    NotACube,
}

/// Result type of manager operations.
pub type BddResult<T> = Result<T, BddError>;

impl Display for BddError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BddError::Overflow => write!(f, "node limit exceeded or out of memory"),
            BddError::ForeignManager => write!(f, "edge belongs to a different manager"),
            BddError::EmptyConstraint => write!(f, "constraint is the constant zero"),
            BddError::NotACube => write!(f, "operand is not a cube"),
        }
    }
}

impl std::error::Error for BddError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(BddError::Overflow.to_string(), "node limit exceeded or out of memory");
        assert_eq!(BddError::ForeignManager.to_string(), "edge belongs to a different manager");
        assert_eq!(BddError::NotACube.to_string(), "operand is not a cube");
        assert_ne!(BddError::Overflow, BddError::ForeignManager);
    }

    #[test]
    fn test_propagation() {
        fn inner() -> BddResult<u32> {
            Err(BddError::Overflow)
        }
        fn outer() -> BddResult<u32> {
            let x = inner()?;
            Ok(x + 1)
        }
        assert_eq!(outer(), Err(BddError::Overflow));
    }
}
