use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer too large for the requested width")]
    Overflow,
    /// a private-key result that does not map back to its input under the public exponent
    #[error("private-key result failed the consistency check")]
    Fault,
}
