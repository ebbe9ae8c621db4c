use thiserror::Error;

use crate::context::Signals;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("value is infinity or NaN")]
    NotFinite,
    #[error("value is not exactly representable in the requested form")]
    NotExact,
    #[error("value does not fit in the target integer type")]
    Overflow,
    #[error("NaN diagnostic information must not be negative")]
    NegativeDiagnostic,
    #[error("denominator is zero")]
    ZeroDenominator,
    #[error("invalid number syntax: {0:?}")]
    Parse(String),
    #[error("operation trapped on {0:?}")]
    Trapped(Signals),
}

pub type Result<T, E = NumberError> = std::result::Result<T, E>;
