use thiserror::Error as DError;

#[derive(Debug, Clone, PartialEq, DError)]
pub enum ErrorKind {
    #[error("Invalid hybrid weights, cf({0}) and cb({1}) must be non-negative and sum above zero")]
    InvalidWeights(f64, f64),

    #[error("Unknown hybrid method ({0}), expected weighted, mixed or switching")]
    UnknownMethod(String),
}
