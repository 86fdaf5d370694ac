//! Error types shared across the network engine.

/// Errors produced while building or training a network.
#[derive(Debug)]
pub enum NetworkError {
    /// Invalid topology at construction time (zero-sized layer, bad layer
    /// index, incompatible layer sizes for a one-one connector, ...).
    Construction(String),
    /// A schedule was queried outside its valid range
    /// (`epochs == 0` or `iteration >= epochs`).
    ArgumentRange { name: &'static str, value: i64 },
    /// A vector's length does not match the layer it is wired to.
    DimensionMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction(msg) => write!(f, "construction error: {}", msg),
            Self::ArgumentRange { name, value } => {
                write!(f, "argument out of range: {} = {}", name, value)
            }
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for NetworkError {}
