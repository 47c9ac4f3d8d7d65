use thiserror::Error;

/// Errors reported by the growth engine.
///
/// Every variant is recoverable: the engine leaves its state untouched when an
/// operation is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    #[error("no trunk planted, plant a trunk before growing")]
    EmptyTree,
    #[error("maximum depth {max_depth} reached")]
    MaxDepthReached { max_depth: u32 },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid configuration: {0}")]
    Color(#[from] ColorParseError),
}

/// Errors from parsing `#rrggbb` color strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color {0:?} must start with '#'")]
    MissingHash(String),
    #[error("color {0:?} must have exactly six hex digits")]
    BadLength(String),
    #[error("color {0:?} contains a non-hex digit")]
    BadDigit(String),
}

pub type Result<T> = std::result::Result<T, GrowthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_error_converts_into_growth_error() {
        let err: GrowthError = ColorParseError::BadLength("#abc".into()).into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn max_depth_message_names_the_limit() {
        let err = GrowthError::MaxDepthReached { max_depth: 8 };
        assert_eq!(err.to_string(), "maximum depth 8 reached");
    }
}
