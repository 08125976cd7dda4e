//! Decode failures.
//!
//! Every variant is fatal for the message being decoded: once a header has
//! been rejected the read cursor can no longer be trusted.

use thiserror::Error;


/// Which type tag of a container header failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementPosition {
    /// The single element type of a list or set.
    Element,
    Key,
    Value,
}

impl std::fmt::Display for ElementPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementPosition::Element => f.write_str("element"),
            ElementPosition::Key     => f.write_str("key"),
            ElementPosition::Value   => f.write_str("value"),
        }
    }
}


#[derive(Debug, Error)]
pub enum Error {
    #[error("negative container size: {size}")]
    NegativeContainerSize { size: i32 },

    #[error("the length of the buffer is {budget} but container size is set to at least {size}")]
    ContainerSizeExceedsBudget { size: i32, budget: i32 },

    #[error("unexpected type {tag} as {position} type in a container")]
    InvalidElementType { tag: u8, position: ElementPosition },

    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("negative length: {0}")]
    NegativeLength(i32),

    #[error("string is not valid utf-8")]
    InvalidUtf8,

    #[error("unknown type {0}")]
    UnknownType(u8),

    #[error("skip depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    #[error("{0} trailing bytes after value")]
    TrailingData(usize),

    #[error("invalid guard config: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// True for the three container header rejections.
    pub fn is_container_violation(&self) -> bool {
        matches!(self,
            Error::NegativeContainerSize { .. }
            | Error::ContainerSizeExceedsBudget { .. }
            | Error::InvalidElementType { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
