use std::io;

use thiserror::Error;

use crate::family::Family;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Io,
    Range,
    Capacity,
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{family} index {index} out of range (have {len})")]
    IndexOutOfRange {
        family: Family,
        index: usize,
        len: usize,
    },

    #[error("{family} order of {order_len} entries after offset {offset} exceeds {len} records")]
    OrderTooLong {
        family: Family,
        order_len: usize,
        offset: usize,
        len: usize,
    },

    #[error("{family} order names index {index} more than once")]
    DuplicateOrderEntry { family: Family, index: usize },

    #[error("too many {family} records: {count} (max 255)")]
    TooManyRecords { family: Family, count: usize },
}

impl ProjectError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::Io,
            Self::IndexOutOfRange { .. }
            | Self::OrderTooLong { .. }
            | Self::DuplicateOrderEntry { .. } => ErrorCode::Range,
            Self::TooManyRecords { .. } => ErrorCode::Capacity,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectError>;
