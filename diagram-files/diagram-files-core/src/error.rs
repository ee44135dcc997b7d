use std::fmt;

use thiserror::Error;

use crate::storage::KeyTooLong;

/// Storage call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Keys,
    Get,
    Set,
    Remove,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            StoreOp::Keys => "keys",
            StoreOp::Get => "get",
            StoreOp::Set => "set",
            StoreOp::Remove => "remove",
        };
        f.write_str(op)
    }
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("storage {op} failed: {cause:#}")]
    Storage { op: StoreOp, cause: anyhow::Error },

    #[error("failed to serialize file record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse uploaded file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file name is too long: {0}")]
    NameTooLong(#[source] KeyTooLong),
}

impl FileError {
    pub(crate) fn storage(op: StoreOp) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| match cause.downcast::<KeyTooLong>() {
            Ok(e) => FileError::NameTooLong(e),
            Err(cause) => FileError::Storage { op, cause },
        }
    }

    /// The storage call behind this error, if it came from the store.
    pub fn store_op(&self) -> Option<StoreOp> {
        match self {
            FileError::Storage { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type FileResult<T> = std::result::Result<T, FileError>;
