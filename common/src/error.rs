//! エラー型定義

use crate::connector::Connector;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("reference catalog is empty")]
    EmptyCatalog,

    #[error("table has no columns")]
    NoColumns,

    #[error("could not identify the camera model column")]
    ModelColumnNotFound,

    #[error("column index {index} is out of bounds (table has {width} columns)")]
    ColumnOutOfBounds { index: usize, width: usize },

    #[error("no column named '{0}'")]
    UnknownColumn(String),

    #[error("retention of {0} days is not supported (maximum is 90)")]
    RetentionUnsupported(u32),

    #[error("connector selection did not converge after {iterations} iterations ({} connectors selected)", .partial.len())]
    NonConvergent {
        iterations: usize,
        partial: Vec<Connector>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
