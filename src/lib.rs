//! カメラ互換性チェックツール
//!
//! 顧客のカメラ一覧を対応カタログと照合し、必要なコネクター構成を推奨する。

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod cache;
pub mod export;
pub mod report;
pub mod prompt;
