//! Camera Compat Common Library
//!
//! カメラ互換性チェックのエンジン部分（ファイルI/Oなし）:
//! 列判定・あいまい照合・台数集計・前処理・コネクター推奨

pub mod types;
pub mod error;
pub mod similarity;
pub mod catalog;
pub mod column;
pub mod matching;
pub mod aggregate;
pub mod sanitize;
pub mod connector;

pub use types::{CustomerRow, MatchResult, MatchType, ReferenceModel, Table};
pub use error::{Error, Result};
pub use similarity::{extract_one, similarity, BestMatch, Metric};
pub use catalog::{Catalog, SpecRow};
pub use column::{identify_count_column, identify_model_column, resolve_model_column, ColumnSelector};
pub use matching::{match_cameras, match_value};
pub use aggregate::{aggregate_counts, coerce_count, total_count};
pub use sanitize::Sanitizer;
pub use connector::{
    count_channels, recommend, required_storage_tb, select_connectors, ChannelDemand, Connector,
    Recommendation, RecommendOptions, CONNECTORS, MAX_RETENTION_DAYS,
};
