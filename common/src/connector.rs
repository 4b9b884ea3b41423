//! コネクター推奨モジュール
//!
//! 必要チャンネル数と保存容量から、固定6機種のコネクターを貪欲法で選ぶ。
//! 選択は明示ループで行い、反復上限を超えたら途中結果付きで失敗を返す。

use crate::error::{Error, Result};
use crate::types::MatchResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// コネクター機種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub name: &'static str,
    pub storage_tb: u32,
    pub low_channels: u32,
    pub high_channels: u32,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 機種一覧（同点時はこの順で先勝ち）
pub const CONNECTORS: [Connector; 6] = [
    Connector { name: "CC300-4TB", storage_tb: 4, low_channels: 10, high_channels: 5 },
    Connector { name: "CC300-8TB", storage_tb: 8, low_channels: 10, high_channels: 5 },
    Connector { name: "CC500-8TB", storage_tb: 8, low_channels: 25, high_channels: 12 },
    Connector { name: "CC500-16TB", storage_tb: 16, low_channels: 25, high_channels: 12 },
    Connector { name: "CC700-16TB", storage_tb: 16, low_channels: 50, high_channels: 25 },
    Connector { name: "CC700-32TB", storage_tb: 32, low_channels: 25, high_channels: 12 },
];

/// 機種名から検索
pub fn find_connector(name: &str) -> Option<&'static Connector> {
    CONNECTORS.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// 保存期間の上限（日）
pub const MAX_RETENTION_DAYS: u32 = 90;

/// チャンネルの解像度区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 5MP以下
    Low,
    /// 5MP超（4Kクラス）
    High,
}

/// 1チャンネルあたりの必要容量（TB）
pub fn storage_per_channel(resolution: Resolution, retention_days: u32) -> Result<f64> {
    let tier = match retention_days {
        0..=30 => 0,
        31..=60 => 1,
        61..=MAX_RETENTION_DAYS => 2,
        _ => return Err(Error::RetentionUnsupported(retention_days)),
    };
    let table = match resolution {
        Resolution::Low => [0.256, 0.512, 0.768],
        Resolution::High => [0.512, 1.024, 2.048],
    };
    Ok(table[tier])
}

/// 必要保存容量（TB）
pub fn required_storage_tb(low_channels: u32, high_channels: u32, retention_days: u32) -> Result<f64> {
    let low = storage_per_channel(Resolution::Low, retention_days)?;
    let high = storage_per_channel(Resolution::High, retention_days)?;
    Ok(f64::from(low_channels) * low + f64::from(high_channels) * high)
}

/// 推奨計算のオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendOptions {
    /// 選択ループの反復上限
    pub max_iterations: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self { max_iterations: 1000 }
    }
}

/// 推奨結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub connectors: Vec<Connector>,
    pub required_channels: i64,
    pub required_storage_tb: f64,
    /// 選択機種の低解像度チャンネル合計 − 必要チャンネル数（負なら不足）
    pub excess_channels: i64,
}

impl Recommendation {
    /// 機種名ごとの台数
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for connector in &self.connectors {
            *summary.entry(connector.name).or_insert(0) += 1;
        }
        summary
    }

    pub fn names(&self) -> Vec<String> {
        self.connectors.iter().map(|c| c.name.to_string()).collect()
    }

    pub fn total_storage_tb(&self) -> u32 {
        self.connectors.iter().map(|c| c.storage_tb).sum()
    }

    pub fn total_low_channels(&self) -> i64 {
        self.connectors.iter().map(|c| i64::from(c.low_channels)).sum()
    }

    pub fn is_under_provisioned(&self) -> bool {
        self.excess_channels < 0
    }
}

/// 容量が段階の間にあれば次の段階へ切り上げる（4↔8, 8↔16, 16↔32）
fn round_storage(storage: f64) -> f64 {
    const TIERS: [(f64, f64); 3] = [(4.0, 8.0), (8.0, 16.0), (16.0, 32.0)];
    TIERS
        .iter()
        .find(|(lower, upper)| storage > *lower && storage < *upper)
        .map_or(storage, |(_, upper)| *upper)
}

/// チャンネル数が10と25の間なら25へ切り上げる
fn round_channels(channels: i64) -> i64 {
    if channels > 10 && channels < 25 {
        25
    } else {
        channels
    }
}

/// 残り要件に最も近い機種を選ぶ（容量差、次にチャンネル差。同点は先勝ち）
fn closest_connector(channels: i64, storage: f64) -> &'static Connector {
    let target_channels = round_channels(channels);
    let target_storage = round_storage(storage);

    let mut best = &CONNECTORS[0];
    let mut best_key = (f64::INFINITY, i64::MAX);
    for connector in &CONNECTORS {
        let key = (
            (f64::from(connector.storage_tb) - target_storage).abs(),
            (i64::from(connector.low_channels) - target_channels).abs(),
        );
        if key.0 < best_key.0 || (key.0 == best_key.0 && key.1 < best_key.1) {
            best = connector;
            best_key = key;
        }
    }
    best
}

/// 必要チャンネル数と容量を満たすまで機種を選ぶ
///
/// 切り上げは比較時のみ適用し、残り要件からは機種の実容量を差し引く。
pub fn select_connectors(channels: i64, storage: f64, options: &RecommendOptions) -> Result<Recommendation> {
    let mut remaining_channels = channels.max(0);
    let mut remaining_storage = storage.max(0.0);
    let mut selected: Vec<Connector> = Vec::new();

    for iteration in 0..=options.max_iterations {
        if remaining_channels <= 0 && remaining_storage <= 0.0 {
            let excess_channels = selected.iter().map(|c| i64::from(c.low_channels)).sum::<i64>() - channels;
            tracing::info!(connectors = selected.len(), excess_channels, "recommendation complete");
            return Ok(Recommendation {
                connectors: selected,
                required_channels: channels,
                required_storage_tb: storage,
                excess_channels,
            });
        }
        if iteration == options.max_iterations {
            break;
        }

        let connector = closest_connector(remaining_channels, remaining_storage);
        tracing::debug!(
            iteration,
            channels = remaining_channels,
            storage = remaining_storage,
            connector = connector.name,
            "selecting connector"
        );
        selected.push(*connector);

        remaining_channels = (remaining_channels - i64::from(connector.low_channels)).max(0);
        remaining_storage = (remaining_storage - f64::from(connector.storage_tb)).max(0.0);
    }

    tracing::warn!(
        iterations = options.max_iterations,
        channels = remaining_channels,
        storage = remaining_storage,
        "connector selection did not converge"
    );
    Err(Error::NonConvergent {
        iterations: options.max_iterations,
        partial: selected,
    })
}

/// 低解像度・高解像度チャンネル数と保存期間から推奨する
///
/// 必要チャンネル数は `low + 2 × high`。
pub fn recommend(
    low_channels: u32,
    high_channels: u32,
    retention_days: u32,
    options: &RecommendOptions,
) -> Result<Recommendation> {
    let storage = required_storage_tb(low_channels, high_channels, retention_days)?;
    let channels = i64::from(low_channels) + 2 * i64::from(high_channels);
    tracing::info!(channels, storage, retention_days, "computing recommendation");
    select_connectors(channels, storage, options)
}

/// 解像度区分ごとのチャンネル需要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelDemand {
    pub low: u32,
    pub high: u32,
}

/// 照合結果からチャンネル需要を数える
///
/// カタログモデルが紐付いた行の台数を、5MP以下なら低解像度、超えれば高解像度に加算する。
/// カメラ1台を1チャンネルとして数える。
pub fn count_channels(results: &[MatchResult]) -> ChannelDemand {
    let mut demand = ChannelDemand::default();

    for result in results {
        let Some(model) = &result.matched_model else {
            continue;
        };
        if model.is_high_resolution() {
            demand.high = demand.high.saturating_add(result.count);
        } else {
            demand.low = demand.low.saturating_add(result.count);
        }
    }

    tracing::debug!(low = demand.low, high = demand.high, "channel demand");
    demand
}
