//! 対応カメラカタログモジュール
//!
//! 互換性リストから読み込んだモデル一覧を保持し、
//! スペック表（MP・チャンネル数）で一度だけ補完する。

use crate::types::ReferenceModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// スペック表の1行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRow {
    #[serde(rename = "Manufacturer", default)]
    pub manufacturer: String,
    #[serde(rename = "Model Name")]
    pub model_name: String,
    #[serde(rename = "MP", default)]
    pub megapixels: f64,
    #[serde(rename = "Channels", default)]
    pub channels: f64,
}

/// 対応カメラカタログ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    models: Vec<ReferenceModel>,
    /// 照合用のモデル名（models と同順）
    names: Vec<String>,
}

impl Catalog {
    /// モデル一覧から構築（名前は小文字化、重複は先勝ち、空名は除外）
    pub fn new(models: Vec<ReferenceModel>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(models.len());

        for mut model in models {
            model.model_name = model.model_name.trim().to_lowercase();
            if model.model_name.is_empty() {
                continue;
            }
            if seen.insert(model.model_name.clone()) {
                kept.push(model);
            }
        }

        let names = kept.iter().map(|m| m.model_name.clone()).collect();
        Self { models: kept, names }
    }

    pub fn models(&self) -> &[ReferenceModel] {
        &self.models
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceModel> {
        self.models.get(index)
    }

    /// モデル名で検索（大文字小文字を区別しない）
    pub fn find(&self, model_name: &str) -> Option<&ReferenceModel> {
        let key = model_name.trim().to_lowercase();
        self.models.iter().find(|m| m.model_name == key)
    }

    /// スペック表でMP・チャンネル数を補完する
    ///
    /// 一致する行はすべて加算する（マルチセンサーモデルは複数行を持つ）。
    /// 戻り値は補完されたモデル数。
    pub fn enrich(&mut self, specs: &[SpecRow]) -> usize {
        let mut enriched = HashSet::new();

        for spec in specs {
            let key = spec.model_name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            for (index, model) in self.models.iter_mut().enumerate() {
                if model.model_name == key {
                    model.megapixels += spec.megapixels;
                    model.channels += spec.channels;
                    enriched.insert(index);
                }
            }
        }

        tracing::info!(enriched = enriched.len(), total = self.models.len(), "catalog enriched from specs");
        enriched.len()
    }

    /// モデル名に含まれるトークン（小文字）の集合
    pub fn tokens(&self) -> HashSet<String> {
        self.names
            .iter()
            .flat_map(|name| name.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}
