use camera_compat_common::ColumnSelector;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camera-compat")]
#[command(about = "カメラ互換性チェック・コネクター推奨ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 顧客シート1件を照合して推奨を表示
    Check {
        /// 顧客シート（CSV/Excel）
        #[arg(required = true)]
        file: PathBuf,

        /// 型番列（列番号0始まり、またはヘッダー名）
        #[arg(short, long)]
        column: Option<ColumnSelector>,

        /// 照合前にIP/MAC・シリアル・英単語などを除去
        #[arg(short, long)]
        sanitize: bool,

        /// 型番列を判定できないとき対話で選択
        #[arg(short, long)]
        interactive: bool,

        /// 保存期間（日、最大90。省略時は設定値）
        #[arg(short, long)]
        retention: Option<u32>,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// キャッシュを使わない
        #[arg(long)]
        no_cache: bool,
    },

    /// フォルダ内のシートを一括チェック
    Batch {
        /// シートのフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 照合前に前処理を行う
        #[arg(short, long)]
        sanitize: bool,

        /// 保存期間（日、最大90）
        #[arg(short, long)]
        retention: Option<u32>,

        /// 出力ファイル/ディレクトリ（省略時は <folder>/camera-compat-output）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,
    },

    /// チャンネル数から直接コネクターを推奨
    Recommend {
        /// 低解像度（5MP以下）チャンネル数
        #[arg(long, default_value = "0")]
        low: u32,

        /// 高解像度（5MP超）チャンネル数
        #[arg(long, default_value = "0")]
        high: u32,

        /// 保存期間（日、最大90）
        #[arg(short, long)]
        retention: Option<u32>,

        /// 必要チャンネル数を直接指定（--storage と併用）
        #[arg(long, requires = "storage", conflicts_with_all = ["low", "high", "retention"])]
        channels: Option<i64>,

        /// 必要容量（TB）を直接指定
        #[arg(long, requires = "channels")]
        storage: Option<f64>,
    },

    /// 結果キャッシュ管理
    Cache {
        /// キャッシュを全削除
        #[arg(long)]
        clear: bool,

        /// 指定サイトのエントリを削除
        #[arg(long)]
        remove: Option<String>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 保存期間（日）を設定
        #[arg(long)]
        set_retention: Option<u32>,

        /// 互換性リストのパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// スペック表のパスを設定
        #[arg(long)]
        set_specs: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
