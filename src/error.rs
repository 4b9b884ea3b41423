use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カタログが設定されていません。`camera-compat config --set-catalog PATH` で設定してください")]
    MissingCatalog,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("未対応のファイル形式: {0}")]
    UnsupportedFormat(String),

    #[error("カタログ形式が不正: {0}")]
    InvalidCatalog(String),

    #[error("シートが空です: {0}")]
    EmptySheet(String),

    #[error("CSV読み書きエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Engine(#[from] camera_compat_common::Error),
}

impl From<calamine::Error> for CompatError {
    fn from(e: calamine::Error) -> Self {
        CompatError::ExcelRead(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for CompatError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CompatError::ExcelGeneration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;
