//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use crate::api::FileFormat;
use thiserror::Error;

/// datasweeperクレート全体で使用するエラー型
///
/// ファイルの抽出、クレンジング、変換処理中に発生するすべてのエラーを
/// 統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `UnsupportedFormat`: 拡張子が未対応（そのファイルのみスキップし、バッチは継続）
/// - `UnknownColumn`: 列選択で存在しない列が指定された（テーブルは変更されない）
/// - `MissingTextColumn`: テキスト系の出力先に必要なテキスト列が存在しない
/// - その他: 各ライブラリ由来の解析・書き出しエラー
///
/// 数値列がすべて空の場合の平均値補完はエラーではなく、何もしません。
///
/// # 使用例
///
/// ```rust
/// use datasweeper::{FileFormat, SweeperError};
///
/// fn detect(name: &str) -> Result<FileFormat, SweeperError> {
///     FileFormat::from_file_name(name)
/// }
///
/// match detect("report.xyz") {
///     Err(SweeperError::UnsupportedFormat { extension }) => assert_eq!(extension, ".xyz"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SweeperError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVの読み書きで発生したエラー
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XMLの解析・生成エラー（quick-xml由来）
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSONのシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIPアーカイブ（docx/pptx/xlsxコンテナ）の読み書きエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// Excelファイルの書き出しエラー（rust_xlsxwriter由来）
    #[error("Failed to write Excel file: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// PDFの読み書きエラー（lopdf由来）
    #[error("PDF error: {0}")]
    Pdf(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `PipelineBuilder::build()`時に無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 未対応の拡張子
    ///
    /// `extension`はドット付きの小文字拡張子（例: `.xyz`）。拡張子がない場合は空文字列。
    #[error("Unsupported file type: '{extension}'")]
    UnsupportedFormat {
        /// 問題の拡張子
        extension: String,
    },

    /// 存在しない列が指定された
    #[error("Unknown column: '{column}'")]
    UnknownColumn {
        /// 指定された列名
        column: String,
    },

    /// 同じ列が複数回指定された
    #[error("Column selected more than once: '{column}'")]
    DuplicateColumn {
        /// 重複した列名
        column: String,
    },

    /// テキスト系の出力に必要なテキスト列が存在しない
    #[error("Record has no text column '{column}'")]
    MissingTextColumn {
        /// 期待されたテキスト列名
        column: String,
    },

    /// グラフ描画に必要な数値列が不足している
    #[error("Not enough numeric columns for visualization: found {found}, need at least 2")]
    NotEnoughNumericColumns {
        /// 検出された数値列の数
        found: usize,
    },

    /// 入力ファイルの内容が不正
    #[error("Malformed {format} input: {message}")]
    MalformedInput {
        /// 入力フォーマット
        format: FileFormat,
        /// 詳細メッセージ
        message: String,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl SweeperError {
    pub(crate) fn malformed(format: FileFormat, message: impl Into<String>) -> Self {
        SweeperError::MalformedInput {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn pdf(err: impl std::fmt::Display) -> Self {
        SweeperError::Pdf(err.to_string())
    }

    pub(crate) fn zip(err: impl std::fmt::Display) -> Self {
        SweeperError::Zip(err.to_string())
    }
}
