//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use crate::error::SweeperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// ファイルフォーマット（入力・出力共通のフォーマットタグ）
///
/// 拡張子・MIMEタイプ・表示名の対応表を一元管理します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// CSV（Comma-Separated Values）
    Csv,

    /// Excelブック（Office Open XML）
    Xlsx,

    /// Word文書（Office Open XML）
    Docx,

    /// PDF文書
    Pdf,

    /// PowerPointプレゼンテーション（Office Open XML）
    Pptx,
}

impl FileFormat {
    /// 対応しているすべてのフォーマット（変換先の選択肢の並び順）
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Csv,
        FileFormat::Xlsx,
        FileFormat::Docx,
        FileFormat::Pptx,
        FileFormat::Pdf,
    ];

    /// 正規の拡張子（ドットなし）
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Docx => "docx",
            FileFormat::Pdf => "pdf",
            FileFormat::Pptx => "pptx",
        }
    }

    /// 出力時のMIMEタイプ
    pub fn mime_type(self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FileFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileFormat::Pdf => "application/pdf",
            FileFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    /// 変換先の選択肢として表示するラベル
    pub fn label(self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xlsx => "Excel",
            FileFormat::Docx => "Word",
            FileFormat::Pdf => "PDF",
            FileFormat::Pptx => "PowerPoint",
        }
    }

    /// 拡張子（ドットなし、大文字小文字を区別しない）からフォーマットを判定
    ///
    /// # 戻り値
    ///
    /// * `Some(FileFormat)` - 対応している拡張子の場合
    /// * `None` - 未対応の拡張子の場合
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "docx" => Some(FileFormat::Docx),
            "pdf" => Some(FileFormat::Pdf),
            "pptx" => Some(FileFormat::Pptx),
            _ => None,
        }
    }

    /// ファイル名の拡張子からフォーマットを判定
    ///
    /// # 戻り値
    ///
    /// * `Ok(FileFormat)` - 対応している拡張子の場合
    /// * `Err(SweeperError::UnsupportedFormat)` - 拡張子が未対応、または拡張子がない場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use datasweeper::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_file_name("Sales.CSV").unwrap(), FileFormat::Csv);
    /// assert!(FileFormat::from_file_name("report.xyz").is_err());
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self, SweeperError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        FileFormat::from_extension(ext).ok_or_else(|| SweeperError::UnsupportedFormat {
            extension: if ext.is_empty() {
                String::new()
            } else {
                format!(".{}", ext.to_ascii_lowercase())
            },
        })
    }

    /// 元のファイル名から出力ファイル名を生成する
    ///
    /// 拡張子を変換先の正規拡張子に置き換えます。常に元のファイル名から
    /// 計算するため、同じファイルを繰り返し変換しても名前が累積的に変化しません。
    ///
    /// ```rust
    /// use datasweeper::FileFormat;
    ///
    /// assert_eq!(FileFormat::Pdf.output_file_name("notes.docx"), "notes.pdf");
    /// assert_eq!(FileFormat::Csv.output_file_name("q1.sales.xlsx"), "q1.sales.csv");
    /// ```
    pub fn output_file_name(self, original_name: &str) -> String {
        let base = Path::new(original_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(original_name);
        format!("{}.{}", base, self.extension())
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xlsx => "XLSX",
            FileFormat::Docx => "DOCX",
            FileFormat::Pdf => "PDF",
            FileFormat::Pptx => "PPTX",
        };
        f.write_str(name)
    }
}

/// クレンジング操作
///
/// `Pipeline::clean()`に渡す操作。指定された順序で適用されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CleanOp {
    /// 重複行の削除（最初の出現を残す）
    RemoveDuplicates,

    /// 数値列の欠損値を列の平均値で補完
    FillMissingNumeric,

    /// 指定した列のみを指定順で残す
    SelectColumns(Vec<String>),
}

/// グラフの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// 棒グラフ
    Bar,

    /// 折れ線グラフ
    Line,

    /// ヒストグラム
    Histogram,
}

impl ChartKind {
    /// 選択肢として表示するラベル
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Histogram => "Histogram",
        }
    }
}
