//! Output Format Module
//!
//! Strategy Patternによる出力フォーマットの抽象化を提供するモジュール。
//! 表形式（CSV / Excel）はテーブルを、テキスト形式（Word / PowerPoint / PDF）は
//! テキスト行を入力として書き出します。

mod docx;
mod ooxml;
mod pdf;
mod pptx;
mod tabular;

pub use pdf::PdfLayout;

use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::types::Record;

/// 見出しのデフォルト値
pub const DEFAULT_HEADING: &str = "Converted Data";

/// テキスト列名のデフォルト値
pub const DEFAULT_TEXT_COLUMN: &str = "Text";

/// 書き出し時の設定
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// テキスト行とテーブルの相互変換に使う列名
    pub text_column: String,

    /// Word / PowerPointの先頭に置く見出し
    pub heading: String,

    /// PDFのページレイアウト
    pub pdf_layout: PdfLayout,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            heading: DEFAULT_HEADING.to_string(),
            pdf_layout: PdfLayout::default(),
        }
    }
}

/// 出力シリアライザー（Strategy Pattern）
///
/// 各出力フォーマットをenumとして表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serializer {
    Csv,
    Xlsx,
    Docx,
    Pptx,
    Pdf,
}

impl Serializer {
    /// ファイル形式からシリアライザーを生成
    pub fn from_format(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => Serializer::Csv,
            FileFormat::Xlsx => Serializer::Xlsx,
            FileFormat::Docx => Serializer::Docx,
            FileFormat::Pptx => Serializer::Pptx,
            FileFormat::Pdf => Serializer::Pdf,
        }
    }

    /// 出力先のMIMEタイプ
    pub fn mime_type(&self) -> &'static str {
        self.format().mime_type()
    }

    fn format(&self) -> FileFormat {
        match self {
            Serializer::Csv => FileFormat::Csv,
            Serializer::Xlsx => FileFormat::Xlsx,
            Serializer::Docx => FileFormat::Docx,
            Serializer::Pptx => FileFormat::Pptx,
            Serializer::Pdf => FileFormat::Pdf,
        }
    }

    /// レコードを書き出す
    ///
    /// # 引数
    ///
    /// * `record` - 書き出すレコード
    /// * `options` - テキスト列名・見出し・PDFレイアウト
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<u8>)` - 出力ファイルの内容
    /// * `Err(SweeperError::MissingTextColumn)` - テキスト形式への出力で、
    ///   テーブルにテキスト列が存在しない場合
    pub fn render(&self, record: &Record, options: &RenderOptions) -> Result<Vec<u8>, SweeperError> {
        match self {
            Serializer::Csv => tabular::write_csv(&record.to_table(&options.text_column)),
            Serializer::Xlsx => tabular::write_xlsx(&record.to_table(&options.text_column)),
            Serializer::Docx => {
                docx::write_docx(&options.heading, &record.to_lines(&options.text_column)?)
            }
            Serializer::Pptx => {
                pptx::write_pptx(&options.heading, &record.to_lines(&options.text_column)?)
            }
            Serializer::Pdf => {
                pdf::write_pdf(&record.to_lines(&options.text_column)?, &options.pdf_layout)
            }
        }
    }
}

/// レコードをデフォルト設定で指定フォーマットに書き出す
///
/// # 戻り値
///
/// 出力ファイルの内容と、出力先のMIMEタイプ
///
/// # 使用例
///
/// ```rust
/// use datasweeper::{extract, serialize, FileFormat};
///
/// # fn main() -> Result<(), datasweeper::SweeperError> {
/// let record = extract(b"x,y\n1,2\n", FileFormat::Csv)?;
/// let (bytes, mime) = serialize(&record, FileFormat::Xlsx)?;
/// assert!(!bytes.is_empty());
/// assert_eq!(mime, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
/// # Ok(())
/// # }
/// ```
pub fn serialize(
    record: &Record,
    target: FileFormat,
) -> Result<(Vec<u8>, &'static str), SweeperError> {
    let serializer = Serializer::from_format(target);
    let bytes = serializer.render(record, &RenderOptions::default())?;
    Ok((bytes, serializer.mime_type()))
}
