//! Extract Module
//!
//! アップロードされたバイト列を、フォーマットごとの抽出器で[`Record`]に正規化する。
//!
//! - CSV / Excel → テーブル
//! - Word / PDF / PowerPoint → テキスト行

mod archive;
mod docx;
mod pdf;
mod pptx;
mod tabular;

use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::security::SecurityConfig;
use crate::types::Record;

/// バイト列を指定フォーマットとして抽出する
///
/// # 使用例
///
/// ```rust
/// use datasweeper::{extract, FileFormat, Record};
///
/// # fn main() -> Result<(), datasweeper::SweeperError> {
/// let record = extract(b"x,y\n1,2\n", FileFormat::Csv)?;
/// assert!(matches!(record, Record::Table(_)));
/// # Ok(())
/// # }
/// ```
pub fn extract(bytes: &[u8], format: FileFormat) -> Result<Record, SweeperError> {
    extract_with(bytes, format, &SecurityConfig::default())
}

pub(crate) fn extract_with(
    bytes: &[u8],
    format: FileFormat,
    security: &SecurityConfig,
) -> Result<Record, SweeperError> {
    match format {
        FileFormat::Csv => Ok(Record::Table(tabular::read_csv(bytes)?)),
        FileFormat::Xlsx => Ok(Record::Table(tabular::read_xlsx(bytes)?)),
        FileFormat::Docx => docx::read_docx(bytes, security),
        FileFormat::Pdf => pdf::read_pdf(bytes),
        FileFormat::Pptx => pptx::read_pptx(bytes, security),
    }
}
