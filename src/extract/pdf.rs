//! PDF Extractor
//!
//! ページ順にテキストを抽出する。テキストを抽出できないページは何も寄与しません。

use lopdf::Document;
use tracing::warn;

use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::types::Record;

/// PDF文書をテキスト行に変換する
pub(crate) fn read_pdf(bytes: &[u8]) -> Result<Record, SweeperError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| SweeperError::malformed(FileFormat::Pdf, e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => {
                let text = text.trim_end_matches(['\r', '\n']);
                if !text.is_empty() {
                    pages.push(text.to_string());
                }
            }
            Err(e) => {
                warn!(page = *page_number, error = %e, "PDF page has no extractable text");
            }
        }
    }

    Ok(Record::from_text(&pages.join("\n")))
}
