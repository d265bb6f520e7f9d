//! Word Extractor
//!
//! `word/document.xml`から本文の段落テキストを順番に抽出する。
//! `w:body`直下の段落のみを対象とし、表・テキストボックス・コンテンツコントロール
//! （`w:sdt`）内の段落は対象外です。

use quick_xml::events::Event;
use quick_xml::Reader;

use super::archive::{attr_value, OoxmlArchive};
use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::security::SecurityConfig;
use crate::types::Record;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word文書をテキスト行に変換する
pub(crate) fn read_docx(bytes: &[u8], security: &SecurityConfig) -> Result<Record, SweeperError> {
    let mut archive = OoxmlArchive::open(bytes, FileFormat::Docx, security)?;
    let xml = archive.require(DOCUMENT_PART)?;

    let paragraphs = body_paragraphs(&xml)?;
    Ok(Record::from_text(&paragraphs.join("\n")))
}

/// 本文の段落テキストを文書順に取得する
fn body_paragraphs(xml: &[u8]) -> Result<Vec<String>, SweeperError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    // 表・テキストボックス・コンテンツコントロールのネスト深さ
    let mut skip_depth = 0usize;
    let mut current: Option<String> = None;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" | b"w:sdt" => skip_depth += 1,
                b"w:p" if skip_depth == 0 && current.is_none() => current = Some(String::new()),
                b"w:r" if current.is_some() && skip_depth == 0 => in_run = true,
                b"w:t" if in_run && skip_depth == 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if skip_depth == 0 {
                    match e.name().as_ref() {
                        b"w:p" if current.is_none() => paragraphs.push(String::new()),
                        b"w:tab" if in_run => push_char(&mut current, '\t'),
                        b"w:cr" if in_run => push_char(&mut current, '\n'),
                        b"w:br" if in_run => {
                            // ページ区切り・段区切りは改行として扱わない
                            let kind = attr_value(&e, b"w:type")?;
                            if matches!(kind.as_deref(), None | Some("textWrapping")) {
                                push_char(&mut current, '\n');
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if in_text {
                    if let Some(text) = current.as_mut() {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" | b"w:sdt" => {
                    skip_depth = skip_depth.saturating_sub(1)
                }
                b"w:p" if skip_depth == 0 => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"w:r" if skip_depth == 0 => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(text) = current.as_mut() {
        text.push(c);
    }
}
