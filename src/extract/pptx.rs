//! PowerPoint Extractor
//!
//! スライドをプレゼンテーション順に、各スライドのトップレベル図形を重なり順に走査し、
//! テキストを持つ図形（`p:sp`）のテキストを抽出する。
//! グループ・画像・表（graphicFrame）はテキストを持つ図形として扱いません。

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::archive::{attr_value, OoxmlArchive};
use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::security::SecurityConfig;
use crate::types::Record;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// PowerPointプレゼンテーションをテキスト行に変換する
pub(crate) fn read_pptx(bytes: &[u8], security: &SecurityConfig) -> Result<Record, SweeperError> {
    let mut archive = OoxmlArchive::open(bytes, FileFormat::Pptx, security)?;

    let mut texts = Vec::new();
    for part in slide_parts(&mut archive)? {
        let xml = archive.require(&part)?;
        texts.extend(shape_texts(&xml)?);
    }

    Ok(Record::from_text(&texts.join("\n")))
}

/// スライドのパーツ名をプレゼンテーション順に取得する
///
/// `ppt/presentation.xml`のスライドID一覧とリレーションシップから解決します。
/// 解決できない場合はファイル名の番号順にフォールバックします。
fn slide_parts(archive: &mut OoxmlArchive<'_>) -> Result<Vec<String>, SweeperError> {
    let presentation = archive.read(PRESENTATION_PART)?;
    let rels = archive.read(PRESENTATION_RELS_PART)?;

    if let (Some(presentation), Some(rels)) = (presentation, rels) {
        let targets = relationship_targets(&rels)?;
        let parts: Vec<String> = slide_relationship_ids(&presentation)?
            .iter()
            .filter_map(|id| targets.get(id))
            .map(|target| resolve_target(target))
            .collect();
        if !parts.is_empty() {
            return Ok(parts);
        }
    }

    let mut numbered: Vec<(u32, String)> = archive
        .part_names()
        .into_iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name))
        })
        .collect();
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// `p:sldIdLst`のリレーションシップIDを順番に取得する
fn slide_relationship_ids(xml: &[u8]) -> Result<Vec<String>, SweeperError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"p:sldId" => {
                if let Some(id) = attr_value(&e, b"r:id")? {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// リレーションシップID -> ターゲットのマッピングを取得する
fn relationship_targets(xml: &[u8]) -> Result<HashMap<String, String>, SweeperError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// `ppt/`からの相対ターゲットをパーツ名に変換する
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// スライド内のトップレベル図形のテキストを重なり順に取得する
///
/// 図形のテキストは段落を改行で連結したものです。
fn shape_texts(xml: &[u8]) -> Result<Vec<String>, SweeperError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut texts = Vec::new();
    // グループ・graphicFrameのネスト深さ
    let mut skip_depth = 0usize;
    let mut shape: Option<Vec<String>> = None;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:grpSp" | b"p:graphicFrame" if shape.is_none() => skip_depth += 1,
                b"p:sp" if skip_depth == 0 && shape.is_none() => shape = Some(Vec::new()),
                b"a:p" if shape.is_some() => paragraph = Some(String::new()),
                b"a:t" if paragraph.is_some() => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"p:sp" if skip_depth == 0 && shape.is_none() => texts.push(String::new()),
                b"a:p" => {
                    if let Some(paragraphs) = shape.as_mut() {
                        paragraphs.push(String::new());
                    }
                }
                b"a:br" => {
                    if let Some(text) = paragraph.as_mut() {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    if let Some(text) = paragraph.as_mut() {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"p:grpSp" | b"p:graphicFrame" if shape.is_none() => {
                    skip_depth = skip_depth.saturating_sub(1)
                }
                b"a:t" => in_text = false,
                b"a:p" => {
                    if let (Some(paragraphs), Some(text)) = (shape.as_mut(), paragraph.take()) {
                        paragraphs.push(text);
                    }
                }
                b"p:sp" => {
                    if let Some(paragraphs) = shape.take() {
                        texts.push(paragraphs.join("\n"));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(tree: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            tree
        )
        .into_bytes()
    }

    fn text_shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!("<p:sp><p:nvSpPr/><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>", body)
    }

    #[test]
    fn test_shape_texts_in_order() {
        let xml = slide(&format!("{}{}", text_shape(&["Title"]), text_shape(&["a", "b"])));
        assert_eq!(shape_texts(&xml).unwrap(), vec!["Title", "a\nb"]);
    }

    #[test]
    fn test_groups_and_frames_are_skipped() {
        let xml = slide(&format!(
            "<p:grpSp>{}</p:grpSp><p:graphicFrame><a:graphic><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphic></p:graphicFrame>{}",
            text_shape(&["grouped"]),
            text_shape(&["kept"])
        ));
        assert_eq!(shape_texts(&xml).unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_shape_without_text_body_contributes_empty_text() {
        let xml = slide("<p:sp><p:nvSpPr/><p:spPr/></p:sp><p:pic/>");
        assert_eq!(shape_texts(&xml).unwrap(), vec![""]);
    }

    #[test]
    fn test_line_breaks_inside_paragraph() {
        let xml = slide(
            "<p:sp><p:txBody><a:p><a:r><a:t>one</a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p></p:txBody></p:sp>",
        );
        assert_eq!(shape_texts(&xml).unwrap(), vec!["one\ntwo"]);
    }

    #[test]
    fn test_slide_relationship_ids_and_targets() {
        let presentation = br#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(
            slide_relationship_ids(presentation).unwrap(),
            vec!["rId3", "rId2"]
        );

        let rels = br#"<Relationships xmlns="x"><Relationship Id="rId2" Type="slide" Target="slides/slide1.xml"/><Relationship Id="rId3" Type="slide" Target="/ppt/slides/slide2.xml"/></Relationships>"#;
        let targets = relationship_targets(rels).unwrap();
        assert_eq!(resolve_target(&targets["rId2"]), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target(&targets["rId3"]), "ppt/slides/slide2.xml");
    }
}
