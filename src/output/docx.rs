//! Word Writer
//!
//! 見出し（Heading 1）に続けて、テキスト行を1行1段落で書き出す。

use super::ooxml::{self, PackageWriter, XmlBuilder};
use crate::error::SweeperError;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const RELS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:bCs/><w:color w:val="365F91"/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style></w:styles>"#;

/// テキスト行をWord文書に変換する
///
/// # 引数
///
/// * `heading` - 先頭に置く見出し（Heading 1スタイル）
/// * `lines` - 本文の段落
pub(crate) fn write_docx(heading: &str, lines: &[String]) -> Result<Vec<u8>, SweeperError> {
    let mut package = PackageWriter::new();

    package.add_part(
        "[Content_Types].xml",
        &ooxml::content_types(&[
            ("/word/document.xml", DOCUMENT_CONTENT_TYPE),
            ("/word/styles.xml", STYLES_CONTENT_TYPE),
        ])?,
    )?;
    package.add_part("_rels/.rels", &ooxml::package_relationships("word/document.xml")?)?;
    package.add_part("docProps/core.xml", &ooxml::core_properties(heading)?)?;
    package.add_part(
        "word/_rels/document.xml.rels",
        &ooxml::relationships(&[("rId1", REL_STYLES, "styles.xml")])?,
    )?;
    package.add_part("word/styles.xml", STYLES_XML.as_bytes())?;
    package.add_part("word/document.xml", &document_xml(heading, lines)?)?;

    package.finish()
}

fn document_xml(heading: &str, lines: &[String]) -> Result<Vec<u8>, SweeperError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("w:document", &[("xmlns:w", WORDML_NS), ("xmlns:r", RELS_NS)])?;
    xml.start("w:body", &[])?;

    paragraph(&mut xml, heading, Some("Heading1"))?;
    for line in lines {
        paragraph(&mut xml, line, None)?;
    }

    // US Letter、余白1インチ（左右1.25インチ）
    xml.start("w:sectPr", &[])?;
    xml.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1800"),
            ("w:bottom", "1440"),
            ("w:left", "1800"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")?;

    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok(xml.finish())
}

/// 段落を1つ書き込む
///
/// 段落内の改行は`w:br`、タブは`w:tab`として表現します。
fn paragraph(xml: &mut XmlBuilder, text: &str, style: Option<&str>) -> Result<(), SweeperError> {
    xml.start("w:p", &[])?;
    if let Some(style) = style {
        xml.start("w:pPr", &[])?;
        xml.empty("w:pStyle", &[("w:val", style)])?;
        xml.end("w:pPr")?;
    }

    if !text.is_empty() {
        xml.start("w:r", &[])?;
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                xml.empty("w:br", &[])?;
            }
            for (j, piece) in segment.split('\t').enumerate() {
                if j > 0 {
                    xml.empty("w:tab", &[])?;
                }
                if !piece.is_empty() {
                    xml.text_element("w:t", &[("xml:space", "preserve")], piece)?;
                }
            }
        }
        xml.end("w:r")?;
    }

    xml.end("w:p")
}
