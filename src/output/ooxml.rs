//! OOXML Package Writer
//!
//! docx / pptx（ZIPアーカイブ + XMLパーツ）を生成するための共通ヘルパー。

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::SweeperError;

pub(crate) const CONTENT_TYPES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const PACKAGE_RELS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// ZIPパッケージの書き込み
pub(crate) struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl PackageWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// パーツを追加する
    pub fn add_part(&mut self, name: &str, content: &[u8]) -> Result<(), SweeperError> {
        self.zip
            .start_file(name, self.options)
            .map_err(SweeperError::zip)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    /// パッケージを閉じてバイト列を返す
    pub fn finish(mut self) -> Result<Vec<u8>, SweeperError> {
        let cursor = self.zip.finish().map_err(SweeperError::zip)?;
        Ok(cursor.into_inner())
    }
}

/// XMLパーツの組み立て
pub(crate) struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// XML宣言付きで開始する
    pub fn new() -> Result<Self, SweeperError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SweeperError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<(), SweeperError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SweeperError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// テキストを書き込む（XMLで使えない制御文字は除去、特殊文字はエスケープ）
    pub fn text(&mut self, text: &str) -> Result<(), SweeperError> {
        let cleaned = sanitize_xml_text(text);
        self.writer
            .write_event(Event::Text(BytesText::new(&cleaned)))?;
        Ok(())
    }

    /// `<name attrs>text</name>`を書き込む
    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), SweeperError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// XML 1.0の文字範囲（`Char`）外の文字を除去する
pub(crate) fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(
                c,
                '\t' | '\n' | '\r'
                    | '\u{20}'..='\u{D7FF}'
                    | '\u{E000}'..='\u{FFFD}'
                    | '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect()
}

/// パッケージのリレーションシップ（`_rels/.rels`）
pub(crate) fn package_relationships(main_part: &str) -> Result<Vec<u8>, SweeperError> {
    relationships(&[
        ("rId1", REL_OFFICE_DOCUMENT, main_part),
        ("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
    ])
}

/// リレーションシップパーツ
pub(crate) fn relationships(entries: &[(&str, &str, &str)]) -> Result<Vec<u8>, SweeperError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_RELS_NS)])?;
    for &(id, rel_type, target) in entries {
        xml.empty(
            "Relationship",
            &[("Id", id), ("Type", rel_type), ("Target", target)],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `[Content_Types].xml`
///
/// `overrides`はパーツ名とコンテンツタイプの組です。
pub(crate) fn content_types(overrides: &[(&str, &str)]) -> Result<Vec<u8>, SweeperError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            (
                "ContentType",
                "application/vnd.openxmlformats-package.relationships+xml",
            ),
        ],
    )?;
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for &(part, content_type) in overrides {
        xml.empty(
            "Override",
            &[("PartName", part), ("ContentType", content_type)],
        )?;
    }
    xml.empty(
        "Override",
        &[
            ("PartName", "/docProps/core.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-package.core-properties+xml",
            ),
        ],
    )?;
    xml.end("Types")?;
    Ok(xml.finish())
}

/// `docProps/core.xml`（タイトル・作成者・作成日時）
pub(crate) fn core_properties(title: &str) -> Result<Vec<u8>, SweeperError> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut xml = XmlBuilder::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", &[], title)?;
    xml.text_element("dc:creator", &[], "datasweeper")?;
    xml.text_element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &now)?;
    xml.text_element("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &now)?;
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}
