//! OOXML Archive Reader
//!
//! docx / pptx（ZIPアーカイブ）を開き、セキュリティ制限を検証したうえで
//! 内部のXMLパーツを取り出すためのヘルパー。

use std::io::{Cursor, Read};

use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::security::{validate_zip_path, SecurityConfig};

/// セキュリティ検証済みのOOXMLアーカイブ
pub(crate) struct OoxmlArchive<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    format: FileFormat,
}

impl<'a> OoxmlArchive<'a> {
    /// アーカイブを開き、ファイル数・パス・展開サイズを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(OoxmlArchive)` - 検証に成功した場合
    /// * `Err(SweeperError::MalformedInput)` - ZIPとして読めない場合
    /// * `Err(SweeperError::SecurityViolation)` - セキュリティ制限に違反した場合
    pub fn open(
        bytes: &'a [u8],
        format: FileFormat,
        security: &SecurityConfig,
    ) -> Result<Self, SweeperError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            SweeperError::malformed(format, format!("not a valid ZIP container: {}", e))
        })?;

        // セキュリティチェック: ファイル数の上限
        if archive.len() > security.max_file_count {
            return Err(SweeperError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                security.max_file_count
            )));
        }

        // セキュリティチェック: 各ファイルのパス検証とサイズチェック
        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive.by_index(i).map_err(SweeperError::zip)?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                SweeperError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > security.max_file_size {
                return Err(SweeperError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, security.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| {
                    SweeperError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;

            if total_decompressed_size > security.max_decompressed_size {
                return Err(SweeperError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, security.max_decompressed_size
                )));
            }
        }

        Ok(Self { archive, format })
    }

    /// パーツを読み込む（存在しない場合は`None`）
    pub fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, SweeperError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(SweeperError::zip(e)),
        };

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    /// 必須パーツを読み込む
    pub fn require(&mut self, name: &str) -> Result<Vec<u8>, SweeperError> {
        let format = self.format;
        self.read(name)?
            .ok_or_else(|| SweeperError::malformed(format, format!("missing part '{}'", name)))
    }

    /// アーカイブ内のパーツ名一覧
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(|n| n.to_string()).collect()
    }
}

/// 要素の属性値を取得する（存在しない場合は`None`）
///
/// OOXMLのパーツはUTF-8のため、生の値をUTF-8として読み、実体参照を展開します。
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SweeperError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            let raw = std::str::from_utf8(&attr.value).map_err(quick_xml::Error::from)?;
            let value = unescape(raw).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_and_read() {
        let bytes = build_zip(&[("word/document.xml", "<w:document/>")]);
        let mut archive =
            OoxmlArchive::open(&bytes, FileFormat::Docx, &SecurityConfig::default()).unwrap();

        assert_eq!(
            archive.read("word/document.xml").unwrap().unwrap(),
            b"<w:document/>"
        );
        assert!(archive.read("word/missing.xml").unwrap().is_none());
        assert!(matches!(
            archive.require("word/missing.xml"),
            Err(SweeperError::MalformedInput { .. })
        ));
        assert_eq!(archive.part_names(), vec!["word/document.xml".to_string()]);
    }

    #[test]
    fn test_open_not_a_zip() {
        let result = OoxmlArchive::open(b"plain text", FileFormat::Pptx, &SecurityConfig::default());
        assert!(matches!(
            result,
            Err(SweeperError::MalformedInput {
                format: FileFormat::Pptx,
                ..
            })
        ));
    }

    #[test]
    fn test_open_too_many_files() {
        let bytes = build_zip(&[("a.xml", "a"), ("b.xml", "b"), ("c.xml", "c")]);
        let security = SecurityConfig {
            max_file_count: 2,
            ..SecurityConfig::default()
        };
        match OoxmlArchive::open(&bytes, FileFormat::Docx, &security) {
            Err(SweeperError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
            _ => panic!("Expected SecurityViolation"),
        }
    }

    #[test]
    fn test_open_path_traversal() {
        let bytes = build_zip(&[("../evil.xml", "x")]);
        match OoxmlArchive::open(&bytes, FileFormat::Docx, &SecurityConfig::default()) {
            Err(SweeperError::SecurityViolation(msg)) => assert!(msg.contains("Invalid ZIP path")),
            _ => panic!("Expected SecurityViolation"),
        }
    }

    #[test]
    fn test_attr_value() {
        let start = BytesStart::from_content(r#"p:sldId id="256" r:id="rId2""#, 7);
        assert_eq!(attr_value(&start, b"r:id").unwrap(), Some("rId2".to_string()));
        assert_eq!(attr_value(&start, b"missing").unwrap(), None);
    }

    #[test]
    fn test_attr_value_unescapes_entities() {
        let start = BytesStart::from_content(r#"Relationship Target="a&amp;b/slide1.xml""#, 12);
        assert_eq!(
            attr_value(&start, b"Target").unwrap(),
            Some("a&b/slide1.xml".to_string())
        );
    }
}
