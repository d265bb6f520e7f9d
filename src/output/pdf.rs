//! PDF Writer
//!
//! テキスト行をA4ページに書き出す。各行は固定幅のセルとして単語単位で折り返され、
//! 下余白に達すると自動的に改ページします。フォントは標準14フォントのCourier
//! （WinAnsiEncoding）を使用するため、Latin-1の範囲外の文字は`?`に置き換えます。

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::SweeperError;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Courierの文字幅（フォントサイズに対する比率）
const COURIER_ADVANCE: f32 = 0.6;

/// PDFのページレイアウト設定（単位はミリメートル、フォントサイズのみポイント）
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    /// ページ幅
    pub page_width_mm: f32,
    /// ページ高さ
    pub page_height_mm: f32,
    /// 左余白
    pub margin_left_mm: f32,
    /// 上余白
    pub margin_top_mm: f32,
    /// 右余白
    pub margin_right_mm: f32,
    /// 自動改ページの下余白
    pub margin_bottom_mm: f32,
    /// セル内の左右余白
    pub cell_margin_mm: f32,
    /// セル幅
    pub cell_width_mm: f32,
    /// 行の高さ
    pub line_height_mm: f32,
    /// フォントサイズ（ポイント）
    pub font_size_pt: f32,
}

impl Default for PdfLayout {
    /// A4、左・上・右10mm、下15mm、Courier 10pt、行の高さ10mm、セル幅190mm
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_left_mm: 10.0,
            margin_top_mm: 10.0,
            margin_right_mm: 10.0,
            margin_bottom_mm: 15.0,
            cell_margin_mm: 1.0,
            cell_width_mm: 190.0,
            line_height_mm: 10.0,
            font_size_pt: 10.0,
        }
    }
}

impl PdfLayout {
    /// 1行に収まる文字数
    pub fn chars_per_line(&self) -> usize {
        let usable_mm = self.cell_width_mm - 2.0 * self.cell_margin_mm;
        let char_mm = self.font_size_pt * COURIER_ADVANCE / POINTS_PER_MM;
        if usable_mm <= 0.0 || char_mm <= 0.0 {
            return 0;
        }
        (usable_mm / char_mm).floor() as usize
    }

    /// 1ページに収まる行数
    pub fn lines_per_page(&self) -> usize {
        let usable_mm = self.page_height_mm - self.margin_top_mm - self.margin_bottom_mm;
        if usable_mm <= 0.0 || self.line_height_mm <= 0.0 {
            return 0;
        }
        (usable_mm / self.line_height_mm).floor() as usize
    }

    /// レイアウトの妥当性を検証する
    ///
    /// 少なくとも1ページに1行、1行に1文字が収まる必要があります。
    pub(crate) fn validate(&self) -> Result<(), SweeperError> {
        let dimensions = [
            self.page_width_mm,
            self.page_height_mm,
            self.cell_width_mm,
            self.line_height_mm,
            self.font_size_pt,
        ];
        if dimensions.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(SweeperError::Config(
                "PDF page size, cell width, line height and font size must be positive"
                    .to_string(),
            ));
        }
        if self.margin_left_mm + self.cell_width_mm > self.page_width_mm {
            return Err(SweeperError::Config(
                "PDF cell does not fit within the page width".to_string(),
            ));
        }
        if self.lines_per_page() == 0 {
            return Err(SweeperError::Config(
                "PDF layout leaves no room for a single line per page".to_string(),
            ));
        }
        if self.chars_per_line() == 0 {
            return Err(SweeperError::Config(
                "PDF layout leaves no room for a single character per line".to_string(),
            ));
        }
        Ok(())
    }
}

/// テキスト行をPDF文書に変換する
pub(crate) fn write_pdf(lines: &[String], layout: &PdfLayout) -> Result<Vec<u8>, SweeperError> {
    layout.validate()?;

    let width = layout.chars_per_line();
    let visual_lines: Vec<Vec<u8>> = lines
        .iter()
        .flat_map(|line| wrap_line(&encode_win_ansi(line), width))
        .collect();

    let per_page = layout.lines_per_page();
    let mut pages: Vec<&[Vec<u8>]> = visual_lines.chunks(per_page).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let content = page_content(page_lines, layout);
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(SweeperError::pdf)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(mm_to_pt(layout.page_width_mm).into()),
        Object::Real(mm_to_pt(layout.page_height_mm).into()),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = info_dictionary(&mut doc);
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(SweeperError::pdf)?;
    Ok(buffer)
}

fn info_dictionary(doc: &mut Document) -> ObjectId {
    let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    doc.add_object(dictionary! {
        "Producer" => Object::string_literal("datasweeper"),
        "Title" => Object::string_literal("Converted Data"),
        "CreationDate" => Object::string_literal(created),
    })
}

/// 1ページ分のコンテンツストリームを組み立てる
///
/// 行ごとに独立したテキストオブジェクト（BT/ET）を出力します。
/// 空行はテキストを描画せず、行送りのみ行います。
fn page_content(lines: &[Vec<u8>], layout: &PdfLayout) -> Content {
    let page_height = mm_to_pt(layout.page_height_mm);
    let line_height = mm_to_pt(layout.line_height_mm);
    let x = mm_to_pt(layout.margin_left_mm + layout.cell_margin_mm);
    let top = mm_to_pt(layout.margin_top_mm);

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        // セル内で垂直方向中央にベースラインを置く
        let cell_top = top + i as f32 * line_height;
        let baseline = page_height - (cell_top + 0.5 * line_height + 0.3 * layout.font_size_pt);

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec!["F1".into(), Object::Real(layout.font_size_pt.into())],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(x.into()), Object::Real(baseline.into())],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.clone())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// 文字列をWinAnsi（Windows-1252）のバイト列に変換する
///
/// タブは空白に、表現できない文字は`?`に置き換えます。
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{00A0}'..='\u{00FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// 1行を指定文字数で折り返す
///
/// 空白で単語に区切って詰め込み、1単語が幅を超える場合は強制的に分割します。
/// 空行は空の1行になります。
pub(crate) fn wrap_line(line: &[u8], width: usize) -> Vec<Vec<u8>> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in line.split(|&b| b == b' ') {
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };

        if needed <= width {
            if !current.is_empty() {
                current.push(b' ');
            }
            current.extend_from_slice(word);
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }

        let mut rest = word;
        while rest.len() > width {
            let (head, tail) = rest.split_at(width);
            out.push(head.to_vec());
            rest = tail;
        }
        current.extend_from_slice(rest);
    }

    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FileFormat;
    use crate::extract::extract;
    use crate::types::Record;

    #[test]
    fn test_default_layout_capacity() {
        let layout = PdfLayout::default();
        assert_eq!(layout.chars_per_line(), 88);
        assert_eq!(layout.lines_per_page(), 27);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_layout_validation_rejects_tiny_page() {
        let layout = PdfLayout {
            page_height_mm: 20.0,
            ..PdfLayout::default()
        };
        assert!(matches!(layout.validate(), Err(SweeperError::Config(_))));
    }

    #[test]
    fn test_wrap_line_word_boundaries() {
        let wrapped = wrap_line(b"aaa bbb ccc", 7);
        assert_eq!(wrapped, vec![b"aaa bbb".to_vec(), b"ccc".to_vec()]);
    }

    #[test]
    fn test_wrap_line_hard_breaks_long_words() {
        let wrapped = wrap_line(b"abcdefghij", 4);
        assert_eq!(
            wrapped,
            vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]
        );
    }

    #[test]
    fn test_wrap_line_empty() {
        assert_eq!(wrap_line(b"", 10), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("café\t€"), vec![b'c', b'a', b'f', 0xE9, b' ', 0x80]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_write_pdf_reextracts_lines() {
        let lines = vec!["Hello".to_string(), "World".to_string()];
        let bytes = write_pdf(&lines, &PdfLayout::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        match extract(&bytes, FileFormat::Pdf).unwrap() {
            Record::TextLines(extracted) => assert_eq!(extracted, lines),
            other => panic!("Expected text lines, got {:?}", other),
        }
    }

    #[test]
    fn test_write_pdf_paginates() {
        let lines: Vec<String> = (0..60).map(|i| format!("line {}", i)).collect();
        let bytes = write_pdf(&lines, &PdfLayout::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_write_pdf_without_lines_has_one_page() {
        let bytes = write_pdf(&[], &PdfLayout::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_wrap_line_respects_width(
                words in prop::collection::vec("[a-z]{1,10}", 0..40),
                width in 10usize..40,
            ) {
                let line = words.join(" ");
                let wrapped = wrap_line(line.as_bytes(), width);

                prop_assert!(wrapped.iter().all(|l| l.len() <= width));
                // 単語が幅に収まる場合、空白で連結すると元の行に戻る
                prop_assert_eq!(wrapped.join(&b' '), line.into_bytes());
            }
        }
    }
}
