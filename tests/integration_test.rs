//! Integration Tests for datasweeper
//!
//! End-to-end tests for extraction, cleaning and conversion through the
//! public `Pipeline` API. Fixtures are generated in-process.

use rust_xlsxwriter::*;
use std::io::{Cursor, Write};
use datasweeper::{
    chart, extract, serialize, CellValue, ChartData, ChartKind, CleanOp, FileFormat,
    PipelineBuilder, Preview, Record, SweeperError, Table, UploadedFile,
};
use zip::write::{FileOptions, ZipWriter};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Build a ZIP container from (part name, content) pairs
    pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            let options = FileOptions::default();
            for (name, content) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        data
    }

    /// Generate a Word document with the given body paragraphs
    pub fn generate_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        zip_parts(&[("word/document.xml", document.as_str())])
    }

    /// Generate a presentation whose slide order differs from the file numbering
    pub fn generate_pptx() -> Vec<u8> {
        let presentation = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/></Relationships>"#;
        let slide1 = slide(&["Second slide"]);
        let slide2 = slide(&["Agenda", "Intro"]);
        zip_parts(&[
            ("ppt/presentation.xml", presentation),
            ("ppt/_rels/presentation.xml.rels", rels),
            ("ppt/slides/slide1.xml", slide1.as_str()),
            ("ppt/slides/slide2.xml", slide2.as_str()),
        ])
    }

    fn slide(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    /// Generate a workbook with mixed cell types
    pub fn generate_mixed_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        // Header row
        worksheet.write_string(0, 0, "name")?;
        worksheet.write_string(0, 1, "score")?;
        worksheet.write_string(0, 2, "passed")?;
        worksheet.write_string(0, 3, "date")?;

        // Data rows
        worksheet.write_string(1, 0, "Alice")?;
        worksheet.write_number(1, 1, 90.5)?;
        worksheet.write_boolean(1, 2, true)?;
        let date = ExcelDateTime::from_ymd(2024, 1, 15)?;
        worksheet.write_datetime_with_format(1, 3, &date, &date_format)?;

        worksheet.write_string(2, 0, "Bob")?;
        // score left empty
        worksheet.write_boolean(2, 2, false)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a purely numeric workbook with a duplicate row
    pub fn generate_numeric_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "x")?;
        worksheet.write_string(0, 1, "y")?;
        let rows = [(1.0, 10.0), (2.0, 20.0), (1.0, 10.0), (4.0, 40.0)];
        for (i, (x, y)) in rows.iter().enumerate() {
            worksheet.write_number(i as u32 + 1, 0, *x)?;
            worksheet.write_number(i as u32 + 1, 1, *y)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn table_of(record: &Record) -> &Table {
    record.as_table().expect("Expected a table record")
}

// TC-I-001: CSV dedup and mean fill
#[test]
fn test_csv_dedup_then_fill() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let mut processed = pipeline
        .process(&UploadedFile::new("a.csv", "x,y\n1,2\n1,2\n3,\n"))
        .unwrap();

    let report = pipeline
        .clean(
            &mut processed.record,
            &[CleanOp::RemoveDuplicates, CleanOp::FillMissingNumeric],
        )
        .unwrap();

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.filled.len(), 1);
    assert_eq!(report.filled[0].column, "y");
    assert_eq!(report.filled[0].mean, 2.0);

    let table = table_of(&processed.record);
    assert_eq!(
        table.rows(),
        &[
            vec![CellValue::Number(1.0), CellValue::Number(2.0)],
            vec![CellValue::Number(3.0), CellValue::Number(2.0)],
        ]
    );
}

// TC-I-002: Word to PDF and back
#[test]
fn test_docx_to_pdf_roundtrip() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let docx = fixtures::generate_docx(&["Hello", "World"]);
    let processed = pipeline.process(&UploadedFile::new("doc.docx", docx)).unwrap();

    assert_eq!(
        processed.record,
        Record::TextLines(vec!["Hello".to_string(), "World".to_string()])
    );

    let pdf = pipeline
        .convert(&processed.conversion_request(FileFormat::Pdf))
        .unwrap();
    assert_eq!(pdf.file_name, "doc.pdf");
    assert_eq!(pdf.mime_type, "application/pdf");

    let reextracted = extract(&pdf.bytes, FileFormat::Pdf).unwrap();
    assert_eq!(
        reextracted,
        Record::TextLines(vec!["Hello".to_string(), "World".to_string()])
    );
}

// TC-I-003: Batch with an unsupported file
#[test]
fn test_batch_skips_unsupported_file() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let files = vec![
        UploadedFile::new("a.csv", "x,y\n1,2\n"),
        UploadedFile::new("report.xyz", "irrelevant"),
        UploadedFile::new("doc.docx", fixtures::generate_docx(&["Hello"])),
    ];

    let report = pipeline.convert_all(&files, &[], FileFormat::Csv);

    let names: Vec<&str> = report
        .converted
        .iter()
        .map(|f| f.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["a.csv", "doc.csv"]);
    assert_eq!(report.failures.len(), 1);
    match &report.failures[0].error {
        SweeperError::UnsupportedFormat { extension } => assert_eq!(extension, ".xyz"),
        e => panic!("Expected UnsupportedFormat, got {:?}", e),
    }
    assert_eq!(report.converted[1].bytes, b"Text\nHello\n");
}

// TC-I-004: Unknown column selection leaves the record unchanged
#[test]
fn test_select_unknown_column() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let mut processed = pipeline
        .process(&UploadedFile::new("a.csv", "x,y\n1,2\n"))
        .unwrap();
    let before = processed.record.clone();

    let result = pipeline.clean(
        &mut processed.record,
        &[CleanOp::SelectColumns(vec!["nonexistent".to_string()])],
    );

    match result {
        Err(SweeperError::UnknownColumn { column }) => assert_eq!(column, "nonexistent"),
        other => panic!("Expected UnknownColumn, got {:?}", other),
    }
    assert_eq!(processed.record, before);
}

// TC-I-005: Table to CSV and back preserves columns, order and values
#[test]
fn test_csv_roundtrip() {
    let table = Table::new(
        vec!["city".to_string(), "pop".to_string(), "note".to_string()],
        vec![
            vec!["Tokyo".into(), 13.96.into(), "capital, large".into()],
            vec!["Osaka".into(), 2.7.into(), CellValue::Empty],
            vec!["Sapporo".into(), CellValue::Empty, "\"north\"".into()],
        ],
    )
    .unwrap();

    let (bytes, mime) = serialize(&Record::Table(table.clone()), FileFormat::Csv).unwrap();
    assert_eq!(mime, "text/csv");

    let back = extract(&bytes, FileFormat::Csv).unwrap();
    assert_eq!(back, Record::Table(table));
}

// TC-I-006: Excel extraction with mixed cell types
#[test]
fn test_xlsx_mixed_types() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let data = fixtures::generate_mixed_workbook().unwrap();
    let processed = pipeline.process(&UploadedFile::new("scores.xlsx", data)).unwrap();

    let table = table_of(&processed.record);
    assert_eq!(table.columns(), &["name", "score", "passed", "date"]);
    assert_eq!(table.get(0, "score"), Some(&CellValue::Number(90.5)));
    assert_eq!(table.get(0, "passed"), Some(&CellValue::from("TRUE")));
    assert_eq!(table.get(0, "date"), Some(&CellValue::from("2024-01-15")));
    assert_eq!(table.get(1, "score"), Some(&CellValue::Empty));
    assert_eq!(table.get(1, "date"), Some(&CellValue::Empty));
}

// TC-I-007: Excel clean and convert to CSV
#[test]
fn test_xlsx_select_and_convert_to_csv() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let data = fixtures::generate_numeric_workbook().unwrap();
    let mut processed = pipeline.process(&UploadedFile::new("data.xlsx", data)).unwrap();

    pipeline
        .clean(
            &mut processed.record,
            &[
                CleanOp::RemoveDuplicates,
                CleanOp::SelectColumns(vec!["y".to_string()]),
            ],
        )
        .unwrap();

    let converted = pipeline
        .convert(&processed.conversion_request(FileFormat::Csv))
        .unwrap();
    assert_eq!(converted.file_name, "data.csv");
    assert_eq!(converted.bytes, b"y\n10\n20\n40\n");
}

// TC-I-008: PowerPoint slides follow presentation order
#[test]
fn test_pptx_presentation_order() {
    let record = extract(&fixtures::generate_pptx(), FileFormat::Pptx).unwrap();
    assert_eq!(
        record,
        Record::TextLines(vec![
            "Agenda".to_string(),
            "Intro".to_string(),
            "Second slide".to_string(),
        ])
    );
}

// TC-I-009: Text lines to Excel become a one-column table
#[test]
fn test_text_lines_to_xlsx() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let processed = pipeline
        .process(&UploadedFile::new(
            "deck.pptx",
            fixtures::generate_pptx(),
        ))
        .unwrap();

    let converted = pipeline
        .convert(&processed.conversion_request(FileFormat::Xlsx))
        .unwrap();
    assert_eq!(converted.file_name, "deck.xlsx");
    assert_eq!(
        converted.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let back = extract(&converted.bytes, FileFormat::Xlsx).unwrap();
    let table = table_of(&back);
    assert_eq!(table.columns(), &["Text"]);
    assert_eq!(table.get(0, "Text"), Some(&CellValue::from("Agenda")));
    assert_eq!(table.len(), 3);
}

// TC-I-010: Table to Word using a configured text column
#[test]
fn test_table_to_docx_with_custom_text_column() {
    let pipeline = PipelineBuilder::new()
        .with_text_column("comment")
        .with_heading("Review")
        .build()
        .unwrap();
    let processed = pipeline
        .process(&UploadedFile::new(
            "feedback.csv",
            "id,comment\n1,Great\n2,Needs work\n",
        ))
        .unwrap();

    let converted = pipeline
        .convert(&processed.conversion_request(FileFormat::Docx))
        .unwrap();
    assert_eq!(converted.file_name, "feedback.docx");

    let back = extract(&converted.bytes, FileFormat::Docx).unwrap();
    assert_eq!(
        back,
        Record::TextLines(vec![
            "Review".to_string(),
            "Great".to_string(),
            "Needs work".to_string(),
        ])
    );
}

// TC-I-011: Word to PowerPoint keeps the fixed header first
#[test]
fn test_docx_to_pptx() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let processed = pipeline
        .process(&UploadedFile::new(
            "notes.docx",
            fixtures::generate_docx(&["one", "two"]),
        ))
        .unwrap();

    let converted = pipeline
        .convert(&processed.conversion_request(FileFormat::Pptx))
        .unwrap();
    assert_eq!(converted.file_name, "notes.pptx");

    let back = extract(&converted.bytes, FileFormat::Pptx).unwrap();
    assert_eq!(
        back,
        Record::TextLines(vec![
            "Converted Data".to_string(),
            "one".to_string(),
            "two".to_string(),
        ])
    );
}

// TC-I-012: Preview and chart data from an extracted table
#[test]
fn test_preview_and_chart() {
    let pipeline = PipelineBuilder::new().with_preview_rows(2).build().unwrap();
    let data = fixtures::generate_numeric_workbook().unwrap();
    let processed = pipeline.process(&UploadedFile::new("data.xlsx", data)).unwrap();

    assert_eq!(processed.info().to_string(), format!("data.xlsx ({:.2} KB)", processed.size as f64 / 1024.0));

    let preview = pipeline.preview(&processed);
    match &preview {
        Preview::Table(head) => assert_eq!(head.len(), 2),
        other => panic!("Expected table preview, got {:?}", other),
    }
    assert!(preview.render().starts_with("| x   | y   |"));

    let data = chart::prepare(table_of(&processed.record), ChartKind::Histogram).unwrap();
    match data {
        ChartData::Histogram { histograms } => {
            assert_eq!(histograms.len(), 2);
            let total: usize = histograms[0].bins.iter().map(|b| b.count).sum();
            assert_eq!(total, 4);
        }
        other => panic!("Expected histogram, got {:?}", other),
    }
}

// TC-I-013: Converted files written to disk can be read back
#[test]
fn test_converted_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = PipelineBuilder::new().build().unwrap();
    let processed = pipeline
        .process(&UploadedFile::new("a.csv", "x,y\n1,2\n"))
        .unwrap();
    let converted = pipeline
        .convert(&processed.conversion_request(FileFormat::Xlsx))
        .unwrap();

    let path = dir.path().join(&converted.file_name);
    std::fs::write(&path, &converted.bytes).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let reloaded = pipeline
        .process(&UploadedFile::new(converted.file_name.clone(), bytes))
        .unwrap();
    assert_eq!(reloaded.record, processed.record);
}

// TC-I-100: Table without a text column cannot become a document
#[test]
fn test_table_to_pdf_without_text_column() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let processed = pipeline
        .process(&UploadedFile::new("a.csv", "x,y\n1,2\n"))
        .unwrap();

    let result = pipeline.convert(&processed.conversion_request(FileFormat::Pdf));
    match result {
        Err(SweeperError::MissingTextColumn { column }) => assert_eq!(column, "Text"),
        other => panic!("Expected MissingTextColumn, got {:?}", other),
    }
}

// TC-I-101: Corrupt documents are reported as malformed input
#[test]
fn test_malformed_documents() {
    let pipeline = PipelineBuilder::new().build().unwrap();

    for (name, format) in [
        ("broken.docx", FileFormat::Docx),
        ("broken.pptx", FileFormat::Pptx),
        ("broken.pdf", FileFormat::Pdf),
    ] {
        let result = pipeline.process(&UploadedFile::new(name, "not a real file"));
        match result {
            Err(SweeperError::MalformedInput { format: f, .. }) => assert_eq!(f, format),
            other => panic!("Expected MalformedInput for {}, got {:?}", name, other),
        }
    }
}

// TC-I-102: Corrupt workbook is reported as a parse error
#[test]
fn test_malformed_workbook() {
    let pipeline = PipelineBuilder::new().build().unwrap();
    let result = pipeline.process(&UploadedFile::new("broken.xlsx", "not a workbook"));
    assert!(result.is_err());
}

// TC-I-103: Word file without a document part
#[test]
fn test_docx_missing_document_part() {
    let data = fixtures::zip_parts(&[("word/styles.xml", "<w:styles/>")]);
    match extract(&data, FileFormat::Docx) {
        Err(SweeperError::MalformedInput { message, .. }) => {
            assert!(message.contains("word/document.xml"))
        }
        other => panic!("Expected MalformedInput, got {:?}", other),
    }
}
