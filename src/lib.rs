//! datasweeper - Pure-Rust file sweeper for tabular and document files
//!
//! This crate extracts CSV, Excel, Word, PowerPoint and PDF files into one
//! normalized record (a table or a sequence of text lines), applies simple
//! cleaning operations to tables, and re-serializes the record into any of the
//! five formats.
//!
//! # Quick Start
//!
//! ```rust
//! use datasweeper::{CleanOp, FileFormat, PipelineBuilder, UploadedFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a pipeline with default settings
//!     let pipeline = PipelineBuilder::new().build()?;
//!
//!     // Extract the uploaded file
//!     let upload = UploadedFile::new("a.csv", "x,y\n1,2\n1,2\n3,\n");
//!     let mut processed = pipeline.process(&upload)?;
//!
//!     // Drop duplicate rows, then fill missing numbers with the column mean
//!     pipeline.clean(
//!         &mut processed.record,
//!         &[CleanOp::RemoveDuplicates, CleanOp::FillMissingNumeric],
//!     )?;
//!
//!     // Convert to Excel
//!     let converted = pipeline.convert(&processed.conversion_request(FileFormat::Xlsx))?;
//!     assert_eq!(converted.file_name, "a.xlsx");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batch Conversion
//!
//! Failures are collected per file and never abort the batch:
//!
//! ```rust
//! use datasweeper::{FileFormat, PipelineBuilder, UploadedFile};
//!
//! # fn main() -> Result<(), datasweeper::SweeperError> {
//! let pipeline = PipelineBuilder::new().build()?;
//! let files = vec![
//!     UploadedFile::new("a.csv", "x\n1\n"),
//!     UploadedFile::new("report.xyz", "?"),
//! ];
//!
//! let report = pipeline.convert_all(&files, &[], FileFormat::Pdf);
//! assert_eq!(report.converted.len(), 0); // a table without a "Text" column cannot become a PDF
//! assert_eq!(report.failures.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust
//! use datasweeper::{PdfLayout, PipelineBuilder};
//!
//! # fn main() -> Result<(), datasweeper::SweeperError> {
//! let pipeline = PipelineBuilder::new()
//!     .with_text_column("Line")
//!     .with_heading("Quarterly Notes")
//!     .with_pdf_layout(PdfLayout {
//!         font_size_pt: 12.0,
//!         ..PdfLayout::default()
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
pub mod chart;
pub mod cleaner;
mod error;
mod extract;
mod output;
mod preview;
mod security;
mod types;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

// 公開API
pub use api::{ChartKind, CleanOp, FileFormat};
pub use builder::{
    BatchReport, CleanReport, ConversionRequest, FileFailure, Pipeline, PipelineBuilder,
    ProcessedFile,
};
pub use chart::ChartData;
pub use error::SweeperError;
pub use extract::extract;
pub use output::{serialize, PdfLayout, RenderOptions, Serializer};
pub use preview::{FileInfo, Preview};
pub use types::{CellValue, ConvertedFile, Record, Table, UploadedFile};
