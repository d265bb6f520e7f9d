//! Builder Module
//!
//! Fluent Builder APIを提供し、`Pipeline`インスタンスを段階的に構築する。
//! `Pipeline`は抽出・クレンジング・変換の各ステップを明示的なメソッドとして公開します。
//! ステップが自動的に連鎖することはなく、呼び出し間で状態を保持しません。

use tracing::{debug, info, warn};

use crate::api::{CleanOp, FileFormat};
use crate::cleaner::{self, FilledColumn};
use crate::error::SweeperError;
use crate::extract;
use crate::output::{PdfLayout, RenderOptions, Serializer};
use crate::preview::{FileInfo, Preview, DEFAULT_PREVIEW_ROWS};
use crate::security::SecurityConfig;
use crate::types::{ConvertedFile, Record, UploadedFile};

/// パイプラインの設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// 書き出し設定（テキスト列名・見出し・PDFレイアウト）
    pub render: RenderOptions,

    /// プレビューに表示する行数
    pub preview_rows: usize,

    /// セキュリティ制限
    pub security: SecurityConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use datasweeper::PipelineBuilder;
///
/// # fn main() -> Result<(), datasweeper::SweeperError> {
/// let pipeline = PipelineBuilder::new()
///     .with_text_column("Line")
///     .with_preview_rows(10)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineBuilder {
    /// 内部設定（構築中）
    config: PipelineConfig,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - テキスト列名: `Text`
    /// - 見出し: `Converted Data`
    /// - プレビュー行数: 5
    /// - PDFレイアウト: A4、Courier 10pt
    /// - アップロードサイズ上限: 200MB
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// テキスト行とテーブルの相互変換に使う列名を指定する
    ///
    /// テキスト行をCSV / Excelに書き出すときの列名であり、
    /// テーブルをWord / PowerPoint / PDFに書き出すときに平坦化する列名です。
    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.config.render.text_column = column.into();
        self
    }

    /// Word / PowerPointの先頭に置く見出しを指定する
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.config.render.heading = heading.into();
        self
    }

    /// プレビューに表示する行数を指定する
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.config.preview_rows = rows;
        self
    }

    /// PDFのページレイアウトを指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use datasweeper::{PdfLayout, PipelineBuilder};
    ///
    /// let builder = PipelineBuilder::new().with_pdf_layout(PdfLayout {
    ///     font_size_pt: 12.0,
    ///     ..PdfLayout::default()
    /// });
    /// ```
    pub fn with_pdf_layout(mut self, layout: PdfLayout) -> Self {
        self.config.render.pdf_layout = layout;
        self
    }

    /// アップロードファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Pipeline`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Pipeline)`: 設定が有効な場合
    /// * `Err(SweeperError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * テキスト列名が空
    /// * プレビュー行数が0
    /// * PDFレイアウトに1行・1文字分の領域がない
    /// * アップロードサイズ上限が0
    pub fn build(self) -> Result<Pipeline, SweeperError> {
        // 1. テキスト列名の検証
        if self.config.render.text_column.trim().is_empty() {
            return Err(SweeperError::Config(
                "Text column name must not be empty".to_string(),
            ));
        }

        // 2. プレビュー行数の検証
        if self.config.preview_rows == 0 {
            return Err(SweeperError::Config(
                "Preview rows must be at least 1".to_string(),
            ));
        }

        // 3. PDFレイアウトの検証
        self.config.render.pdf_layout.validate()?;

        // 4. サイズ上限の検証
        if self.config.security.max_input_file_size == 0 {
            return Err(SweeperError::Config(
                "Maximum input size must be greater than 0".to_string(),
            ));
        }

        Ok(Pipeline::new(self.config))
    }
}

/// 抽出済みのファイル
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    /// 元のファイル名
    pub name: String,
    /// 元のファイルのバイト数
    pub size: usize,
    /// 検出された入力形式
    pub format: FileFormat,
    /// 正規化されたレコード
    pub record: Record,
}

impl ProcessedFile {
    /// ファイル情報
    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size_bytes: self.size,
        }
    }

    /// このファイルを指定形式に変換するリクエストを作る
    pub fn conversion_request(&self, target: FileFormat) -> ConversionRequest<'_> {
        ConversionRequest::new(&self.name, &self.record, target)
    }
}

/// 変換リクエスト
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    /// 元のファイル名（出力ファイル名の基になる）
    pub original_name: &'a str,
    /// 変換するレコード
    pub record: &'a Record,
    /// 変換先の形式
    pub target: FileFormat,
}

impl<'a> ConversionRequest<'a> {
    pub fn new(original_name: &'a str, record: &'a Record, target: FileFormat) -> Self {
        Self {
            original_name,
            record,
            target,
        }
    }
}

/// クレンジングの結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// 削除された重複行の数
    pub duplicates_removed: usize,
    /// 平均値で補完した列
    pub filled: Vec<FilledColumn>,
    /// 列選択後の列名（列選択を行わなかった場合は`None`）
    pub selected: Option<Vec<String>>,
}

/// 一括変換で失敗したファイル
#[derive(Debug)]
pub struct FileFailure {
    /// ファイル名
    pub name: String,
    /// 失敗の原因
    pub error: SweeperError,
}

/// 一括変換の結果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 変換に成功したファイル（入力順）
    pub converted: Vec<ConvertedFile>,
    /// 失敗したファイル（入力順）
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// すべてのファイルが変換できたか
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 変換処理のファサード
///
/// アップロードされたファイルの抽出・クレンジング・変換を行うメインエントリーポイントです。
/// `PipelineBuilder`で構築した不変の設定のみを保持します。
///
/// # 使用例
///
/// ```rust
/// use datasweeper::{CleanOp, FileFormat, PipelineBuilder, UploadedFile};
///
/// # fn main() -> Result<(), datasweeper::SweeperError> {
/// let pipeline = PipelineBuilder::new().build()?;
/// let file = UploadedFile::new("a.csv", "x,y\n1,2\n1,2\n3,\n");
///
/// let mut processed = pipeline.process(&file)?;
/// pipeline.clean(
///     &mut processed.record,
///     &[CleanOp::RemoveDuplicates, CleanOp::FillMissingNumeric],
/// )?;
///
/// let converted = pipeline.convert(&processed.conversion_request(FileFormat::Csv))?;
/// assert_eq!(converted.file_name, "a.csv");
/// assert_eq!(converted.bytes, b"x,y\n1,2\n3,2\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// パイプライン設定
    config: PipelineConfig,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub(crate) fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// アップロードファイルを抽出する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ProcessedFile)` - 抽出に成功した場合
    /// * `Err(SweeperError::UnsupportedFormat)` - 未対応の拡張子の場合
    /// * `Err(SweeperError::SecurityViolation)` - サイズ上限を超えた場合
    /// * `Err(SweeperError)` - ファイルの解析に失敗した場合
    pub fn process(&self, file: &UploadedFile) -> Result<ProcessedFile, SweeperError> {
        let format = match FileFormat::from_file_name(&file.name) {
            Ok(format) => format,
            Err(e) => {
                warn!(file = %file.name, error = %e, "Unsupported file skipped");
                return Err(e);
            }
        };

        self.config
            .security
            .check_input_size(&file.name, file.size())?;

        let record = extract::extract_with(&file.bytes, format, &self.config.security)?;

        match &record {
            Record::Table(table) => info!(
                file = %file.name,
                format = %format,
                rows = table.len(),
                columns = table.columns().len(),
                "Extracted table"
            ),
            Record::TextLines(lines) => info!(
                file = %file.name,
                format = %format,
                lines = lines.len(),
                "Extracted text"
            ),
        }

        Ok(ProcessedFile {
            name: file.name.clone(),
            size: file.size(),
            format,
            record,
        })
    }

    /// クレンジング操作を順番に適用する
    ///
    /// テキスト行のレコードは、最初にテキスト列1列のテーブルに変換されます。
    /// 操作が空の場合、レコードは変更されません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(CleanReport)` - すべての操作に成功した場合
    /// * `Err(SweeperError)` - いずれかの操作に失敗した場合（レコードは呼び出し前のまま）
    pub fn clean(
        &self,
        record: &mut Record,
        operations: &[CleanOp],
    ) -> Result<CleanReport, SweeperError> {
        let mut report = CleanReport::default();
        if operations.is_empty() {
            return Ok(report);
        }

        let mut working = record.clone();
        let table = working.make_table(&self.config.render.text_column);

        for operation in operations {
            match operation {
                CleanOp::RemoveDuplicates => {
                    let removed = cleaner::remove_duplicates(table);
                    debug!(removed, remaining = table.len(), "Removed duplicate rows");
                    report.duplicates_removed += removed;
                }
                CleanOp::FillMissingNumeric => {
                    let filled = cleaner::fill_missing_numeric(table);
                    debug!(
                        columns = filled.filled.len(),
                        cells = filled.total_cells(),
                        "Filled missing numeric values"
                    );
                    report.filled.extend(filled.filled);
                }
                CleanOp::SelectColumns(keep) => {
                    cleaner::select_columns(table, keep)?;
                    debug!(columns = ?keep, "Selected columns");
                    report.selected = Some(keep.clone());
                }
            }
        }

        *record = working;
        Ok(report)
    }

    /// レコードを変換先の形式に書き出す
    ///
    /// 出力ファイル名は元のファイル名の拡張子を変換先の拡張子に置き換えたものです。
    pub fn convert(&self, request: &ConversionRequest<'_>) -> Result<ConvertedFile, SweeperError> {
        let serializer = Serializer::from_format(request.target);
        let bytes = serializer.render(request.record, &self.config.render)?;
        let file_name = request.target.output_file_name(request.original_name);

        info!(
            file = %request.original_name,
            output = %file_name,
            bytes = bytes.len(),
            "Converted file"
        );

        Ok(ConvertedFile {
            file_name,
            mime_type: serializer.mime_type(),
            bytes,
        })
    }

    /// 複数ファイルを抽出・クレンジング・変換する
    ///
    /// ファイルは入力順に1つずつ処理されます。失敗したファイルは原因とともに記録され、
    /// 残りのファイルの処理は継続します。
    pub fn convert_all(
        &self,
        files: &[UploadedFile],
        operations: &[CleanOp],
        target: FileFormat,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for file in files {
            match self.convert_one(file, operations, target) {
                Ok(converted) => report.converted.push(converted),
                Err(error) => {
                    warn!(file = %file.name, error = %error, "File conversion failed");
                    report.failures.push(FileFailure {
                        name: file.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            converted = report.converted.len(),
            failed = report.failures.len(),
            "Batch conversion finished"
        );
        report
    }

    fn convert_one(
        &self,
        file: &UploadedFile,
        operations: &[CleanOp],
        target: FileFormat,
    ) -> Result<ConvertedFile, SweeperError> {
        let mut processed = self.process(file)?;
        self.clean(&mut processed.record, operations)?;
        self.convert(&processed.conversion_request(target))
    }

    /// 抽出済みファイルのプレビューを作る
    pub fn preview(&self, file: &ProcessedFile) -> Preview {
        Preview::of(&file.record, self.config.preview_rows)
    }
}
