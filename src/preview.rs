//! Preview Module
//!
//! アップロードファイルの情報表示と、抽出結果のプレビュー生成を提供するモジュール。
//! テーブルのプレビューは表示幅（全角文字は2）で揃えたパイプ区切りの表として描画します。

use std::fmt;

use unicode_width::UnicodeWidthStr;

use crate::types::{Record, Table, UploadedFile};

/// プレビュー行数のデフォルト値
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// アップロードファイルの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// ファイル名
    pub name: String,
    /// バイト数
    pub size_bytes: usize,
}

impl FileInfo {
    pub fn of(file: &UploadedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_bytes: file.size(),
        }
    }

    /// キロバイト単位のサイズ
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} KB)", self.name, self.size_kb())
    }
}

/// 抽出結果のプレビュー
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// テーブルの先頭行
    Table(Table),
    /// テキスト全文
    Text(String),
}

impl Preview {
    /// レコードからプレビューを生成する
    ///
    /// テーブルは先頭`rows`行、テキスト行は全文（改行で連結）になります。
    pub fn of(record: &Record, rows: usize) -> Self {
        match record {
            Record::Table(table) => Preview::Table(table.head(rows)),
            Record::TextLines(lines) => Preview::Text(lines.join("\n")),
        }
    }

    /// プレビューを文字列として描画する
    pub fn render(&self) -> String {
        match self {
            Preview::Table(table) => render_table(table),
            Preview::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// テーブルをパイプ区切りの表として描画する
fn render_table(table: &Table) -> String {
    if table.columns().is_empty() {
        return String::new();
    }

    let header: Vec<String> = table.columns().iter().map(|c| cell_text(c)).collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell_text(&cell.to_string())).collect())
        .collect();

    // 最小幅は3文字（区切り行の最小幅）
    let mut widths = vec![3; header.len()];
    for row in std::iter::once(&header).chain(body.iter()) {
        for (col, text) in row.iter().enumerate() {
            widths[col] = widths[col].max(text.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    out.push('|');
    for &width in &widths {
        out.push_str(&"-".repeat(width + 2));
        out.push('|');
    }
    out.push('\n');
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (text, &width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(text);
        out.push_str(&" ".repeat(width.saturating_sub(text.width())));
        out.push_str(" |");
    }
    out.push('\n');
}

/// セル内容を1行に収める（改行は空白、`|`はエスケープ）
fn cell_text(content: &str) -> String {
    content
        .trim()
        .replace(['\r', '\n'], " ")
        .replace('|', "\\|")
}
