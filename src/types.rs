//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 抽出結果はすべて[`Record`]（テーブルまたはテキスト行）に正規化されます。

use crate::error::SweeperError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 空セル（欠損値）
    Empty,

    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 数値の場合はその値を返す
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// 列名付きのテーブル
///
/// 列名は一意で、順序はクレンジング後も保持されます。
/// 各行は列と同じ数のセルを持ちます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 列名と行からテーブルを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Table)` - 列名が一意で、すべての行の長さが列数と一致する場合
    /// * `Err(SweeperError::DuplicateColumn)` - 列名が重複している場合
    /// * `Err(SweeperError::Config)` - 行の長さが列数と一致しない場合
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, SweeperError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SweeperError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SweeperError::Config(format!(
                "Row {} has {} cells but the table has {} columns",
                idx,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// 1列のテキストテーブルを生成する
    pub fn from_lines(column: &str, lines: &[String]) -> Self {
        Self {
            columns: vec![column.to_string()],
            rows: lines
                .iter()
                .map(|line| vec![CellValue::Text(line.clone())])
                .collect(),
        }
    }

    /// 列名の一覧
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 行の一覧
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 行が1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列名から列インデックスを取得
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 行番号と列名でセルを取得
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// 列の値を上から順に取得
    pub fn column_values(&self, column: &str) -> Option<Vec<&CellValue>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[col]).collect())
    }

    /// 数値列かどうか（空以外の値がすべて数値）
    pub(crate) fn is_numeric_column(&self, col: usize) -> bool {
        self.rows
            .iter()
            .all(|row| matches!(row[col], CellValue::Number(_) | CellValue::Empty))
    }

    /// 数値列の列名一覧（列順）
    ///
    /// 空以外の値がすべて数値である列を数値列とみなします。
    pub fn numeric_columns(&self) -> Vec<&str> {
        (0..self.columns.len())
            .filter(|&col| self.is_numeric_column(col))
            .map(|col| self.columns[col].as_str())
            .collect()
    }

    /// 先頭`n`行だけを持つテーブルを返す
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// 指定列をテキスト行に平坦化する
    ///
    /// # 戻り値
    ///
    /// * `Err(SweeperError::MissingTextColumn)` - 列が存在しない場合
    pub fn text_lines(&self, column: &str) -> Result<Vec<String>, SweeperError> {
        let col = self
            .column_index(column)
            .ok_or_else(|| SweeperError::MissingTextColumn {
                column: column.to_string(),
            })?;

        Ok(self.rows.iter().map(|row| row[col].to_string()).collect())
    }
}

/// 正規化されたレコード
///
/// 抽出結果の内部表現。テーブル（CSV / Excel）またはテキスト行（Word / PDF / PowerPoint）の
/// どちらか一方を保持します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    /// 表形式データ
    Table(Table),

    /// テキスト行の並び
    TextLines(Vec<String>),
}

impl Record {
    /// テキスト行からレコードを生成する（改行で分割）
    pub(crate) fn from_text(text: &str) -> Self {
        Record::TextLines(text.split('\n').map(|s| s.to_string()).collect())
    }

    /// テーブルとして参照する（テキスト行の場合は`None`）
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Record::Table(table) => Some(table),
            Record::TextLines(_) => None,
        }
    }

    /// テーブル表現を得る
    ///
    /// テキスト行は`text_column`という名前の1列テーブルになります。
    pub fn to_table(&self, text_column: &str) -> Table {
        match self {
            Record::Table(table) => table.clone(),
            Record::TextLines(lines) => Table::from_lines(text_column, lines),
        }
    }

    /// テーブル表現に置き換えて、可変参照を返す
    pub(crate) fn make_table(&mut self, text_column: &str) -> &mut Table {
        if let Record::TextLines(lines) = self {
            *self = Record::Table(Table::from_lines(text_column, lines));
        }
        match self {
            Record::Table(table) => table,
            Record::TextLines(_) => unreachable!("record was converted to a table above"),
        }
    }

    /// テキスト行表現を得る
    ///
    /// テーブルの場合は`text_column`列を平坦化します。
    pub fn to_lines(&self, text_column: &str) -> Result<Vec<String>, SweeperError> {
        match self {
            Record::Table(table) => table.text_lines(text_column),
            Record::TextLines(lines) => Ok(lines.clone()),
        }
    }
}

/// アップロードされたファイル
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 拡張子付きのファイル名
    pub name: String,

    /// ファイルの内容
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// 新しいアップロードファイルを生成
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// バイト数
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// 変換済み（ダウンロード可能）のファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    /// 出力ファイル名（元のファイル名 + 変換先の拡張子）
    pub file_name: String,

    /// MIMEタイプ
    pub mime_type: &'static str,

    /// ファイルの内容
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            vec!["name".to_string(), "score".to_string()],
            vec![
                vec!["alice".into(), 90.0.into()],
                vec!["bob".into(), CellValue::Empty],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_new_rejects_duplicate_columns() {
        let result = Table::new(vec!["a".to_string(), "a".to_string()], vec![]);
        assert!(matches!(
            result,
            Err(SweeperError::DuplicateColumn { ref column }) if column == "a"
        ));
    }

    #[test]
    fn test_table_new_rejects_ragged_rows() {
        let result = Table::new(vec!["a".to_string()], vec![vec![1.0.into(), 2.0.into()]]);
        assert!(matches!(result, Err(SweeperError::Config(_))));
    }

    #[test]
    fn test_get_and_column_values() {
        let table = sample_table();
        assert_eq!(table.get(0, "name"), Some(&CellValue::Text("alice".into())));
        assert_eq!(table.get(1, "score"), Some(&CellValue::Empty));
        assert_eq!(table.get(2, "score"), None);
        assert_eq!(table.get(0, "missing"), None);
        assert_eq!(table.column_values("score").unwrap().len(), 2);
    }

    #[test]
    fn test_numeric_columns() {
        let table = sample_table();
        assert_eq!(table.numeric_columns(), vec!["score"]);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(2.0).to_string(), "2");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_record_text_conversions() {
        let record = Record::from_text("Hello\nWorld");
        assert_eq!(
            record,
            Record::TextLines(vec!["Hello".to_string(), "World".to_string()])
        );

        let table = record.to_table("Text");
        assert_eq!(table.columns(), &["Text".to_string()]);
        assert_eq!(table.len(), 2);

        let lines = Record::Table(table).to_lines("Text").unwrap();
        assert_eq!(lines, vec!["Hello", "World"]);
    }

    #[test]
    fn test_to_lines_missing_text_column() {
        let record = Record::Table(sample_table());
        assert!(matches!(
            record.to_lines("Text"),
            Err(SweeperError::MissingTextColumn { .. })
        ));
    }

    #[test]
    fn test_make_table_converts_in_place() {
        let mut record = Record::TextLines(vec!["a".to_string()]);
        record.make_table("Text").rows.push(vec!["b".into()]);
        assert_eq!(record.as_table().unwrap().len(), 2);
    }

    #[test]
    fn test_cell_value_json() {
        let row = vec![CellValue::Empty, 1.5.into(), "x".into()];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,1.5,"x"]"#);
    }
}
