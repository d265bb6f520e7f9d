//! Cleaner Module
//!
//! テーブルに対するクレンジング操作を提供するモジュール。
//! いずれの操作もテーブルをその場で変更し、列の順序を保持します。

use std::collections::HashSet;

use crate::error::SweeperError;
use crate::types::{CellValue, Table};

/// 行比較用のセルキー
///
/// `f64`はハッシュできないため、ビット表現で比較します（`-0.0`は`0.0`に正規化）。
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Empty,
    Number(u64),
    Text(&'a str),
}

impl<'a> From<&'a CellValue> for CellKey<'a> {
    fn from(cell: &'a CellValue) -> Self {
        match cell {
            CellValue::Empty => CellKey::Empty,
            CellValue::Number(n) if *n == 0.0 => CellKey::Number(0.0f64.to_bits()),
            CellValue::Number(n) => CellKey::Number(n.to_bits()),
            CellValue::Text(s) => CellKey::Text(s),
        }
    }
}

/// 重複行を削除する
///
/// すべての列の値が一致する行を重複とみなし、最初の出現のみを残します。
/// 残った行の順序は保持されます。
///
/// # 戻り値
///
/// 削除された行数
pub fn remove_duplicates(table: &mut Table) -> usize {
    let before = table.rows.len();

    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(before);
        table
            .rows
            .iter()
            .map(|row| seen.insert(row.iter().map(CellKey::from).collect()))
            .collect()
    };

    let mut flags = keep.into_iter();
    table.rows.retain(|_| flags.next().unwrap_or(true));

    before - table.rows.len()
}

/// 平均値補完の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    /// 補完した列名と、補完に使用した平均値・補完したセル数
    pub filled: Vec<FilledColumn>,
}

impl FillReport {
    /// 補完したセルの総数
    pub fn total_cells(&self) -> usize {
        self.filled.iter().map(|c| c.cells).sum()
    }
}

/// 補完した列の情報
#[derive(Debug, Clone, PartialEq)]
pub struct FilledColumn {
    /// 列名
    pub column: String,
    /// 補完に使用した平均値
    pub mean: f64,
    /// 補完したセル数
    pub cells: usize,
}

/// 数値列の欠損値を列の平均値で補完する
///
/// 空以外の値がすべて数値である列を対象とし、空セルを補完前の非空値の
/// 算術平均で置き換えます。文字列を含む列は変更しません。
/// 非空値が1つもない数値列は何もしません（エラーにはなりません）。
pub fn fill_missing_numeric(table: &mut Table) -> FillReport {
    let mut report = FillReport::default();

    for col in 0..table.columns.len() {
        if !table.is_numeric_column(col) {
            continue;
        }

        let (sum, count, missing) =
            table
                .rows
                .iter()
                .fold((0.0f64, 0usize, 0usize), |(sum, count, missing), row| {
                    match row[col] {
                        CellValue::Number(n) => (sum + n, count + 1, missing),
                        _ => (sum, count, missing + 1),
                    }
                });

        if count == 0 || missing == 0 {
            continue;
        }

        let mean = sum / count as f64;
        for row in table.rows.iter_mut() {
            if row[col].is_empty() {
                row[col] = CellValue::Number(mean);
            }
        }

        report.filled.push(FilledColumn {
            column: table.columns[col].clone(),
            mean,
            cells: missing,
        });
    }

    report
}

/// 指定した列のみを指定順で残す
///
/// # 戻り値
///
/// * `Ok(())` - 射影に成功した場合
/// * `Err(SweeperError::UnknownColumn)` - 存在しない列が指定された場合
/// * `Err(SweeperError::DuplicateColumn)` - 同じ列が複数回指定された場合
///
/// エラーの場合、テーブルは変更されません。
pub fn select_columns<S: AsRef<str>>(table: &mut Table, keep: &[S]) -> Result<(), SweeperError> {
    let mut seen = HashSet::with_capacity(keep.len());
    let mut indices = Vec::with_capacity(keep.len());

    for name in keep {
        let name = name.as_ref();
        let idx = table
            .column_index(name)
            .ok_or_else(|| SweeperError::UnknownColumn {
                column: name.to_string(),
            })?;
        if !seen.insert(idx) {
            return Err(SweeperError::DuplicateColumn {
                column: name.to_string(),
            });
        }
        indices.push(idx);
    }

    table.columns = indices.iter().map(|&i| table.columns[i].clone()).collect();
    for row in table.rows.iter_mut() {
        *row = indices.iter().map(|&i| row[i].clone()).collect();
    }

    Ok(())
}
