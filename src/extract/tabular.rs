//! Tabular Extractors
//!
//! CSVとExcelブックをテーブルに読み込む。
//! 列の型推論はデータフレームの慣習に従い、欠損値以外がすべて数値の列のみ数値列とします。

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::{SubsecRound, Timelike};

use crate::api::FileFormat;
use crate::error::SweeperError;
use crate::types::{CellValue, Table};

/// 欠損値として扱う文字列
/// 日付として解釈するシリアル値の上限（9999-12-31の翌日）
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// 期間として解釈するシリアル値（日数）の絶対値の上限
const MAX_DURATION_DAYS: f64 = 1.0e9;

const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSVを読み込む
///
/// 1行目をヘッダーとして扱います。ヘッダーより短い行は空セルで補完し、
/// 長い行は不正な入力としてエラーにします。
pub(crate) fn read_csv(bytes: &[u8]) -> Result<Table, SweeperError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(SweeperError::malformed(
            FileFormat::Csv,
            "No columns to parse from file",
        ));
    }
    let width = headers.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(SweeperError::malformed(
                FileFormat::Csv,
                format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                ),
            ));
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| {
                if NA_TOKENS.contains(&field) {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        row.resize(width, None);
        raw_rows.push(row);
    }

    let columns = normalize_headers(headers);
    let rows = infer_column_types(raw_rows, width);
    Ok(Table { columns, rows })
}

/// 数値として解釈できる場合は値を返す
fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// 列ごとに型を推論してセル値に変換する
fn infer_column_types(raw_rows: Vec<Vec<Option<String>>>, width: usize) -> Vec<Vec<CellValue>> {
    let numeric: Vec<bool> = (0..width)
        .map(|col| {
            raw_rows.iter().all(|row| match &row[col] {
                Some(field) => parse_number(field).is_some(),
                None => true,
            })
        })
        .collect();

    raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(col, field)| match field {
                    None => CellValue::Empty,
                    Some(field) if numeric[col] => {
                        parse_number(&field).map_or(CellValue::Empty, CellValue::Number)
                    }
                    Some(field) => CellValue::Text(field),
                })
                .collect()
        })
        .collect()
}

/// ヘッダー名を正規化する
///
/// 空の列名は`Unnamed: {index}`、重複する列名は`name.1`, `name.2`…に置き換え、
/// 列名の一意性を保証します。
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut suffix = counts.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }

        counts.insert(base, suffix);
        used.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}

/// Excelブックの最初のシートを読み込む
///
/// 1行目をヘッダーとして扱います。空のシートは空のテーブルになります。
pub(crate) fn read_xlsx(bytes: &[u8]) -> Result<Table, SweeperError> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = match sheets.worksheet_range_at(0) {
        Some(range) => range?,
        None => {
            return Ok(Table {
                columns: Vec::new(),
                rows: Vec::new(),
            })
        }
    };

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => {
            return Ok(Table {
                columns: Vec::new(),
                rows: Vec::new(),
            })
        }
    };

    let width = header.len();
    let columns = normalize_headers(header.iter().map(|c| cell_value(c).to_string()).collect());

    let rows = rows
        .map(|row| {
            let mut cells: Vec<CellValue> = row.iter().take(width).map(cell_value).collect();
            cells.resize(width, CellValue::Empty);
            cells
        })
        .collect();

    Ok(Table { columns, rows })
}

/// calamineのセルデータをセル値に変換する
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => excel_datetime_text(dt)
            .map_or(CellValue::Number(dt.as_f64()), CellValue::Text),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}

/// 日付・期間セルを文字列に変換する
///
/// 日付は`YYYY-MM-DD`（時刻がある場合は`YYYY-MM-DD HH:MM:SS`）、
/// 期間（`[h]:mm:ss`書式）は`H:MM:SS`になります。エポック（1900年 / 1904年）は
/// ブックの設定に従います。表現できない値の場合は`None`を返します。
fn excel_datetime_text(dt: &ExcelDateTime) -> Option<String> {
    let serial = dt.as_f64();
    if !serial.is_finite() {
        return None;
    }

    if dt.is_duration() {
        if serial.abs() >= MAX_DURATION_DAYS {
            return None;
        }
        return dt.as_duration().map(|d| format_duration(d.num_milliseconds()));
    }

    // Excelで表現できる日付（1900-01-01〜9999-12-31）の範囲外は数値のまま
    if !(0.0..MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let datetime = dt.as_datetime()?.round_subsecs(0);
    if datetime.time().num_seconds_from_midnight() == 0 {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

/// ミリ秒を`H:MM:SS`形式（時間は24を超えて累積）に変換する
fn format_duration(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let total_secs = (millis.unsigned_abs() + 500) / 1000;
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total_secs / 3600,
        total_secs / 60 % 60,
        total_secs % 60
    )
}
