//! Tabular Writers
//!
//! テーブルをCSV・Excel形式で出力する。インデックス列は出力しません。

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};

use crate::error::SweeperError;
use crate::types::{CellValue, Table};

const SHEET_NAME: &str = "Sheet1";

/// テーブルをCSVに変換する
///
/// ヘッダー行に続いて各行を出力します。空セルは空文字列になります。
pub(crate) fn write_csv(table: &Table) -> Result<Vec<u8>, SweeperError> {
    let mut buf = Vec::new();
    if table.columns().is_empty() {
        return Ok(buf);
    }

    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
    }

    Ok(buf)
}

/// テーブルをExcelワークブックに変換する
///
/// シート名は`Sheet1`固定。ヘッダー行は太字、数値は数値セル、
/// 文字列は文字列セルとして書き込み、空セルは書き込みません。
pub(crate) fn write_xlsx(table: &Table) -> Result<Vec<u8>, SweeperError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(col)?, name, &header_format)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let row_num = row_num(r + 1)?;
        for (c, cell) in row.iter().enumerate() {
            let col = col_num(c)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                // Excelは無限大・NaNを数値として保持できない
                CellValue::Number(n) => {
                    worksheet.write_string(row_num, col, n.to_string())?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn col_num(col: usize) -> Result<ColNum, SweeperError> {
    ColNum::try_from(col)
        .map_err(|_| SweeperError::Config(format!("Column index {} exceeds Excel limits", col)))
}

fn row_num(row: usize) -> Result<RowNum, SweeperError> {
    RowNum::try_from(row)
        .map_err(|_| SweeperError::Config(format!("Row index {} exceeds Excel limits", row)))
}
