//! Chart Module
//!
//! テーブルの数値列からグラフ描画用のデータを組み立てるモジュール。
//! 描画そのものは行わず、フロントエンドがJSONとして受け取れる形に整えます。

use serde::Serialize;

use crate::api::ChartKind;
use crate::error::SweeperError;
use crate::types::{CellValue, Table};

/// ヒストグラムのビン数
pub const HISTOGRAM_BINS: usize = 10;

/// グラフ描画用データ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// 棒グラフ（数値列ごとの系列）
    Bar { series: Vec<Series> },
    /// 折れ線グラフ（数値列ごとの系列）
    Line { series: Vec<Series> },
    /// ヒストグラム（数値列ごとの度数分布）
    Histogram { histograms: Vec<Histogram> },
}

/// 1列分の系列
///
/// `points[i]`は`i`行目の値（空セルは`None`）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Option<f64>>,
}

/// 1列分の度数分布
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<Bin>,
}

/// 度数分布のビン（`[start, end)`、最後のビンのみ`[start, end]`）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl ChartData {
    /// グラフの種類
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Bar { .. } => ChartKind::Bar,
            ChartData::Line { .. } => ChartKind::Line,
            ChartData::Histogram { .. } => ChartKind::Histogram,
        }
    }

    /// JSON文字列に変換する
    pub fn to_json(&self) -> Result<String, SweeperError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// グラフ描画用データを組み立てる
///
/// # 引数
///
/// * `table` - 対象のテーブル
/// * `kind` - グラフの種類
///
/// # 戻り値
///
/// * `Ok(ChartData)` - 数値列が2つ以上ある場合
/// * `Err(SweeperError::NotEnoughNumericColumns)` - 数値列が2つ未満の場合
///
/// # 使用例
///
/// ```rust
/// use datasweeper::{chart, extract, ChartKind, FileFormat, Record};
///
/// # fn main() -> Result<(), datasweeper::SweeperError> {
/// let record = extract(b"x,y\n1,2\n3,4\n", FileFormat::Csv)?;
/// if let Record::Table(table) = record {
///     let data = chart::prepare(&table, ChartKind::Line)?;
///     assert_eq!(data.kind(), ChartKind::Line);
/// }
/// # Ok(())
/// # }
/// ```
pub fn prepare(table: &Table, kind: ChartKind) -> Result<ChartData, SweeperError> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return Err(SweeperError::NotEnoughNumericColumns {
            found: numeric.len(),
        });
    }

    let columns: Vec<(String, Vec<Option<f64>>)> = numeric
        .iter()
        .filter_map(|name| {
            let values = table.column_values(name)?;
            Some((
                name.to_string(),
                values.into_iter().map(CellValue::as_number).collect(),
            ))
        })
        .collect();

    Ok(match kind {
        ChartKind::Bar => ChartData::Bar {
            series: to_series(columns),
        },
        ChartKind::Line => ChartData::Line {
            series: to_series(columns),
        },
        ChartKind::Histogram => ChartData::Histogram {
            histograms: columns
                .into_iter()
                .map(|(column, points)| Histogram {
                    bins: histogram_bins(points.into_iter().flatten()),
                    column,
                })
                .collect(),
        },
    })
}

fn to_series(columns: Vec<(String, Vec<Option<f64>>)>) -> Vec<Series> {
    columns
        .into_iter()
        .map(|(name, points)| Series { name, points })
        .collect()
}

/// 値を等幅の`HISTOGRAM_BINS`個のビンに振り分ける
///
/// 範囲は値の最小値〜最大値。すべて同じ値の場合は`[v - 0.5, v + 0.5]`。
/// 値がない場合はビンを作りません。
fn histogram_bins(values: impl Iterator<Item = f64>) -> Vec<Bin> {
    let values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / HISTOGRAM_BINS as f64;

    let mut bins: Vec<Bin> = (0..HISTOGRAM_BINS)
        .map(|i| Bin {
            start: lo + i as f64 * width,
            end: if i + 1 == HISTOGRAM_BINS {
                hi
            } else {
                lo + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(HISTOGRAM_BINS - 1);
        bins[idx].count += 1;
    }

    bins
}
