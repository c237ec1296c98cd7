use crate::aggregator::{group_by, Reducer};
use crate::models::{CalendarMonth, EnergyColumn, Readings};
use serde::{Serialize, Serializer};
use std::fmt;

pub const ESTIMATE_LABEL: &str = "Estimate";

/// Expected monthly production of a 10 kWp installation, January..December.
pub const ESTIMATED_MONTHLY_KWH: [i64; 12] = [
    1711, 1471, 1285, 1021, 756, 632, 719, 971, 1248, 1484, 1637, 1756,
];

/// Which line a production point belongs to: a real year or the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Estimate,
    Year(i32),
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Estimate => f.pad(ESTIMATE_LABEL),
            SeriesKey::Year(year) => f.pad(&year.to_string()),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductionPoint {
    pub month: CalendarMonth,
    pub series: SeriesKey,
    pub total_production: i64,
}

/// The fixed reference table, one row per calendar month.
pub fn estimate_rows() -> Vec<ProductionPoint> {
    CalendarMonth::all()
        .zip(ESTIMATED_MONTHLY_KWH)
        .map(|(month, kwh)| ProductionPoint {
            month,
            series: SeriesKey::Estimate,
            total_production: kwh,
        })
        .collect()
}

/// Actual production per (year, month), in order of first appearance.
///
/// Sums are rounded to two decimals and then truncated to whole kWh.
pub fn actual_rows(readings: &Readings) -> Vec<ProductionPoint> {
    group_by(
        readings,
        |r| (r.year, r.month),
        EnergyColumn::TotalProduction,
        Reducer::Sum,
    )
    .into_iter()
    .map(|((year, month), kwh)| ProductionPoint {
        month,
        series: SeriesKey::Year(year),
        total_production: ((kwh * 100.0).round_ties_even() / 100.0).trunc() as i64,
    })
    .collect()
}

/// Estimate rows followed by the actual rows, ready for a line chart keyed by series.
pub fn combined_production(readings: &Readings) -> Vec<ProductionPoint> {
    let mut rows = estimate_rows();
    rows.extend(actual_rows(readings));
    rows
}
