use crate::models::{CalendarMonth, EnergyColumn, Reading, Readings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Max,
    Mean,
}

impl Reducer {
    /// Reduce a group of values. An empty group reduces to 0.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Reducer::Sum => values.iter().sum(),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

/// Mean of a column, truncated toward zero to whole kWh. 0 for an empty table.
pub fn mean_kwh(readings: &Readings, column: EnergyColumn) -> i64 {
    let values: Vec<f64> = readings.column(column).collect();
    Reducer::Mean.apply(&values).trunc() as i64
}

/// Sum of a column, truncated toward zero to whole kWh.
pub fn sum_kwh(readings: &Readings, column: EnergyColumn) -> i64 {
    readings.column(column).sum::<f64>().trunc() as i64
}

/// Group rows by an arbitrary key and reduce one column per group.
///
/// Groups come back in order of first appearance, the same way an unsorted
/// group-by keeps them.
pub fn group_by<K, F>(
    readings: &Readings,
    key: F,
    column: EnergyColumn,
    reducer: Reducer,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Reading) -> K,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, Vec<f64>> = HashMap::new();

    for reading in readings {
        let k = key(reading);
        groups
            .entry(k.clone())
            .or_insert_with(|| {
                order.push(k);
                Vec::new()
            })
            .push(reading.value(column));
    }

    order
        .into_iter()
        .map(|k| {
            let value = groups.get(&k).map(|v| reducer.apply(v)).unwrap_or(0.0);
            (k, value)
        })
        .collect()
}

/// Year x month grid of one reduced column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub value_column: EnergyColumn,
    pub reducer: Reducer,
    /// Row index, ascending.
    pub years: Vec<i32>,
    /// Column index: months present anywhere in the data, in calendar order.
    pub months: Vec<CalendarMonth>,
    /// `cells[row][col]`; 0 where a (year, month) has no readings.
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    pub fn cell(&self, year: i32, month: CalendarMonth) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.months.iter().position(|&m| m == month)?;
        Some(self.cells[row][col])
    }

    /// Cells rounded half-to-even to whole kWh for display.
    pub fn rounded(&self) -> Vec<Vec<i64>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|v| v.round_ties_even() as i64).collect())
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }
}

/// Pivot a column into a year x month grid using the given reducer.
pub fn pivot(readings: &Readings, column: EnergyColumn, reducer: Reducer) -> PivotTable {
    let groups = group_by(readings, |r| (r.year, r.month), column, reducer);

    let mut years = readings.years_present();
    years.sort_unstable();
    let mut months = readings.months_present();
    months.sort_unstable();

    let lookup: HashMap<(i32, CalendarMonth), f64> = groups.into_iter().collect();
    let cells = years
        .iter()
        .map(|&year| {
            months
                .iter()
                .map(|&month| lookup.get(&(year, month)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    PivotTable {
        value_column: column,
        reducer,
        years,
        months,
        cells,
    }
}

/// One integer kWh figure per energy column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnergySummary {
    pub total_production: i64,
    pub total_consumption: i64,
    pub own_consumption: i64,
    pub energy_to_grid: i64,
    pub energy_from_grid: i64,
}

impl EnergySummary {
    fn collect(f: impl Fn(EnergyColumn) -> i64) -> Self {
        Self {
            total_production: f(EnergyColumn::TotalProduction),
            total_consumption: f(EnergyColumn::TotalConsumption),
            own_consumption: f(EnergyColumn::OwnConsumption),
            energy_to_grid: f(EnergyColumn::EnergyToGrid),
            energy_from_grid: f(EnergyColumn::EnergyFromGrid),
        }
    }

    pub fn get(&self, column: EnergyColumn) -> i64 {
        match column {
            EnergyColumn::TotalProduction => self.total_production,
            EnergyColumn::TotalConsumption => self.total_consumption,
            EnergyColumn::OwnConsumption => self.own_consumption,
            EnergyColumn::EnergyToGrid => self.energy_to_grid,
            EnergyColumn::EnergyFromGrid => self.energy_from_grid,
        }
    }
}

pub fn averages(readings: &Readings) -> EnergySummary {
    EnergySummary::collect(|column| mean_kwh(readings, column))
}

pub fn totals(readings: &Readings) -> EnergySummary {
    EnergySummary::collect(|column| sum_kwh(readings, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(y: i32, m: u32, d: u32, production_kwh: f64) -> Reading {
        let ts = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Reading::new(ts, [production_kwh, 1.0, 0.5, 0.5, 0.5])
    }

    #[test]
    fn test_reducers() {
        let values = [5.0, 7.0, 3.0];
        assert_eq!(Reducer::Sum.apply(&values), 15.0);
        assert_eq!(Reducer::Max.apply(&values), 7.0);
        assert_eq!(Reducer::Mean.apply(&values), 5.0);
        assert_eq!(Reducer::Max.apply(&[]), 0.0);
        assert_eq!(Reducer::Mean.apply(&[]), 0.0);
    }

    #[test]
    fn test_mean_and_sum_truncate() {
        let readings = Readings::new(vec![
            reading(2023, 1, 1, 5.9),
            reading(2023, 1, 2, 6.9),
        ]);
        // mean 6.4, sum 12.8
        assert_eq!(mean_kwh(&readings, EnergyColumn::TotalProduction), 6);
        assert_eq!(sum_kwh(&readings, EnergyColumn::TotalProduction), 12);
        assert_eq!(mean_kwh(&Readings::default(), EnergyColumn::TotalProduction), 0);
    }

    #[test]
    fn test_truncation_is_toward_zero_for_negative_values() {
        let readings = Readings::new(vec![reading(2023, 1, 1, -2.7)]);
        assert_eq!(sum_kwh(&readings, EnergyColumn::TotalProduction), -2);
    }

    #[test]
    fn test_group_by_keeps_first_appearance_order() {
        let readings = Readings::new(vec![
            reading(2023, 5, 1, 1.0),
            reading(2023, 2, 1, 2.0),
            reading(2023, 5, 2, 3.0),
        ]);
        let groups = group_by(&readings, |r| r.month, EnergyColumn::TotalProduction, Reducer::Sum);
        let names: Vec<_> = groups.iter().map(|(m, v)| (m.name(), *v)).collect();
        assert_eq!(names, vec![("May", 4.0), ("February", 2.0)]);
    }

    #[test]
    fn test_pivot_orders_months_by_calendar_and_fills_zero() {
        let readings = Readings::new(vec![
            reading(2023, 11, 1, 4.0),
            reading(2022, 3, 1, 2.0),
            reading(2023, 3, 5, 6.0),
            reading(2022, 8, 1, 9.0),
        ]);
        let table = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Sum);
        assert_eq!(table.years, vec![2022, 2023]);
        let months: Vec<_> = table.months.iter().map(|m| m.name()).collect();
        assert_eq!(months, vec!["March", "August", "November"]);
        assert_eq!(table.cells, vec![vec![2.0, 9.0, 0.0], vec![6.0, 0.0, 4.0]]);
        assert_eq!(table.cell(2023, CalendarMonth::from_number(8).unwrap()), Some(0.0));
        assert_eq!(table.cell(2021, CalendarMonth::from_number(8).unwrap()), None);
    }

    #[test]
    fn test_pivot_rounding_is_half_to_even() {
        let readings = Readings::new(vec![
            reading(2023, 1, 1, 2.5),
            reading(2023, 2, 1, 3.5),
            reading(2023, 3, 1, 3.49),
        ]);
        let table = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Max);
        assert_eq!(table.rounded(), vec![vec![2, 4, 3]]);
    }

    #[test]
    fn test_summaries_cover_every_column() {
        let readings = Readings::new(vec![reading(2023, 1, 1, 3.0), reading(2023, 1, 2, 5.0)]);
        let avg = averages(&readings);
        let sum = totals(&readings);
        assert_eq!(avg.total_production, 4);
        assert_eq!(sum.total_production, 8);
        assert_eq!(sum.total_consumption, 2);
        assert_eq!(sum.get(EnergyColumn::OwnConsumption), 1);
        assert_eq!(avg.get(EnergyColumn::EnergyFromGrid), 0);
    }
}
