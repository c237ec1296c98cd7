use crate::error::SelectionError;
use crate::models::{CalendarMonth, EnergyColumn, Reading, Readings};
use serde::Serialize;

/// Values a user may pick from, derived from the loaded readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorDomain {
    /// Years in reverse order of first appearance; the first entry is the default.
    pub years: Vec<i32>,
    /// Months in order of first appearance; all of them are selected by default.
    pub months: Vec<CalendarMonth>,
}

/// A validated year + month choice. Only obtainable through a [`SelectorDomain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    year: i32,
    months: Vec<CalendarMonth>,
}

impl Selection {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn months(&self) -> &[CalendarMonth] {
        &self.months
    }

    fn matches(&self, reading: &Reading) -> bool {
        reading.year == self.year && self.months.contains(&reading.month)
    }
}

impl SelectorDomain {
    pub fn from_readings(readings: &Readings) -> Self {
        let mut years = readings.years_present();
        years.reverse();
        Self {
            years,
            months: readings.months_present(),
        }
    }

    /// Default selection, `None` when nothing was loaded.
    pub fn default_selection(&self) -> Option<Selection> {
        self.years.first().map(|&year| Selection {
            year,
            months: self.months.clone(),
        })
    }

    pub fn select<I>(&self, year: i32, months: I) -> Result<Selection, SelectionError>
    where
        I: IntoIterator<Item = CalendarMonth>,
    {
        if !self.years.contains(&year) {
            return Err(SelectionError::UnknownYear(year));
        }

        let mut chosen = Vec::new();
        for month in months {
            if !self.months.contains(&month) {
                return Err(SelectionError::UnknownMonth(month.name().to_string()));
            }
            if !chosen.contains(&month) {
                chosen.push(month);
            }
        }

        Ok(Selection {
            year,
            months: chosen,
        })
    }

    /// Like [`select`](Self::select) but takes month names as typed by a user.
    pub fn select_by_name<S: AsRef<str>>(
        &self,
        year: i32,
        names: &[S],
    ) -> Result<Selection, SelectionError> {
        let months = names
            .iter()
            .map(|name| {
                CalendarMonth::from_name(name.as_ref())
                    .ok_or_else(|| SelectionError::UnknownMonth(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.select(year, months)
    }
}

/// Per-month sums of every energy column within a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub month: CalendarMonth,
    pub total_production: f64,
    pub total_consumption: f64,
    pub own_consumption: f64,
    pub energy_to_grid: f64,
    pub energy_from_grid: f64,
    pub readings: usize,
}

impl MonthTotals {
    fn empty(month: CalendarMonth) -> Self {
        Self {
            month,
            total_production: 0.0,
            total_consumption: 0.0,
            own_consumption: 0.0,
            energy_to_grid: 0.0,
            energy_from_grid: 0.0,
            readings: 0,
        }
    }

    fn add(&mut self, reading: &Reading) {
        self.total_production += reading.total_production;
        self.total_consumption += reading.total_consumption;
        self.own_consumption += reading.own_consumption;
        self.energy_to_grid += reading.energy_to_grid;
        self.energy_from_grid += reading.energy_from_grid;
        self.readings += 1;
    }

    pub fn value(&self, column: EnergyColumn) -> f64 {
        match column {
            EnergyColumn::TotalProduction => self.total_production,
            EnergyColumn::TotalConsumption => self.total_consumption,
            EnergyColumn::OwnConsumption => self.own_consumption,
            EnergyColumn::EnergyToGrid => self.energy_to_grid,
            EnergyColumn::EnergyFromGrid => self.energy_from_grid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    pub selection: Selection,
    pub rows: Vec<Reading>,
    /// Month groups in order of first appearance among `rows`.
    pub grouped: Vec<MonthTotals>,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keep the readings of the selected year and months, then sum them per month.
pub fn apply(readings: &Readings, selection: &Selection) -> FilteredView {
    let rows: Vec<Reading> = readings
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    let mut grouped: Vec<MonthTotals> = Vec::new();
    for reading in &rows {
        match grouped.iter_mut().find(|g| g.month == reading.month) {
            Some(group) => group.add(reading),
            None => {
                let mut group = MonthTotals::empty(reading.month);
                group.add(reading);
                grouped.push(group);
            }
        }
    }

    log::debug!(
        "Selection {} / {} months matched {} readings in {} groups",
        selection.year,
        selection.months.len(),
        rows.len(),
        grouped.len()
    );

    FilteredView {
        selection: selection.clone(),
        rows,
        grouped,
    }
}
