use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Gregorian calendar month. Orders January..December regardless of name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth(u32);

impl CalendarMonth {
    pub fn from_number(month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }

    /// Accepts the full English month name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name.trim()))
            .map(|idx| Self(idx as u32 + 1))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn name(self) -> &'static str {
        MONTH_NAMES[(self.0 - 1) as usize]
    }

    pub fn all() -> impl Iterator<Item = CalendarMonth> {
        (1..=12).map(CalendarMonth)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CalendarMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("not a calendar month name: {s}"))
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CalendarMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// The five energy quantities carried by every reading, all in kWh after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyColumn {
    TotalProduction,
    TotalConsumption,
    OwnConsumption,
    EnergyToGrid,
    EnergyFromGrid,
}

impl EnergyColumn {
    pub const ALL: [EnergyColumn; 5] = [
        EnergyColumn::TotalProduction,
        EnergyColumn::TotalConsumption,
        EnergyColumn::OwnConsumption,
        EnergyColumn::EnergyToGrid,
        EnergyColumn::EnergyFromGrid,
    ];

    /// Column name in the source file after whitespace normalization.
    pub fn header(self) -> &'static str {
        match self {
            EnergyColumn::TotalProduction => "Total_production",
            EnergyColumn::TotalConsumption => "Total_consumption",
            EnergyColumn::OwnConsumption => "Own_consumption",
            EnergyColumn::EnergyToGrid => "Energy_to_grid",
            EnergyColumn::EnergyFromGrid => "Energy_from_grid",
        }
    }
}

impl fmt::Display for EnergyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One timestamped sample, energy values already converted to kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub total_production: f64,
    pub total_consumption: f64,
    pub own_consumption: f64,
    pub energy_to_grid: f64,
    pub energy_from_grid: f64,
    pub year: i32,
    pub month: CalendarMonth,
}

impl Reading {
    /// Builds a reading from kWh values ordered as [`EnergyColumn::ALL`].
    pub fn new(timestamp: NaiveDateTime, kwh: [f64; 5]) -> Self {
        let [total_production, total_consumption, own_consumption, energy_to_grid, energy_from_grid] =
            kwh;
        Self {
            timestamp,
            total_production,
            total_consumption,
            own_consumption,
            energy_to_grid,
            energy_from_grid,
            year: timestamp.year(),
            // NaiveDateTime::month() is always within 1..=12
            month: CalendarMonth(timestamp.month()),
        }
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

    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }
}

/// The loaded reading table. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readings {
    rows: Vec<Reading>,
}

impl Readings {
    pub fn new(rows: Vec<Reading>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, column: EnergyColumn) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |r| r.value(column))
    }

    /// Distinct years in order of first appearance.
    pub fn years_present(&self) -> Vec<i32> {
        let mut years = Vec::new();
        for reading in &self.rows {
            if !years.contains(&reading.year) {
                years.push(reading.year);
            }
        }
        years
    }

    /// Distinct months in order of first appearance.
    pub fn months_present(&self) -> Vec<CalendarMonth> {
        let mut months = Vec::new();
        for reading in &self.rows {
            if !months.contains(&reading.month) {
                months.push(reading.month);
            }
        }
        months
    }
}

impl<'a> IntoIterator for &'a Readings {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_month_names_round_trip_through_numbers() {
        for (idx, name) in MONTH_NAMES.iter().enumerate() {
            let month = CalendarMonth::from_name(name).unwrap();
            assert_eq!(month.number(), idx as u32 + 1);
            assert_eq!(month.name(), *name);
        }
        assert_eq!(CalendarMonth::from_name("march"), CalendarMonth::from_number(3));
        assert!(CalendarMonth::from_name("Smarch").is_none());
        assert!(CalendarMonth::from_number(13).is_none());
    }

    #[test]
    fn test_months_sort_in_calendar_order() {
        let mut months: Vec<CalendarMonth> = ["October", "April", "August", "February"]
            .iter()
            .map(|n| n.parse().unwrap())
            .collect();
        months.sort();
        let names: Vec<_> = months.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["February", "April", "August", "October"]);
    }

    #[test]
    fn test_reading_derives_calendar_fields() {
        let reading = Reading::new(at(2022, 7, 14), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(reading.year, 2022);
        assert_eq!(reading.month_name(), "July");
        assert_eq!(reading.value(EnergyColumn::EnergyToGrid), 4.0);
    }

    #[test]
    fn test_domains_follow_first_appearance() {
        let readings = Readings::new(vec![
            Reading::new(at(2023, 3, 1), [0.0; 5]),
            Reading::new(at(2022, 12, 1), [0.0; 5]),
            Reading::new(at(2023, 1, 1), [0.0; 5]),
            Reading::new(at(2023, 3, 2), [0.0; 5]),
        ]);
        assert_eq!(readings.years_present(), vec![2023, 2022]);
        let months: Vec<_> = readings.months_present().iter().map(|m| m.name()).collect();
        assert_eq!(months, vec!["March", "December", "January"]);
    }

    #[test]
    fn test_month_serializes_as_name() {
        let json = serde_json::to_string(&CalendarMonth::from_number(5).unwrap()).unwrap();
        assert_eq!(json, "\"May\"");
        let back: CalendarMonth = serde_json::from_str("\"September\"").unwrap();
        assert_eq!(back.number(), 9);
    }
}
