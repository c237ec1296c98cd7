//! Chart and table specifications handed to whatever renders the dashboard.
//!
//! Everything here is plain data. Binding functions map aggregates onto these
//! values and never draw anything themselves.

use crate::aggregator::{EnergySummary, PivotTable};
use crate::estimate::ProductionPoint;
use crate::filter::MonthTotals;
use crate::models::{EnergyColumn, Readings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed styling choices applied to every chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
    pub bar_template: String,
    /// Radial offset of the first pie slice, as a fraction of the radius.
    pub pie_pull: f64,
    pub pie_hover_template: String,
    pub line_markers: bool,
    pub energy_unit: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            plot_bgcolor: "#363b4f".to_string(),
            paper_bgcolor: "#363b4f".to_string(),
            bar_template: "plotly_white".to_string(),
            pie_pull: 0.12,
            pie_hover_template: "%{label}<br>%{value}kWh</br><extra></extra>".to_string(),
            line_markers: true,
            energy_unit: "kWh".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    pub plot: String,
    pub paper: String,
}

impl From<&Theme> for Background {
    fn from(theme: &Theme) -> Self {
        Self {
            plot: theme.plot_bgcolor.clone(),
            paper: theme.paper_bgcolor.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Line,
    GroupedBar,
    Table,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: i64,
    pub pull: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub slices: Vec<PieSlice>,
    pub hover_template: String,
    pub background: Background,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub series: Vec<LineSeries>,
    pub markers: bool,
    pub background: Background,
}

impl LineChart {
    /// Distinct x categories across all series, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for point in self.series.iter().flat_map(|s| &s.points) {
            if !categories.contains(&point.x.as_str()) {
                categories.push(&point.x);
            }
        }
        categories
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub column: EnergyColumn,
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub template: String,
    pub background: Background,
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableSpec {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieChart),
    Line(LineChart),
    GroupedBar(BarChart),
    Table(TableSpec),
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartSpec::Pie(_) => ChartKind::Pie,
            ChartSpec::Line(_) => ChartKind::Line,
            ChartSpec::GroupedBar(_) => ChartKind::GroupedBar,
            ChartSpec::Table(_) => ChartKind::Table,
        }
    }
}

fn pie(name: &str, title: &str, total: i64, slices: [(&str, i64); 2], theme: &Theme) -> PieChart {
    PieChart {
        name: name.to_string(),
        title: title.to_string(),
        subtitle: format!("{total}{}", theme.energy_unit),
        slices: slices
            .iter()
            .enumerate()
            .map(|(idx, (label, value))| PieSlice {
                label: label.to_string(),
                value: *value,
                pull: if idx == 0 { theme.pie_pull } else { 0.0 },
            })
            .collect(),
        hover_template: theme.pie_hover_template.clone(),
        background: theme.into(),
    }
}

/// Where produced energy went: used on site or exported.
pub fn bind_production_pie(totals: &EnergySummary, theme: &Theme) -> PieChart {
    pie(
        "Total_Production",
        "Total Production",
        totals.total_production,
        [
            ("Total solar consumption", totals.own_consumption),
            ("Total energy to the grid", totals.energy_to_grid),
        ],
        theme,
    )
}

/// Where consumed energy came from: own production or imported.
pub fn bind_consumption_pie(totals: &EnergySummary, theme: &Theme) -> PieChart {
    pie(
        "Total_Consumption",
        "Total Consumption",
        totals.total_consumption,
        [
            ("Total solar consumption", totals.own_consumption),
            ("Total energy from the grid", totals.energy_from_grid),
        ],
        theme,
    )
}

pub fn bind_pivot_table(pivot: &PivotTable) -> TableSpec {
    let mut columns = vec!["Year".to_string()];
    columns.extend(pivot.months.iter().map(|m| m.name().to_string()));

    let rows = pivot
        .years
        .iter()
        .zip(pivot.rounded())
        .map(|(&year, cells)| {
            let mut row = vec![Cell::Int(year as i64)];
            row.extend(cells.into_iter().map(Cell::Int));
            row
        })
        .collect();

    TableSpec { columns, rows }
}

/// One line per series key (estimate first), months on the x axis.
pub fn bind_production_line(points: &[ProductionPoint], theme: &Theme) -> LineChart {
    let mut series: Vec<LineSeries> = Vec::new();
    for point in points {
        let name = point.series.to_string();
        let line_point = LinePoint {
            x: point.month.name().to_string(),
            y: point.total_production as f64,
        };
        match series.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.points.push(line_point),
            None => series.push(LineSeries {
                name,
                points: vec![line_point],
            }),
        }
    }

    LineChart {
        x_label: "Month".to_string(),
        y_label: format!("Total Production ({})", theme.energy_unit),
        legend_title: "Year".to_string(),
        series,
        markers: theme.line_markers,
        background: theme.into(),
    }
}

fn grouped_bar(
    title: &str,
    groups: &[MonthTotals],
    columns: [(EnergyColumn, &str); 3],
    theme: &Theme,
) -> BarChart {
    BarChart {
        title: title.to_string(),
        categories: groups.iter().map(|g| g.month.name().to_string()).collect(),
        series: columns
            .iter()
            .map(|&(column, name)| BarSeries {
                column,
                name: name.to_string(),
                values: groups.iter().map(|g| g.value(column)).collect(),
            })
            .collect(),
        x_label: "Month".to_string(),
        y_label: theme.energy_unit.clone(),
        legend_title: "Energy usage".to_string(),
        template: theme.bar_template.clone(),
        background: theme.into(),
    }
}

pub fn bind_filtered_production(groups: &[MonthTotals], theme: &Theme) -> BarChart {
    grouped_bar(
        "Production",
        groups,
        [
            (EnergyColumn::TotalProduction, "Total_production"),
            (EnergyColumn::OwnConsumption, "Solar"),
            (EnergyColumn::EnergyToGrid, "Energy_to_grid"),
        ],
        theme,
    )
}

pub fn bind_filtered_consumption(groups: &[MonthTotals], theme: &Theme) -> BarChart {
    grouped_bar(
        "Consumption",
        groups,
        [
            (EnergyColumn::TotalConsumption, "Total_consumption"),
            (EnergyColumn::OwnConsumption, "Own_consumption"),
            (EnergyColumn::EnergyFromGrid, "Energy_from_grid"),
        ],
        theme,
    )
}

pub fn bind_grouped_table(groups: &[MonthTotals]) -> TableSpec {
    let mut columns = vec!["Month".to_string()];
    columns.extend(EnergyColumn::ALL.iter().map(|c| c.header().to_string()));
    columns.push("Readings".to_string());

    let rows = groups
        .iter()
        .map(|g| {
            let mut row = vec![Cell::Text(g.month.name().to_string())];
            row.extend(EnergyColumn::ALL.iter().map(|&c| Cell::Float(g.value(c))));
            row.push(Cell::Int(g.readings as i64));
            row
        })
        .collect();

    TableSpec { columns, rows }
}

pub fn bind_raw_table(readings: &Readings) -> TableSpec {
    let mut columns = vec!["Date_and_time".to_string()];
    columns.extend(EnergyColumn::ALL.iter().map(|c| c.header().to_string()));
    columns.push("Year".to_string());
    columns.push("Month".to_string());

    let rows = readings
        .iter()
        .map(|r| {
            let mut row = vec![Cell::Text(r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())];
            row.extend(EnergyColumn::ALL.iter().map(|&c| Cell::Float(r.value(c))));
            row.push(Cell::Int(r.year as i64));
            row.push(Cell::Text(r.month_name().to_string()));
            row
        })
        .collect();

    TableSpec { columns, rows }
}
