use crate::aggregator::{averages, pivot, totals, EnergySummary, Reducer};
use crate::estimate::combined_production;
use crate::filter::{apply, Selection, SelectorDomain};
use crate::models::{EnergyColumn, Readings};
use crate::presentation::{
    bind_consumption_pie, bind_filtered_consumption, bind_filtered_production,
    bind_grouped_table, bind_pivot_table, bind_production_line, bind_production_pie,
    bind_raw_table, BarChart, ChartSpec, LineChart, PieChart, TableSpec, Theme,
};
use serde::Serialize;

pub const PAGE_TITLE: &str = "PV Production";
pub const OVERVIEW_COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetric {
    pub label: String,
    pub value_kwh: i64,
    /// Zero-based layout column.
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOverview {
    pub title: String,
    pub columns: usize,
    pub metrics: Vec<OverviewMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalEnergy {
    pub title: String,
    pub production: PieChart,
    pub consumption: PieChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionedTable {
    pub heading: String,
    pub caption: Option<String>,
    pub table: TableSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvProduction {
    pub title: String,
    pub total: CaptionedTable,
    pub comparison: LineChart,
    pub highest: CaptionedTable,
    pub average: CaptionedTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSection {
    pub heading: String,
    pub domain: SelectorDomain,
    pub selection: Selection,
    pub production: BarChart,
    pub consumption: BarChart,
    pub table: TableSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSection {
    pub title: String,
    pub table: TableSpec,
}

/// Every section of the page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub page_title: String,
    pub theme: Theme,
    pub overview: DailyOverview,
    pub total_energy: TotalEnergy,
    pub production: PvProduction,
    /// Absent only when no readings were loaded.
    pub filter: Option<FilterSection>,
    pub raw: RawSection,
}

pub fn bind_overview(avg: &EnergySummary) -> DailyOverview {
    let metric = |label: &str, column: EnergyColumn, layout_column: usize| OverviewMetric {
        label: label.to_string(),
        value_kwh: avg.get(column),
        column: layout_column,
    };

    DailyOverview {
        title: "Daily Overview".to_string(),
        columns: OVERVIEW_COLUMNS,
        metrics: vec![
            metric("Average solar production", EnergyColumn::TotalProduction, 0),
            metric("Average solar consumption", EnergyColumn::OwnConsumption, 1),
            metric("Average energy from the grid", EnergyColumn::EnergyFromGrid, 1),
            metric("Average total consumption", EnergyColumn::TotalConsumption, 1),
            metric("Average energy to the grid", EnergyColumn::EnergyToGrid, 2),
        ],
    }
}

fn production_table(
    readings: &Readings,
    reducer: Reducer,
    heading: &str,
    caption: Option<&str>,
) -> CaptionedTable {
    CaptionedTable {
        heading: heading.to_string(),
        caption: caption.map(str::to_string),
        table: bind_pivot_table(&pivot(readings, EnergyColumn::TotalProduction, reducer)),
    }
}

pub fn bind_pv_production(readings: &Readings, theme: &Theme) -> PvProduction {
    PvProduction {
        title: "PV Production".to_string(),
        total: production_table(readings, Reducer::Sum, "Total Solar Production (kWh)", None),
        comparison: bind_production_line(&combined_production(readings), theme),
        highest: production_table(
            readings,
            Reducer::Max,
            "Highest Solar Production (kWh)",
            Some("Highest recorded solar production in one day"),
        ),
        average: production_table(
            readings,
            Reducer::Mean,
            "Average Solar Production (kWh)",
            Some("Daily average solar produced"),
        ),
    }
}

/// Re-run on every selection change against the already loaded readings.
pub fn bind_filter_section(
    readings: &Readings,
    domain: &SelectorDomain,
    selection: &Selection,
    theme: &Theme,
) -> FilterSection {
    let view = apply(readings, selection);
    FilterSection {
        heading: "Select Filter:".to_string(),
        domain: domain.clone(),
        selection: selection.clone(),
        production: bind_filtered_production(&view.grouped, theme),
        consumption: bind_filtered_consumption(&view.grouped, theme),
        table: bind_grouped_table(&view.grouped),
    }
}

impl Dashboard {
    /// Build the whole page. Without an explicit selection the domain default is used.
    pub fn build(
        readings: &Readings,
        domain: &SelectorDomain,
        selection: Option<Selection>,
        theme: &Theme,
    ) -> Self {
        let sums = totals(readings);
        let selection = selection.or_else(|| domain.default_selection());

        let dashboard = Self {
            page_title: PAGE_TITLE.to_string(),
            theme: theme.clone(),
            overview: bind_overview(&averages(readings)),
            total_energy: TotalEnergy {
                title: "Total Energy".to_string(),
                production: bind_production_pie(&sums, theme),
                consumption: bind_consumption_pie(&sums, theme),
            },
            production: bind_pv_production(readings, theme),
            filter: selection
                .as_ref()
                .map(|s| bind_filter_section(readings, domain, s, theme)),
            raw: RawSection {
                title: "RAW".to_string(),
                table: bind_raw_table(readings),
            },
        };

        log::info!(
            "Dashboard built from {} readings ({} years)",
            readings.len(),
            domain.years.len()
        );
        dashboard
    }

    /// Every chart and table as (file-friendly name, spec) pairs, page order.
    pub fn charts(&self) -> Vec<(String, ChartSpec)> {
        let mut charts = vec![
            (
                "total_production".to_string(),
                ChartSpec::Pie(self.total_energy.production.clone()),
            ),
            (
                "total_consumption".to_string(),
                ChartSpec::Pie(self.total_energy.consumption.clone()),
            ),
            (
                "production_sum".to_string(),
                ChartSpec::Table(self.production.total.table.clone()),
            ),
            (
                "production_vs_estimate".to_string(),
                ChartSpec::Line(self.production.comparison.clone()),
            ),
            (
                "production_max".to_string(),
                ChartSpec::Table(self.production.highest.table.clone()),
            ),
            (
                "production_mean".to_string(),
                ChartSpec::Table(self.production.average.table.clone()),
            ),
        ];

        if let Some(filter) = &self.filter {
            charts.push((
                "filtered_production".to_string(),
                ChartSpec::GroupedBar(filter.production.clone()),
            ));
            charts.push((
                "filtered_consumption".to_string(),
                ChartSpec::GroupedBar(filter.consumption.clone()),
            ));
            charts.push((
                "filtered_by_month".to_string(),
                ChartSpec::Table(filter.table.clone()),
            ));
        }

        charts.push(("raw".to_string(), ChartSpec::Table(self.raw.table.clone())));
        charts
    }
}
