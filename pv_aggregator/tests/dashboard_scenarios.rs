use pv_aggregator::aggregator::{averages, totals};
use pv_aggregator::filter::apply;
use pv_aggregator::presentation::{bind_filtered_consumption, bind_filtered_production};
use pv_aggregator::{
    mean_kwh, pivot, sum_kwh, CalendarMonth, Dashboard, DataLoadError, DataLoader, EnergyColumn,
    Reducer, SelectorDomain, Theme,
};
use std::io::Write;

const HEADER: &str =
    "Date and time,Total production,Total consumption,Own consumption,Energy to grid,Energy from grid\n";

const TWO_DAYS: &str = "2023-01-01T00:00:00,5000,3000,2000,3000,1000\n\
                        2023-01-02T00:00:00,7000,4000,3000,4000,1000\n";

fn load(body: &str) -> pv_aggregator::Readings {
    DataLoader::new()
        .load_from_reader(format!("{HEADER}{body}").as_bytes())
        .expect("valid csv")
}

/// Several years, months out of order, one month missing in one year.
fn multi_year() -> pv_aggregator::Readings {
    load(
        "2022-11-03T00:00:00,1200,9000,1000,200,8000\n\
         2022-03-01T00:00:00,4300,7000,3000,1300,4000\n\
         2023-03-01T00:00:00,5100,6000,3100,2000,2900\n\
         2023-07-04T00:00:00,20950,5000,4000,16950,1000\n\
         2022-07-09T00:00:00,19400,6000,4500,14900,1500\n\
         2023-07-05T00:00:00,18125,4000,3500,14625,500\n\
         2022-03-02T00:00:00,3999,7000,2999,1000,4001\n",
    )
}

#[test]
fn test_concrete_two_day_scenario() {
    let readings = load(TWO_DAYS);
    assert_eq!(readings.len(), 2);
    assert_eq!(readings.rows()[0].total_production, 5.0);
    assert_eq!(readings.rows()[1].total_production, 7.0);

    assert_eq!(mean_kwh(&readings, EnergyColumn::TotalProduction), 6);
    assert_eq!(sum_kwh(&readings, EnergyColumn::TotalProduction), 12);

    let january = CalendarMonth::from_name("January").unwrap();
    let sum = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Sum);
    let max = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Max);
    let mean = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Mean);
    assert_eq!(sum.cell(2023, january), Some(12.0));
    assert_eq!(max.cell(2023, january), Some(7.0));
    assert_eq!(mean.cell(2023, january), Some(6.0));
}

#[test]
fn test_empty_month_selection_gives_empty_charts() {
    let readings = load(TWO_DAYS);
    let domain = SelectorDomain::from_readings(&readings);
    let selection = domain.select(2023, Vec::new()).unwrap();
    let view = apply(&readings, &selection);
    assert!(view.grouped.is_empty());

    let theme = Theme::default();
    let production = bind_filtered_production(&view.grouped, &theme);
    let consumption = bind_filtered_consumption(&view.grouped, &theme);
    for chart in [production, consumption] {
        assert!(chart.categories.is_empty());
        assert!(chart.series.iter().all(|s| s.values.is_empty()));
    }
}

#[test]
fn test_sum_matches_raw_watt_hours() {
    let readings = multi_year();
    let raw_wh = [1200.0, 4300.0, 5100.0, 20950.0, 19400.0, 18125.0, 3999.0];
    let expected = (raw_wh.iter().sum::<f64>() / 1000.0).trunc() as i64;
    assert_eq!(sum_kwh(&readings, EnergyColumn::TotalProduction), expected);
}

#[test]
fn test_pivot_sum_conserves_total() {
    let readings = multi_year();
    for column in EnergyColumn::ALL {
        let table = pivot(&readings, column, Reducer::Sum);
        assert_eq!(table.total().trunc() as i64, sum_kwh(&readings, column));
    }
}

#[test]
fn test_pivot_months_are_calendar_ordered_and_missing_cells_are_zero() {
    let readings = multi_year();
    for reducer in [Reducer::Sum, Reducer::Max, Reducer::Mean] {
        let table = pivot(&readings, EnergyColumn::TotalProduction, reducer);
        let names: Vec<_> = table.months.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["March", "July", "November"]);
        assert_eq!(table.years, vec![2022, 2023]);

        let november = CalendarMonth::from_name("November").unwrap();
        assert_eq!(table.cell(2023, november), Some(0.0));
        assert!(table.cells.iter().all(|row| row.len() == 3));
    }
}

#[test]
fn test_full_month_selection_keeps_every_row_of_the_year() {
    let readings = multi_year();
    let domain = SelectorDomain::from_readings(&readings);
    for &year in &domain.years {
        let months: Vec<CalendarMonth> = readings
            .iter()
            .filter(|r| r.year == year)
            .map(|r| r.month)
            .collect();
        let selection = domain.select(year, months).unwrap();
        let view = apply(&readings, &selection);

        let expected: Vec<_> = readings.iter().filter(|r| r.year == year).cloned().collect();
        assert_eq!(view.rows, expected);
    }
}

#[test]
fn test_default_selection_is_most_recent_year() {
    let readings = multi_year();
    let domain = SelectorDomain::from_readings(&readings);
    let selection = domain.default_selection().unwrap();
    assert_eq!(selection.year(), 2023);
    assert_eq!(selection.months().len(), 3);
}

#[test]
fn test_overview_and_totals() {
    let readings = load(TWO_DAYS);
    let avg = averages(&readings);
    let sum = totals(&readings);
    assert_eq!(avg.total_production, 6);
    assert_eq!(avg.energy_from_grid, 1);
    assert_eq!(sum.own_consumption, 5);
    assert_eq!(sum.energy_to_grid, 7);
    assert_eq!(sum.total_consumption, 7);
}

#[test]
fn test_dashboard_from_file_serializes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{HEADER}{TWO_DAYS}").unwrap();

    let readings = DataLoader::new().load(file.path()).unwrap();
    let domain = SelectorDomain::from_readings(&readings);
    let dashboard = Dashboard::build(&readings, &domain, None, &Theme::default());

    let json = serde_json::to_value(&dashboard).unwrap();
    assert_eq!(json["page_title"], "PV Production");
    assert_eq!(json["total_energy"]["production"]["slices"][0]["pull"], 0.12);
    assert_eq!(json["filter"]["selection"]["year"], 2023);
    assert_eq!(json["production"]["total"]["table"]["rows"][0][1], 12);
}

#[test]
fn test_bad_timestamp_fails_the_load() {
    let err = DataLoader::new()
        .load_from_reader(format!("{HEADER}01/01/2023 00:00,5000,3000,2000,3000,1000\n").as_bytes())
        .unwrap_err();
    assert!(matches!(err, DataLoadError::Parse { .. }));
}
