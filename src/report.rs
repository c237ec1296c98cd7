use pv_aggregator::dashboard::{CaptionedTable, DailyOverview, FilterSection, TotalEnergy};
use pv_aggregator::presentation::{PieChart, TableSpec};
use pv_aggregator::validation::IdentityViolation;

fn header(title: &str) {
    println!("\n{}", title);
    println!("{}", "=".repeat(title.chars().count().max(20)));
}

pub fn print_overview(overview: &DailyOverview) {
    header(&overview.title);
    for column in 0..overview.columns {
        for metric in overview.metrics.iter().filter(|m| m.column == column) {
            println!("  {:<32} {:>8}kWh", metric.label, metric.value_kwh);
        }
    }
}

fn print_pie(pie: &PieChart) {
    println!("  {} ({})", pie.title, pie.subtitle);
    for slice in &pie.slices {
        println!("    {:<30} {:>10}kWh", slice.label, slice.value);
    }
}

pub fn print_total_energy(total: &TotalEnergy) {
    header(&total.title);
    print_pie(&total.production);
    print_pie(&total.consumption);
}

/// Plain fixed-width rendering of a table, optionally cut after `limit` rows.
pub fn print_table(table: &TableSpec, limit: Option<usize>) {
    let shown = limit.unwrap_or(table.rows.len()).min(table.rows.len());
    let rendered: Vec<Vec<String>> = table.rows[..shown]
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            rendered
                .iter()
                .filter_map(|row| row.get(idx))
                .map(String::len)
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect();
        println!("  {}", padded.join("  "));
    };

    line(table.columns.iter().map(String::as_str).collect());
    for row in &rendered {
        line(row.iter().map(String::as_str).collect());
    }

    if shown < table.rows.len() {
        println!("  ... {} more rows", table.rows.len() - shown);
    }
}

pub fn print_captioned(table: &CaptionedTable) {
    println!("\n  {}", table.heading);
    if let Some(caption) = &table.caption {
        println!("  {}", caption);
    }
    print_table(&table.table, None);
}

pub fn print_filter(filter: &FilterSection) {
    header(&filter.heading);
    let months: Vec<&str> = filter.selection.months().iter().map(|m| m.name()).collect();
    println!("  Year:   {}", filter.selection.year());
    println!("  Months: {}", months.join(", "));

    if filter.table.is_empty() {
        println!("  No readings match this selection");
        return;
    }
    print_table(&filter.table, None);
}

pub fn print_violations(violations: &[IdentityViolation], readings: usize) {
    header("Energy Balance Check");
    if violations.is_empty() {
        println!("  All {} readings balance", readings);
        return;
    }

    println!("  {} of {} readings do not balance", violations.len(), readings);
    for v in violations {
        println!(
            "  line {:>6}  {}  production gap {:>9.3}kWh  consumption gap {:>9.3}kWh",
            v.line, v.timestamp, v.production_gap, v.consumption_gap
        );
    }
}
