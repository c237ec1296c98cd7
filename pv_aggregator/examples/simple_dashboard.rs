use pv_aggregator::aggregator::{averages, totals};
use pv_aggregator::estimate::combined_production;
use pv_aggregator::filter::apply;
use pv_aggregator::{pivot, DataLoader, EnergyColumn, Reducer, SelectorDomain};

const SAMPLE: &str = "\
Date and time,Total production,Total consumption,Own consumption,Energy to grid,Energy from grid
2023-01-01T00:00:00,5000,3000,2000,3000,1000
2023-01-02T00:00:00,7000,4000,3000,4000,1000
2023-02-01T00:00:00,9500,4200,3100,6400,1100
2023-06-15T00:00:00,38000,5000,4000,34000,1000
";

fn main() {
    let readings = DataLoader::new()
        .load_from_reader(SAMPLE.as_bytes())
        .expect("sample data is valid");

    let avg = averages(&readings);
    let sum = totals(&readings);

    println!("Daily Overview");
    println!("==============");
    println!("Average solar production: {}kWh", avg.total_production);
    println!("Average energy to the grid: {}kWh", avg.energy_to_grid);
    println!();
    println!("Total production: {}kWh", sum.total_production);
    println!("Total consumption: {}kWh", sum.total_consumption);
    println!();

    let table = pivot(&readings, EnergyColumn::TotalProduction, Reducer::Sum);
    print!("Year");
    for month in &table.months {
        print!("\t{}", month);
    }
    println!();
    for (year, row) in table.years.iter().zip(table.rounded()) {
        print!("{}", year);
        for value in row {
            print!("\t{}", value);
        }
        println!();
    }
    println!();

    println!("Production vs estimate:");
    for point in combined_production(&readings) {
        println!("  {:<8} {:<10} {}kWh", point.series, point.month, point.total_production);
    }
    println!();

    let domain = SelectorDomain::from_readings(&readings);
    let selection = domain
        .select_by_name(2023, &["January", "June"])
        .expect("months present in sample");
    let view = apply(&readings, &selection);
    let names: Vec<&str> = selection.months().iter().map(|m| m.name()).collect();
    println!("Filtered {} / {}:", selection.year(), names.join(", "));
    for group in &view.grouped {
        println!(
            "  {:<10} produced {:.1}kWh, exported {:.1}kWh",
            group.month, group.total_production, group.energy_to_grid
        );
    }
}
