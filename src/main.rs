use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pv_aggregator::validation::check_identities;
use pv_aggregator::presentation::bind_raw_table;
use pv_aggregator::{
    ChartSpec, Dashboard, DataLoader, Readings, Selection, SelectorDomain, Theme,
};
use std::path::{Path, PathBuf};

mod chart_renderer;
mod report;
mod table_export;

use chart_renderer::ChartRenderer;
use table_export::{export_table, TableFormat};

#[derive(Parser)]
#[command(name = "pv_dashboard")]
#[command(about = "Summarise PV production, consumption and grid exchange from a CSV export")]
struct Args {
    /// CSV file with one row per reading (energy values in Wh)
    #[arg(short, long, default_value = "PV.csv", global = true)]
    input: PathBuf,

    /// Field delimiter of the input file
    #[arg(long, default_value_t = ',', global = true)]
    delimiter: char,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Clone, Default)]
struct SelectionArgs {
    /// Year to drill into (defaults to the most recent year in the data)
    #[arg(short, long)]
    year: Option<i32>,

    /// Months to include; repeat or pass none at all for an empty selection
    #[arg(short, long = "month", num_args = 0..)]
    months: Option<Vec<String>>,
}

#[derive(Subcommand)]
enum Command {
    /// Daily averages and total energy split
    Overview,
    /// Year x month production tables and the estimate comparison
    Production,
    /// Per-month sums for a year and set of months
    Filter(SelectionArgs),
    /// Every reading as loaded
    Raw {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report readings whose production or consumption does not balance
    Check {
        /// Allowed deviation in kWh
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
    },
    /// Write every chart as PNG, every table as CSV/Parquet and the dashboard as JSON
    Render {
        #[arg(short, long, default_value = "dashboard")]
        out_dir: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// JSON file overriding styling defaults
        #[arg(long)]
        theme: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "csv")]
        table_format: TableFormat,
    },
}

fn load_readings(args: &Args) -> Result<Readings> {
    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }
    let loader = DataLoader::new().with_delimiter(args.delimiter as u8);
    loader
        .load(&args.input)
        .with_context(|| format!("Failed to load readings from {}", args.input.display()))
}

/// Turn CLI choices into a selection validated against the loaded data.
fn resolve_selection(domain: &SelectorDomain, args: &SelectionArgs) -> Result<Option<Selection>> {
    let Some(default) = domain.default_selection() else {
        return Ok(None);
    };

    let year = args.year.unwrap_or(default.year());
    let selection = match &args.months {
        Some(names) => domain.select_by_name(year, names)?,
        None => domain.select(year, default.months().to_vec())?,
    };
    Ok(Some(selection))
}

fn load_theme(path: Option<&Path>) -> Result<Theme> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read theme {}", path.display()))?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(Theme::default()),
    }
}

fn render_dashboard(
    dashboard: &Dashboard,
    out_dir: &Path,
    table_format: TableFormat,
) -> Result<()> {
    let renderer = ChartRenderer::new(out_dir.to_path_buf())?;

    let mut charts = 0;
    let mut tables = 0;
    for (name, spec) in dashboard.charts() {
        if let ChartSpec::Table(table) = &spec {
            export_table(table, out_dir, &name, table_format)?;
            tables += 1;
        } else if renderer.render(&name, &spec)?.is_some() {
            charts += 1;
        }
    }

    let json_path = out_dir.join("dashboard.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(dashboard)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!("Wrote {} charts and {} tables to {}", charts, tables, out_dir.display());
    println!("✅ Dashboard written to {}", out_dir.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let readings = load_readings(&args)?;
    let domain = SelectorDomain::from_readings(&readings);
    info!(
        "Loaded {} readings covering years {:?}",
        readings.len(),
        domain.years
    );

    match args.command.as_ref().unwrap_or(&Command::Overview) {
        Command::Overview => {
            let dashboard = Dashboard::build(&readings, &domain, None, &Theme::default());
            report::print_overview(&dashboard.overview);
            report::print_total_energy(&dashboard.total_energy);
        }
        Command::Production => {
            let dashboard = Dashboard::build(&readings, &domain, None, &Theme::default());
            let production = &dashboard.production;
            println!("\n{}", production.title);
            println!("{}", "=".repeat(production.title.len()));
            report::print_captioned(&production.total);
            report::print_captioned(&production.highest);
            report::print_captioned(&production.average);
        }
        Command::Filter(selection) => {
            let selection = resolve_selection(&domain, selection)?;
            let dashboard = Dashboard::build(&readings, &domain, selection, &Theme::default());
            match &dashboard.filter {
                Some(filter) => report::print_filter(filter),
                None => println!("No readings loaded, nothing to filter"),
            }
        }
        Command::Raw { limit } => {
            let table = bind_raw_table(&readings);
            println!("\nRAW");
            report::print_table(&table, *limit);
        }
        Command::Check { tolerance } => {
            let violations = check_identities(&readings, *tolerance);
            report::print_violations(&violations, readings.len());
        }
        Command::Render {
            out_dir,
            selection,
            theme,
            table_format,
        } => {
            let theme = load_theme(theme.as_deref())?;
            let selection = resolve_selection(&domain, selection)?;
            let dashboard = Dashboard::build(&readings, &domain, selection, &theme);
            render_dashboard(&dashboard, out_dir, *table_format)?;
        }
    }

    Ok(())
}
