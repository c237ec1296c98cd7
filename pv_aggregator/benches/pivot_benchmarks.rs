use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pv_aggregator::filter::apply;
use pv_aggregator::{pivot, EnergyColumn, Reading, Readings, Reducer, SelectorDomain};

/// Three years of daily readings with a rough seasonal production curve.
fn synthetic_readings() -> Readings {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let rows = (0..3 * 365)
        .map(|day| {
            let season = ((day % 365) as f64 / 365.0 * std::f64::consts::PI).sin();
            let production = 5.0 + 40.0 * season;
            let own = production * 0.4;
            let consumption = 18.0;
            Reading::new(
                start + Duration::days(day),
                [
                    production,
                    consumption,
                    own,
                    production - own,
                    consumption - own,
                ],
            )
        })
        .collect();

    Readings::new(rows)
}

fn benchmark_pivot(c: &mut Criterion) {
    let readings = synthetic_readings();

    for (name, reducer) in [
        ("pivot_sum", Reducer::Sum),
        ("pivot_max", Reducer::Max),
        ("pivot_mean", Reducer::Mean),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| black_box(pivot(&readings, EnergyColumn::TotalProduction, reducer)));
        });
    }
}

fn benchmark_filter(c: &mut Criterion) {
    let readings = synthetic_readings();
    let domain = SelectorDomain::from_readings(&readings);
    let selection = domain.default_selection().unwrap();

    c.bench_function("filter_default_selection", |b| {
        b.iter(|| black_box(apply(&readings, &selection)));
    });
}

criterion_group!(benches, benchmark_pivot, benchmark_filter);
criterion_main!(benches);
