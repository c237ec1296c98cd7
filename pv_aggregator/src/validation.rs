use crate::models::Readings;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A reading whose energy balance does not add up.
///
/// Gaps are `total - (own + grid)`, so a positive production gap means more
/// was produced than was used or exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityViolation {
    pub line: usize,
    pub timestamp: NaiveDateTime,
    pub production_gap: f64,
    pub consumption_gap: f64,
}

/// Report readings where production != own + to_grid or
/// consumption != own + from_grid by more than `tolerance_kwh`.
///
/// Purely informational; nothing downstream consults it.
pub fn check_identities(readings: &Readings, tolerance_kwh: f64) -> Vec<IdentityViolation> {
    let violations: Vec<IdentityViolation> = readings
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| {
            let production_gap = r.total_production - (r.own_consumption + r.energy_to_grid);
            let consumption_gap = r.total_consumption - (r.own_consumption + r.energy_from_grid);
            (production_gap.abs() > tolerance_kwh || consumption_gap.abs() > tolerance_kwh).then(
                || IdentityViolation {
                    // header is line 1
                    line: idx + 2,
                    timestamp: r.timestamp,
                    production_gap,
                    consumption_gap,
                },
            )
        })
        .collect();

    if !violations.is_empty() {
        log::warn!(
            "{} of {} readings break the energy balance by more than {} kWh",
            violations.len(),
            readings.len(),
            tolerance_kwh
        );
    }

    violations
}
