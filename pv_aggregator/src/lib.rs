pub mod aggregator;
pub mod dashboard;
pub mod data_loader;
pub mod error;
pub mod estimate;
pub mod filter;
pub mod models;
pub mod presentation;
pub mod validation;

pub use aggregator::{mean_kwh, pivot, sum_kwh, PivotTable, Reducer};
pub use dashboard::Dashboard;
pub use data_loader::DataLoader;
pub use error::{DataLoadError, SelectionError};
pub use filter::{FilteredView, Selection, SelectorDomain};
pub use models::{CalendarMonth, EnergyColumn, Reading, Readings};
pub use presentation::{ChartKind, ChartSpec, Theme};
