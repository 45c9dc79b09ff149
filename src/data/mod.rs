pub mod dataset;
pub mod export_csv;
pub mod normalize;
pub mod projections;
pub mod record;

pub use dataset::{Dataset, FilterCriteria};
pub use export_csv::{export_csv, export_file_name, ExportError};
pub use normalize::{format_phone, normalize, process_rows};
pub use projections::{
    chart_series, city_summary, compare_mesa, filter_options, has_telefono, leader_summary,
    statistics, ChartSeries, FilterOptions, GroupSummary, Statistics,
};
pub use record::{CanonicalRecord, RawRecord, RawValue, RowError};
