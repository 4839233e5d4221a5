/// Turning flat API rows into named, chart-ready series.
pub mod group;

/// Date & number clean-up shared by the grouper and the dashboards.
pub mod normalize;

/// Records served by the fashion/stock backend.
pub mod schema;

pub mod prelude {
    pub use crate::group::{group, group_with, GroupKey, Series};
    pub use crate::normalize::{format_date, format_number, format_percent, parse_date, Datum};
    pub use crate::schema::*;
}
