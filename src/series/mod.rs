mod data_point;
mod data_type;
mod duplicate_policy;
mod flagged;
mod time_series_data;

pub use data_point::*;
pub use data_type::*;
pub use duplicate_policy::*;
pub use flagged::*;
pub use time_series_data::*;
