pub mod time;
pub mod types;
pub(crate) mod utils;

pub use time::*;
pub use types::*;
