pub mod frequency;
pub mod parser;
pub mod table;

pub use frequency::FrequencyTable;
pub use parser::{CinError, parse};
pub use table::CinTable;
