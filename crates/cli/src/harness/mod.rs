pub mod comparator;
pub mod executor;
pub mod parser;
pub mod reporter;

pub use executor::*;
pub use parser::*;
pub use reporter::*;
