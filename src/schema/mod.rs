//! Schema module - Search spaces, configuration and result types.

mod config;
mod search;
mod space;
mod value;

pub use config::*;
pub use search::*;
pub use space::*;
pub use value::*;
