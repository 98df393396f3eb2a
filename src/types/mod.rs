//! Data types for the grid view.

mod column;
mod config;
mod range;
mod value;

pub use column::*;
pub use config::*;
pub use range::*;
pub use value::*;
