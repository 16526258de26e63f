//! Type definitions for punchcard

mod category;
mod entry;
mod error;
mod report;

pub use category::*;
pub use entry::*;
pub use error::*;
pub use report::*;
