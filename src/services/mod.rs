//! Services for the category tree, week partitioning and report aggregation

pub mod aggregator;
pub mod category_tree;
pub mod store;
pub mod validation;
pub mod weeks;

pub use aggregator::{EntryLookup, WeeklyAggregator};
pub use category_tree::{CategoryTree, PATH_SEPARATOR};
pub use store::JsonStore;
pub use weeks::{full_week, parse_day, partial_week, recent_weeks, Week, WeekStart};
