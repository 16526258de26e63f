//! Hours logged against a category tree, reported week by week.
//!
//! [`services::CategoryTree`] answers ancestry and parent-eligibility
//! questions without ever looping on a corrupted tree;
//! [`services::weeks`] cuts time into week buckets and
//! [`services::WeeklyAggregator`] sums entries into them.

pub mod services;
pub mod settings;
pub mod types;
