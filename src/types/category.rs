//! Category records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a category, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project or hobby that entries are logged against.
///
/// Categories nest through `parent`, which is `None` for top level categories.
/// An inactive category is hidden from listings and cannot take new entries
/// or children, but its existing entries and links are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub description: String,
}

fn default_active() -> bool {
    true
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Fields supplied when creating a category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub parent: Option<CategoryId>,
    pub description: String,
}
