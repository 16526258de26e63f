//! Category tree: ancestry, descendant closure and parent eligibility
//!
//! Categories live in an arena keyed by [`CategoryId`]. A parent link is just
//! an id lookup, so a corrupted snapshot (two categories pointing at each
//! other) can exist in memory; every walk carries its own visited set and
//! reports such loops instead of spinning on them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::types::{Category, CategoryId, NewCategory, PunchcardError, Result};

/// Separator placed between names in [`CategoryTree::full_path`]
pub const PATH_SEPARATOR: &str = " / ";

/// Snapshot of all categories, active or not
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: BTreeMap<CategoryId, Category>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from stored records. Later duplicates of an id win.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// All categories in id order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    fn require(&self, id: CategoryId) -> Result<&Category> {
        self.categories
            .get(&id)
            .ok_or(PunchcardError::UnknownCategory(id))
    }

    fn require_mut(&mut self, id: CategoryId) -> Result<&mut Category> {
        self.categories
            .get_mut(&id)
            .ok_or(PunchcardError::UnknownCategory(id))
    }

    fn next_id(&self) -> CategoryId {
        let last = self.categories.keys().next_back().map_or(0, |id| id.0);
        CategoryId(last + 1)
    }

    /// Create a new active category. The parent, if any, must exist and be active.
    pub fn add(&mut self, new: NewCategory) -> Result<CategoryId> {
        let id = self.next_id();
        if let Some(parent) = new.parent {
            let eligible = self.get(parent).is_some_and(|p| p.active);
            if !eligible {
                return Err(PunchcardError::InvalidParent {
                    category: id,
                    parent,
                });
            }
        }

        self.categories.insert(
            id,
            Category {
                id,
                name: new.name,
                active: true,
                parent: new.parent,
                description: new.description,
            },
        );
        Ok(id)
    }

    /// Replace name and/or description; `None` keeps the current value
    pub fn edit(
        &mut self,
        id: CategoryId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        let category = self.require_mut(id)?;
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(description) = description {
            category.description = description;
        }
        Ok(())
    }

    /// Soft delete (`false`) or restore (`true`) a category
    pub fn set_active(&mut self, id: CategoryId, active: bool) -> Result<()> {
        self.require_mut(id)?.active = active;
        Ok(())
    }

    /// Map of parent id to child ids, children sorted by name then id
    fn children_index(&self, include_inactive: bool) -> HashMap<CategoryId, Vec<CategoryId>> {
        let mut index: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
        for category in self.categories.values() {
            if !include_inactive && !category.active {
                continue;
            }
            if let Some(parent) = category.parent {
                index.entry(parent).or_default().push(category);
            }
        }

        index
            .into_iter()
            .map(|(parent, mut children)| {
                children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                (parent, children.into_iter().map(|c| c.id).collect())
            })
            .collect()
    }

    /// Active direct children of `id`, ordered by name
    pub fn children(&self, id: CategoryId) -> Result<Vec<CategoryId>> {
        self.require(id)?;
        Ok(self
            .children_index(false)
            .remove(&id)
            .unwrap_or_default())
    }

    /// Categories from the top level one down to `id` itself.
    ///
    /// Fails with `CycleDetected` when the parent chain revisits a category.
    pub fn ancestors(&self, id: CategoryId) -> Result<Vec<&Category>> {
        let mut current = self.require(id)?;
        let mut chain = vec![current];
        let mut seen = HashSet::from([id]);

        while let Some(parent) = current.parent {
            if !seen.insert(parent) {
                return Err(PunchcardError::CycleDetected {
                    category: id,
                    repeated: parent,
                });
            }
            current = self.require(parent)?;
            chain.push(current);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Names of all ancestors joined by `" / "`, e.g. `"Work / Client A / Support"`
    pub fn full_path(&self, id: CategoryId) -> Result<String> {
        let names: Vec<&str> = self
            .ancestors(id)?
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        Ok(names.join(PATH_SEPARATOR))
    }

    /// Every category reachable from `id` through child links, `id` excluded.
    ///
    /// Expands one frontier per round; only newly found members are expanded
    /// again, so the loop ends after at most depth + 1 rounds even when child
    /// links are corrupted into a loop. Inactive categories are expanded too:
    /// an active grandchild under an inactive child is still a descendant.
    pub fn descendants(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>> {
        self.require(id)?;
        let index = self.children_index(true);

        let mut closure = BTreeSet::from([id]);
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for member in &frontier {
                for child in index.get(member).into_iter().flatten() {
                    if closure.insert(*child) {
                        next.push(*child);
                    }
                }
            }
            frontier = next;
        }

        closure.remove(&id);
        Ok(closure)
    }

    /// Active categories that could become the parent of `id` without forming a loop
    pub fn valid_parents(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>> {
        let blacklisted = self.descendants(id)?;
        Ok(self
            .categories
            .values()
            .filter(|c| c.active && c.id != id && !blacklisted.contains(&c.id))
            .map(|c| c.id)
            .collect())
    }

    /// Valid parents of `id` labelled with their full path, sorted by label
    pub fn parent_choices(&self, id: CategoryId) -> Result<Vec<(CategoryId, String)>> {
        let mut choices = Vec::new();
        for parent in self.valid_parents(id)? {
            choices.push((parent, self.full_path(parent)?));
        }
        choices.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(choices)
    }

    /// Move `id` under `parent`, or to the top level when `parent` is `None`.
    ///
    /// The tree is left untouched on error.
    pub fn assign_parent(&mut self, id: CategoryId, parent: Option<CategoryId>) -> Result<()> {
        self.require(id)?;
        if let Some(parent) = parent {
            if parent == id || !self.valid_parents(id)?.contains(&parent) {
                return Err(PunchcardError::InvalidParent {
                    category: id,
                    parent,
                });
            }
        }

        self.require_mut(id)?.parent = parent;
        Ok(())
    }

    /// Pre-order walk of the forest as `(depth, category)` pairs.
    ///
    /// Top level categories and siblings come in name order. Inactive
    /// categories, and everything below them, are skipped unless
    /// `show_inactive` is set. Categories caught in a parent loop have no
    /// path from a top level category and never appear.
    pub fn walk(&self, show_inactive: bool) -> Vec<(usize, &Category)> {
        let index = self.children_index(true);

        let mut roots: Vec<&Category> = self.categories.values().filter(|c| c.is_root()).collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut stack: Vec<(usize, CategoryId)> = roots.iter().rev().map(|c| (0, c.id)).collect();
        let mut visited = HashSet::new();
        let mut out = Vec::with_capacity(self.categories.len());

        while let Some((depth, id)) = stack.pop() {
            let Some(category) = self.categories.get(&id) else {
                continue;
            };
            if !show_inactive && !category.active {
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            out.push((depth, category));
            if let Some(children) = index.get(&id) {
                stack.extend(children.iter().rev().map(|child| (depth + 1, *child)));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: u64, name: &str, parent: Option<u64>, active: bool) -> Category {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
            active,
            parent: parent.map(CategoryId),
            description: String::new(),
        }
    }

    fn ids(values: &[u64]) -> BTreeSet<CategoryId> {
        values.iter().copied().map(CategoryId).collect()
    }

    /// Work(1) ─┬─ ClientA(2) ── Support(4)
    ///          └─ ClientB(3)
    /// Home(5) ── Garden(6, inactive)
    fn sample_tree() -> CategoryTree {
        CategoryTree::from_categories(vec![
            cat(1, "Work", None, true),
            cat(2, "Client A", Some(1), true),
            cat(3, "Client B", Some(1), true),
            cat(4, "Support", Some(2), true),
            cat(5, "Home", None, true),
            cat(6, "Garden", Some(5), false),
        ])
    }

    // ========== ancestors() / full_path() ==========

    #[test]
    fn test_root_is_its_own_ancestry() {
        let tree = sample_tree();
        let chain = tree.ancestors(CategoryId(1)).unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, CategoryId(1));
        assert_eq!(tree.full_path(CategoryId(1)).unwrap(), "Work");
    }

    #[test]
    fn test_ancestors_root_first() {
        let tree = sample_tree();
        let chain: Vec<CategoryId> = tree
            .ancestors(CategoryId(4))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(chain, vec![CategoryId(1), CategoryId(2), CategoryId(4)]);
        assert_eq!(
            tree.full_path(CategoryId(4)).unwrap(),
            "Work / Client A / Support"
        );
    }

    #[test]
    fn test_inactive_ancestors_still_traversable() {
        let tree = sample_tree();
        assert_eq!(tree.full_path(CategoryId(6)).unwrap(), "Home / Garden");
    }

    #[test]
    fn test_two_node_loop_detected() {
        let tree = CategoryTree::from_categories(vec![
            cat(1, "A", Some(2), true),
            cat(2, "B", Some(1), true),
        ]);

        let err = tree.ancestors(CategoryId(1)).unwrap_err();
        assert!(matches!(
            err,
            PunchcardError::CycleDetected {
                category: CategoryId(1),
                repeated: CategoryId(1)
            }
        ));
        assert!(tree.full_path(CategoryId(2)).is_err());
    }

    #[test]
    fn test_loop_above_category_detected() {
        // 3 hangs off a loop between 1 and 2
        let tree = CategoryTree::from_categories(vec![
            cat(1, "A", Some(2), true),
            cat(2, "B", Some(1), true),
            cat(3, "C", Some(1), true),
        ]);

        let err = tree.ancestors(CategoryId(3)).unwrap_err();
        assert!(matches!(err, PunchcardError::CycleDetected { .. }));
    }

    #[test]
    fn test_self_parent_detected() {
        let tree = CategoryTree::from_categories(vec![cat(1, "A", Some(1), true)]);
        assert!(matches!(
            tree.ancestors(CategoryId(1)),
            Err(PunchcardError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_missing_parent_record() {
        let tree = CategoryTree::from_categories(vec![cat(1, "A", Some(9), true)]);
        assert!(matches!(
            tree.ancestors(CategoryId(1)),
            Err(PunchcardError::UnknownCategory(CategoryId(9)))
        ));
    }

    // ========== descendants() / valid_parents() ==========

    #[test]
    fn test_descendants_transitive() {
        let tree = sample_tree();
        assert_eq!(tree.descendants(CategoryId(1)).unwrap(), ids(&[2, 3, 4]));
        assert!(tree.descendants(CategoryId(4)).unwrap().is_empty());
    }

    #[test]
    fn test_valid_parents_excludes_self_and_descendants() {
        let tree = sample_tree();

        // Garden is inactive so never a candidate
        assert_eq!(tree.valid_parents(CategoryId(1)).unwrap(), ids(&[5]));
        assert_eq!(tree.valid_parents(CategoryId(2)).unwrap(), ids(&[1, 3, 5]));
    }

    #[test]
    fn test_valid_parents_of_leaf_is_every_other_active() {
        let tree = sample_tree();
        assert_eq!(
            tree.valid_parents(CategoryId(4)).unwrap(),
            ids(&[1, 2, 3, 5])
        );
    }

    #[test]
    fn test_valid_parents_of_inactive_excludes_itself() {
        let tree = sample_tree();
        let parents = tree.valid_parents(CategoryId(6)).unwrap();
        assert!(!parents.contains(&CategoryId(6)));
        assert_eq!(parents, ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_active_grandchild_below_inactive_child_is_blacklisted() {
        let tree = CategoryTree::from_categories(vec![
            cat(1, "A", None, true),
            cat(2, "B", Some(1), false),
            cat(3, "C", Some(2), true),
            cat(4, "D", None, true),
        ]);

        assert_eq!(tree.valid_parents(CategoryId(1)).unwrap(), ids(&[4]));
    }

    #[test]
    fn test_wide_and_deep_tree() {
        // Chain 1 → 2 → ... → 50, each link also carrying two leaves
        let mut categories = vec![cat(1, "n1", None, true)];
        let mut next = 51;
        for id in 2..=50 {
            categories.push(cat(id, &format!("n{id}"), Some(id - 1), true));
            for _ in 0..2 {
                categories.push(cat(next, &format!("leaf{next}"), Some(id), true));
                next += 1;
            }
        }
        categories.push(cat(next, "outsider", None, true));
        let tree = CategoryTree::from_categories(categories);

        assert_eq!(tree.valid_parents(CategoryId(1)).unwrap(), ids(&[next]));
        assert_eq!(tree.descendants(CategoryId(1)).unwrap().len(), tree.len() - 2);
    }

    #[test]
    fn test_descendants_terminate_on_corrupted_loop() {
        let tree = CategoryTree::from_categories(vec![
            cat(1, "A", Some(2), true),
            cat(2, "B", Some(1), true),
            cat(3, "C", None, true),
        ]);

        assert_eq!(tree.descendants(CategoryId(1)).unwrap(), ids(&[2]));
        assert_eq!(tree.valid_parents(CategoryId(1)).unwrap(), ids(&[3]));
    }

    #[test]
    fn test_parent_choices_sorted_by_path() {
        let tree = sample_tree();
        let choices = tree.parent_choices(CategoryId(3)).unwrap();
        let labels: Vec<&str> = choices.iter().map(|(_, label)| label.as_str()).collect();

        assert_eq!(
            labels,
            vec!["Home", "Work", "Work / Client A", "Work / Client A / Support"]
        );
    }

    // ========== assign_parent() ==========

    #[test]
    fn test_assign_parent_to_valid_candidate() {
        let mut tree = sample_tree();
        tree.assign_parent(CategoryId(4), Some(CategoryId(3)))
            .unwrap();

        assert_eq!(
            tree.full_path(CategoryId(4)).unwrap(),
            "Work / Client B / Support"
        );
    }

    #[test]
    fn test_assign_parent_none_makes_root() {
        let mut tree = sample_tree();
        tree.assign_parent(CategoryId(2), None).unwrap();

        assert!(tree.get(CategoryId(2)).unwrap().is_root());
        assert_eq!(tree.full_path(CategoryId(4)).unwrap(), "Client A / Support");
    }

    #[test]
    fn test_assign_parent_rejects_self() {
        let mut tree = sample_tree();
        let err = tree
            .assign_parent(CategoryId(2), Some(CategoryId(2)))
            .unwrap_err();

        assert!(matches!(
            err,
            PunchcardError::InvalidParent {
                category: CategoryId(2),
                parent: CategoryId(2)
            }
        ));
    }

    #[test]
    fn test_assign_parent_rejects_descendant_and_leaves_tree_unchanged() {
        let mut tree = sample_tree();
        let err = tree
            .assign_parent(CategoryId(1), Some(CategoryId(4)))
            .unwrap_err();

        assert!(matches!(err, PunchcardError::InvalidParent { .. }));
        assert!(tree.get(CategoryId(1)).unwrap().is_root());
        assert_eq!(
            tree.full_path(CategoryId(4)).unwrap(),
            "Work / Client A / Support"
        );
    }

    #[test]
    fn test_assign_parent_rejects_inactive_and_unknown() {
        let mut tree = sample_tree();
        assert!(matches!(
            tree.assign_parent(CategoryId(3), Some(CategoryId(6))),
            Err(PunchcardError::InvalidParent { .. })
        ));
        assert!(matches!(
            tree.assign_parent(CategoryId(3), Some(CategoryId(99))),
            Err(PunchcardError::InvalidParent { .. })
        ));
        assert!(matches!(
            tree.assign_parent(CategoryId(99), None),
            Err(PunchcardError::UnknownCategory(CategoryId(99)))
        ));
    }

    #[test]
    fn test_assign_parent_matches_valid_parents() {
        let tree = sample_tree();
        for category in tree.iter() {
            let valid = tree.valid_parents(category.id).unwrap();
            for candidate in tree.iter() {
                let mut scratch = tree.clone();
                let result = scratch.assign_parent(category.id, Some(candidate.id));
                assert_eq!(result.is_ok(), valid.contains(&candidate.id));
            }
        }
    }

    // ========== add() / edit() / set_active() ==========

    #[test]
    fn test_add_assigns_next_id() {
        let mut tree = sample_tree();
        let id = tree
            .add(NewCategory {
                name: "Billing".to_string(),
                parent: Some(CategoryId(3)),
                description: "invoices".to_string(),
            })
            .unwrap();

        assert_eq!(id, CategoryId(7));
        assert!(tree.get(id).unwrap().active);
        assert_eq!(tree.full_path(id).unwrap(), "Work / Client B / Billing");
    }

    #[test]
    fn test_add_rejects_inactive_parent() {
        let mut tree = sample_tree();
        let result = tree.add(NewCategory {
            name: "Roses".to_string(),
            parent: Some(CategoryId(6)),
            description: String::new(),
        });

        assert!(matches!(result, Err(PunchcardError::InvalidParent { .. })));
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_edit_and_deactivate() {
        let mut tree = sample_tree();
        tree.edit(CategoryId(3), Some("Client Beta".to_string()), None)
            .unwrap();
        tree.set_active(CategoryId(3), false).unwrap();

        let category = tree.get(CategoryId(3)).unwrap();
        assert_eq!(category.name, "Client Beta");
        assert!(!category.active);
        assert_eq!(tree.children(CategoryId(1)).unwrap(), vec![CategoryId(2)]);
    }

    // ========== walk() ==========

    #[test]
    fn test_walk_preorder_by_name() {
        let tree = sample_tree();
        let walked: Vec<(usize, &str)> = tree
            .walk(false)
            .into_iter()
            .map(|(depth, c)| (depth, c.name.as_str()))
            .collect();

        assert_eq!(
            walked,
            vec![
                (0, "Home"),
                (0, "Work"),
                (1, "Client A"),
                (2, "Support"),
                (1, "Client B"),
            ]
        );
    }

    #[test]
    fn test_walk_show_inactive() {
        let tree = sample_tree();
        let walked = tree.walk(true);

        assert_eq!(walked.len(), 6);
        assert_eq!(walked[1].0, 1);
        assert_eq!(walked[1].1.name, "Garden");
    }

    #[test]
    fn test_walk_skips_subtree_of_inactive() {
        let tree = CategoryTree::from_categories(vec![
            cat(1, "A", None, false),
            cat(2, "B", Some(1), true),
        ]);
        assert!(tree.walk(false).is_empty());
        assert_eq!(tree.walk(true).len(), 2);
    }
}
