//! `punchcard category` subcommands

use anyhow::bail;
use clap::Subcommand;
use serde::Serialize;

use punchcard::services::validation::validate_category_name;
use punchcard::services::{CategoryTree, JsonStore};
use punchcard::types::{CategoryId, NewCategory, Result};

use super::render::category_label;
use super::{to_json, Context};

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Show the category tree
    List {
        /// Include inactive categories and their children
        #[arg(long)]
        show_inactive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a category
    Add {
        name: String,

        /// Parent category id (top level when omitted)
        #[arg(long)]
        parent: Option<u64>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Change a category
    Edit {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Move under this parent
        #[arg(long, conflicts_with = "root")]
        parent: Option<u64>,

        /// Move to the top level
        #[arg(long)]
        root: bool,

        /// Deactivate (false) or reactivate (true)
        #[arg(long)]
        active: Option<bool>,
    },

    /// Show one category
    Show {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the categories that could become this category's parent
    Parents {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    path: String,
    depth: usize,
    active: bool,
    parent: Option<CategoryId>,
    description: String,
}

#[derive(Debug, Serialize)]
struct ParentChoice {
    id: CategoryId,
    path: String,
}

/// Field changes requested by `category edit`
#[derive(Debug, Default)]
struct CategoryChanges {
    name: Option<String>,
    description: Option<String>,
    parent: Option<Option<CategoryId>>,
    active: Option<bool>,
}

impl CategoryCommand {
    pub fn run(self, ctx: &Context) -> anyhow::Result<String> {
        let store = &ctx.store;
        match self {
            Self::List {
                show_inactive,
                json,
            } => list(store, show_inactive, json),
            Self::Add {
                name,
                parent,
                description,
            } => add(
                store,
                NewCategory {
                    name,
                    parent: parent.map(CategoryId),
                    description,
                },
            ),
            Self::Edit {
                id,
                name,
                description,
                parent,
                root,
                active,
            } => {
                let parent = match (parent, root) {
                    (Some(parent), _) => Some(Some(CategoryId(parent))),
                    (None, true) => Some(None),
                    (None, false) => None,
                };
                edit(
                    store,
                    CategoryId(id),
                    CategoryChanges {
                        name,
                        description,
                        parent,
                        active,
                    },
                )
            }
            Self::Show { id, json } => show(store, CategoryId(id), json),
            Self::Parents { id, json } => parents(store, CategoryId(id), json),
        }
    }
}

fn list(store: &JsonStore, show_inactive: bool, json: bool) -> anyhow::Result<String> {
    let tree = store.load_tree()?;
    let rows: Vec<CategoryRow> = tree
        .walk(show_inactive)
        .into_iter()
        .map(|(depth, c)| CategoryRow {
            id: c.id,
            name: c.name.clone(),
            path: category_label(&tree, c.id),
            depth,
            active: c.active,
            parent: c.parent,
            description: c.description.clone(),
        })
        .collect();

    if json {
        return to_json(&rows);
    }
    if rows.is_empty() {
        return Ok("No categories yet. Add one with `punchcard category add <NAME>`.".into());
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let marker = if row.active { "" } else { " (inactive)" };
            format!("{}{} [{}]{}", "  ".repeat(row.depth), row.name, row.id, marker)
        })
        .collect();
    Ok(lines.join("\n"))
}

fn add(store: &JsonStore, new: NewCategory) -> anyhow::Result<String> {
    validate_category_name(&new.name)?;

    let (id, label) = store.update_tree(|tree| {
        let id = tree.add(new)?;
        Ok((id, category_label(tree, id)))
    })?;

    tracing::info!(category = %id, "category added");
    Ok(format!("Added category {}: {}", id, label))
}

/// Apply every change to a scratch copy; the store only sees a fully valid result
fn apply_changes(
    tree: &CategoryTree,
    id: CategoryId,
    changes: CategoryChanges,
) -> Result<CategoryTree> {
    if let Some(name) = &changes.name {
        validate_category_name(name)?;
    }

    let mut scratch = tree.clone();
    scratch.edit(id, changes.name, changes.description)?;
    if let Some(active) = changes.active {
        scratch.set_active(id, active)?;
    }
    if let Some(parent) = changes.parent {
        scratch.assign_parent(id, parent)?;
    }
    Ok(scratch)
}

fn edit(store: &JsonStore, id: CategoryId, changes: CategoryChanges) -> anyhow::Result<String> {
    let label = store.update_tree(|tree| {
        *tree = apply_changes(tree, id, changes)?;
        Ok(category_label(tree, id))
    })?;

    tracing::info!(category = %id, "category updated");
    Ok(format!("Updated category {}: {}", id, label))
}

fn show(store: &JsonStore, id: CategoryId, json: bool) -> anyhow::Result<String> {
    let tree = store.load_tree()?;
    let Some(category) = tree.get(id) else {
        bail!("unknown category: {}", id);
    };

    if json {
        return to_json(category);
    }

    let children: Vec<String> = tree
        .children(id)?
        .into_iter()
        .map(|child| category_label(&tree, child))
        .collect();

    let mut lines = vec![
        format!("Category {}", id),
        format!("  Path:        {}", tree.full_path(id)?),
        format!("  Active:      {}", if category.active { "yes" } else { "no" }),
    ];
    if !category.description.is_empty() {
        lines.push(format!("  Description: {}", category.description));
    }
    if children.is_empty() {
        lines.push("  Children:    none".to_string());
    } else {
        lines.push(format!("  Children:    {}", children.join(", ")));
    }
    Ok(lines.join("\n"))
}

fn parents(store: &JsonStore, id: CategoryId, json: bool) -> anyhow::Result<String> {
    let tree = store.load_tree()?;
    let choices: Vec<ParentChoice> = tree
        .parent_choices(id)?
        .into_iter()
        .map(|(id, path)| ParentChoice { id, path })
        .collect();

    if json {
        return to_json(&choices);
    }
    if choices.is_empty() {
        return Ok(format!("Category {} can only be a top level category", id));
    }
    let lines: Vec<String> = choices
        .iter()
        .map(|choice| format!("[{}] {}", choice.id, choice.path))
        .collect();
    Ok(lines.join("\n"))
}
