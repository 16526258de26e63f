//! `punchcard entry` subcommands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use punchcard::services::{parse_day, JsonStore};
use punchcard::types::{CategoryId, EntryId, NewEntry};

use super::render::entry_line;
use super::{to_json, Context};

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    /// List entries, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log hours against a category
    Add {
        #[arg(long)]
        category: u64,

        #[arg(long)]
        hours: f64,

        /// Day worked, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Change an entry; omitted fields keep their value
    Edit {
        id: u64,

        #[arg(long)]
        category: Option<u64>,

        #[arg(long)]
        hours: Option<f64>,

        /// Day worked, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Show one entry
    Show {
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl EntryCommand {
    pub fn run(self, ctx: &Context) -> anyhow::Result<String> {
        let store = &ctx.store;
        match self {
            Self::List { json } => list(store, json),
            Self::Add {
                category,
                hours,
                date,
                description,
            } => {
                let date = match date {
                    Some(value) => parse_day(&value)?,
                    None => Local::now().date_naive(),
                };
                add(
                    store,
                    NewEntry {
                        category: CategoryId(category),
                        date,
                        hours,
                        description,
                    },
                )
            }
            Self::Edit {
                id,
                category,
                hours,
                date,
                description,
            } => {
                let date = date.as_deref().map(parse_day).transpose()?;
                edit(
                    store,
                    EntryId(id),
                    category.map(CategoryId),
                    hours,
                    date,
                    description,
                )
            }
            Self::Show { id, json } => show(store, EntryId(id), json),
        }
    }
}

fn list(store: &JsonStore, json: bool) -> anyhow::Result<String> {
    let entries = store.list_entries()?;
    if json {
        return to_json(&entries);
    }
    if entries.is_empty() {
        return Ok("No entries yet.".to_string());
    }

    let tree = store.load_tree()?;
    let lines: Vec<String> = entries.iter().map(|e| entry_line(&tree, e)).collect();
    Ok(lines.join("\n"))
}

fn add(store: &JsonStore, new: NewEntry) -> anyhow::Result<String> {
    let entry = store.add_entry(new)?;
    let tree = store.load_tree()?;
    Ok(format!("Added {}", entry_line(&tree, &entry)))
}

fn edit(
    store: &JsonStore,
    id: EntryId,
    category: Option<CategoryId>,
    hours: Option<f64>,
    date: Option<NaiveDate>,
    description: Option<String>,
) -> anyhow::Result<String> {
    let current = store.get_entry(id)?;
    let new = NewEntry {
        category: category.unwrap_or(current.category),
        date: date.unwrap_or(current.date),
        hours: hours.unwrap_or(current.hours),
        description: description.unwrap_or(current.description),
    };

    let entry = store.edit_entry(id, new)?;
    let tree = store.load_tree()?;
    Ok(format!("Updated {}", entry_line(&tree, &entry)))
}

fn show(store: &JsonStore, id: EntryId, json: bool) -> anyhow::Result<String> {
    let entry = store.get_entry(id)?;
    if json {
        return to_json(&entry);
    }
    let tree = store.load_tree()?;
    Ok(entry_line(&tree, &entry))
}
