//! Plain-text rendering shared by the subcommands

use punchcard::services::CategoryTree;
use punchcard::types::{CategoryHours, CategoryId, Entry, WeekReport};

/// Full path of a category for display, falling back to its bare name (or
/// id) when the path cannot be built
pub fn category_label(tree: &CategoryTree, id: CategoryId) -> String {
    match tree.full_path(id) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(category = %id, "cannot build category path: {}", err);
            tree.get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("category {}", id))
        }
    }
}

pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

/// Category totals sorted by label, one indented line each
fn hours_lines(tree: &CategoryTree, hours: &CategoryHours, indent: usize) -> Vec<String> {
    let mut rows: Vec<(String, f64)> = hours
        .iter()
        .map(|(id, h)| (category_label(tree, *id), *h))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    let pad = " ".repeat(indent);
    rows.into_iter()
        .map(|(label, h)| format!("{}{:<40} {:>8}", pad, label, format_hours(h)))
        .collect()
}

pub fn entry_line(tree: &CategoryTree, entry: &Entry) -> String {
    let mut line = format!(
        "#{:<5} {}  {:>6}  {}",
        entry.id.0,
        entry.date,
        format_hours(entry.hours),
        category_label(tree, entry.category)
    );
    if !entry.description.is_empty() {
        line.push_str("  - ");
        line.push_str(&entry.description);
    }
    line
}

/// One week: totals first, then every day with its own totals
pub fn week_report(tree: &CategoryTree, report: &WeekReport) -> String {
    let mut lines = vec![format!(
        "Week {} .. {}  ({} h)",
        report.start_date,
        report.end_date,
        format_hours(report.total_hours())
    )];

    if report.category_hours.is_empty() {
        lines.push("  (no entries)".to_string());
    } else {
        lines.extend(hours_lines(tree, &report.category_hours, 2));
    }

    for day in &report.days {
        lines.push(format!(
            "  {:<9} {}  {:>8}",
            day.weekday_name,
            day.date,
            format_hours(day.total_hours())
        ));
        lines.extend(hours_lines(tree, &day.category_hours, 4));
    }

    lines.join("\n")
}
