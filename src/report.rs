//! Terminal tables for the CLI

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::audit::{Severity, VulnerabilityRecord};
use crate::monitor::{Category, DependencyUpdate, Project};

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(titles));
    table
}

fn period_label(period_secs: u64) -> String {
    if period_secs == 0 {
        "off".to_string()
    } else {
        format!("{}s", period_secs)
    }
}

pub fn projects_table(projects: &[Project]) -> Table {
    let mut table = new_table(&["Project", "Path", "Priority", "Outdated", "Vulnerabilities"]);

    for project in projects {
        table.add_row(vec![
            Cell::new(project.display_name()),
            Cell::new(project.path.display()),
            Cell::new(project.priority.len()),
            Cell::new(period_label(
                project.notifications.get(Category::Outdated).period_secs,
            )),
            Cell::new(period_label(
                project.notifications.get(Category::Vulnerabilities).period_secs,
            )),
        ]);
    }

    table
}

pub fn updates_table(updates: &[DependencyUpdate]) -> Table {
    let mut table = new_table(&["Package", "Current", "Latest", "Docs"]);

    for update in updates {
        let name = if update.is_priority {
            Cell::new(format!("★ {}", update.package)).fg(Color::Yellow)
        } else {
            Cell::new(&update.package)
        };
        table.add_row(vec![
            name,
            Cell::new(&update.current_version),
            Cell::new(&update.latest_version).fg(Color::Green),
            Cell::new(&update.doc_url),
        ]);
    }

    table
}

pub fn vulnerabilities_table(records: &[VulnerabilityRecord]) -> Table {
    let mut table = new_table(&[
        "Severity",
        "Title",
        "Package",
        "Version",
        "Patched In",
        "Dependency Of",
        "More Info",
    ]);

    for record in records {
        let color = match record.severity {
            Severity::Critical => Color::Magenta,
            Severity::High => Color::Red,
            Severity::Moderate => Color::Yellow,
            Severity::Low => Color::Blue,
            Severity::Unranked(_) => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(&record.severity).fg(color),
            Cell::new(&record.title),
            Cell::new(&record.package),
            Cell::new(&record.current_version),
            Cell::new(&record.patched_in),
            Cell::new(&record.dependency_of),
            Cell::new(&record.more_info),
        ]);
    }

    table
}
