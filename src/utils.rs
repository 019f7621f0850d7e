//! Some utility functions

use crate::selectors::DayEntry;

/// A debug utility that pretty-prints day entries
pub fn print_day_entries(entries: &[DayEntry]) {
    if entries.is_empty() {
        println!("    (no events)");
    }
    let mut current_day = None;
    for entry in entries {
        if current_day != Some(entry.day) {
            println!("{}", entry.day.format("%a %Y-%m-%d"));
            current_day = Some(entry.day);
        }
        print_day_entry(entry);
    }
}

pub fn print_day_entry(entry: &DayEntry) {
    let completion = if entry.completed { "✓" } else { " " };
    println!("    {} {}\t{}\t{}", completion, entry.title, entry.color.to_hex_string(), entry.id);
    if let Some(description) = &entry.description {
        println!("        {}", description);
    }
}
