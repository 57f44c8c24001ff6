use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use exset_cli::commands::{TextPair, Written};
use exset_table::{ColumnLayout, TableLayout};
use exset_text::WriteSummary;

pub fn print_table_written(path: &Path) {
    println!("Wrote {}", path.display());
}

pub fn print_text_written(pair: &TextPair, summary: &WriteSummary) {
    println!("Wrote {}", pair.csv.display());
    println!("Wrote {}", pair.metadata.display());
    println!("Rows: {}  Columns: {}", summary.rows, summary.columns.len());
    if !summary.renames.is_empty() {
        println!("Columns renamed in the encoded files (restored on read)");
    }
    for warning in &summary.warnings {
        match &warning.column {
            Some(column) => println!("warning: {column}: {}", warning.message),
            None => println!("warning: {}", warning.message),
        }
    }
}

pub fn print_written(written: &Written) {
    match written {
        Written::Table(path) => print_table_written(path),
        Written::Text(pair, summary) => print_text_written(pair, summary),
    }
}

pub fn print_layout(path: &Path, layout: &TableLayout) {
    println!("Table: {}", path.display());
    println!("Format revision: {}", layout.revision);
    match layout.rows {
        Some(rows) => println!("Rows: {rows}  Columns: {}", layout.columns.len()),
        None => println!("Columns: {}", layout.columns.len()),
    }
    if layout.columns.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entry"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Legacy type"),
        header_cell("Role"),
        header_cell("Storage"),
        header_cell("Dictionary"),
        header_cell("Positive"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 7, CellAlignment::Right);
    for column in &layout.columns {
        table.add_row(vec![
            Cell::new(&column.entry).fg(Color::Blue),
            Cell::new(column.name.as_deref().unwrap_or("?")),
            Cell::new(column.wire_type.as_deref().unwrap_or("?")),
            Cell::new(column.legacy_type.map(|t| t.as_str()).unwrap_or("")),
            Cell::new(role_label(column)),
            Cell::new(storage_label(column)),
            Cell::new(dictionary_label(column)),
            match column.positive_index {
                Some(index) => Cell::new(index),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
}

fn role_label(column: &ColumnLayout) -> String {
    match (&column.role, &column.legacy_role) {
        (Some(role), Some(legacy)) => format!("{role} ({legacy})"),
        (Some(role), None) => role.clone(),
        _ => String::new(),
    }
}

fn storage_label(column: &ColumnLayout) -> String {
    match &column.additional {
        Some(additional) => format!("{}[{}] + {additional}", column.storage, column.len),
        None => format!("{}[{}]", column.storage, column.len),
    }
}

fn dictionary_label(column: &ColumnLayout) -> String {
    match &column.dictionary {
        Some(dict) => match &dict.entry {
            Some(entry) => format!("{} values at {entry}", dict.distinct),
            None => format!("{} values inline", dict.distinct),
        },
        None => String::new(),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::DarkGrey)
}
