use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use webui_cli::commands::{LevelRow, RenderResult};
use webui_loader::SubmissionOutcome;
use webui_render::FieldSpec;

pub fn print_fields(fields: &[FieldSpec]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Path"),
        header_cell("Datatype"),
        header_cell("Default"),
        header_cell("Levels"),
    ]);
    apply_table_style(&mut table);
    for field in fields {
        let levels = match &field.access_levels {
            Some(levels) => Cell::new(levels.join(", ")),
            None => dim_cell("all"),
        };
        let default = if field.default.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&field.default)
        };
        table.add_row(vec![
            Cell::new(field.id.as_str()).add_attribute(Attribute::Bold),
            Cell::new(field.path.to_string()),
            Cell::new(&field.datatype),
            default,
            levels,
        ]);
    }
    println!("{table}");
    println!("{} field(s)", fields.len());
}

pub fn print_levels(rows: &[LevelRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Level"),
        header_cell("Label"),
        header_cell("Default"),
        header_cell("Max"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.level.index()),
            Cell::new(&row.name).fg(Color::Cyan),
            Cell::new(&row.label),
            mark_cell(row.is_default),
            mark_cell(row.is_max),
        ]);
    }
    println!("{table}");
}

/// Notices and warnings of a render go to stderr so stdout stays pure HTML.
pub fn print_render_report(result: &RenderResult) {
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    for notice in &result.notices {
        eprintln!("notice: {notice}");
    }
    if result.too_high {
        eprintln!(
            "warning: level {} is above the permitted maximum; submissions will be refused",
            result.level.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_outcome(outcome: &SubmissionOutcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{}", outcome.message),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn mark_cell(marked: bool) -> Cell {
    if marked {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .add_attribute(Attribute::Bold)
        .fg(Color::Cyan)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
