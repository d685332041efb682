use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use qc_cli::types::{RunResult, TaskOutcome};

pub fn print_summary(result: &RunResult) {
    println!("Subject: {}", result.bids_id);
    if result.tasks.is_empty() {
        println!("No status records found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Status record"),
        header_cell("Result"),
        header_cell("Report"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for task in &result.tasks {
        let record = task
            .status_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (outcome, report) = match &task.outcome {
            TaskOutcome::Rendered(path) => (
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
                Cell::new(path.display()),
            ),
            TaskOutcome::Skipped => (dim_cell("skipped"), dim_cell("-")),
            TaskOutcome::Failed(message) => (
                Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold),
                Cell::new(message).fg(Color::Red),
            ),
        };
        table.add_row(vec![
            Cell::new(task.module.tag()).fg(Color::Cyan),
            Cell::new(record),
            outcome,
            report,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} records", result.tasks.len())),
        Cell::new(format!(
            "{} / {} / {}",
            result.rendered(),
            result.skipped(),
            result.failed()
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("written / skipped / failed"),
    ]);
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160)
        .set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(18)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
