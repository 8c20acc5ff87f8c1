use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use stats19_impute::ImputationReport;

use crate::types::BuildResult;

pub fn print_summary(result: &BuildResult) {
    if let Some(outputs) = &result.outputs {
        println!("Dataset: {}", outputs.dataset.display());
        println!("Schema: {}", outputs.schema.display());
    } else {
        println!("Dry run: nothing written");
    }
    println!("Rows: {}  Columns: {}", result.rows, result.columns);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Vehicles"),
        header_cell("Matched"),
        header_cell("Dropped"),
        header_cell("Casualties"),
        header_cell("Orphans"),
        header_cell("No casualty"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = [0usize; 6];
    for summary in &result.years {
        let counts = [
            summary.join.vehicles,
            summary.join.matched,
            summary.join.dropped_vehicles,
            summary.aggregate.casualty_rows,
            summary.aggregate.orphan_casualties,
            summary.aggregate.vehicles_without_casualties,
        ];
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
        table.add_row(vec![
            Cell::new(summary.year())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(counts[0]),
            Cell::new(counts[1]),
            count_cell(counts[2], Color::Yellow),
            Cell::new(counts[3]),
            count_cell(counts[4], Color::Yellow),
            Cell::new(counts[5]),
        ]);
    }
    let mut total_row = vec![Cell::new("TOTAL")
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)];
    total_row.extend(
        totals
            .iter()
            .map(|total| Cell::new(total).add_attribute(Attribute::Bold)),
    );
    table.add_row(total_row);
    println!("{table}");

    if result.features.unparseable_timestamps > 0 {
        eprintln!(
            "Warning: {} row(s) without a parseable accident timestamp",
            result.features.unparseable_timestamps
        );
    }
    print_imputation(&result.imputation);
}

fn print_imputation(report: &ImputationReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Imputation"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Label"), Cell::new(&report.label)]);
    table.add_row(vec![Cell::new("Labelled rows"), Cell::new(report.labelled_rows)]);
    table.add_row(vec![Cell::new("Missing rows"), Cell::new(report.missing_rows)]);
    table.add_row(vec![Cell::new("Imputed rows"), Cell::new(report.imputed_rows)]);
    match &report.fit {
        Some(fit) => {
            table.add_row(vec![Cell::new("Classes"), Cell::new(fit.classes.len())]);
            table.add_row(vec![
                Cell::new("Best iteration"),
                Cell::new(format!("{} of {}", fit.best_iteration, fit.rounds)),
            ]);
            table.add_row(vec![
                Cell::new("Validation error"),
                Cell::new(format!("{:.4}", fit.validation_error)),
            ]);
        }
        None => {
            table.add_row(vec![Cell::new("Classifier"), dim_cell("skipped")]);
        }
    }
    println!();
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
