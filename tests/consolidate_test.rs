// Tests for building consolidated tables and writing the workbook
// The written workbook is read back with calamine

mod common;

use calamine::Data;
use common::{read_sheet, sheet_names};
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use steo_scraper::consolidate::{build_table, consolidate_all, ConsolidateError};
use steo_scraper::tables::{TableError, TablesDir};
use tempfile::TempDir;

fn write_region(root: &Path, table: &str, region: &str, description: &str, points: &[(&str, &str)]) {
    let dir = root.join(table);
    fs::create_dir_all(&dir).unwrap();

    let mut csv = String::from("period,seriesId,seriesDescription,value\n");
    for (period, value) in points {
        csv.push_str(&format!(
            "{period},{table}_{region},\"{description}\",{value}\n"
        ));
    }
    fs::write(dir.join(format!("{region}.csv")), csv).unwrap();
}

#[test]
fn test_build_table_disjoint_periods() {
    let dir = TempDir::new().unwrap();
    write_region(
        dir.path(),
        "PAPR",
        "NA",
        "Crude Oil Production, North America",
        &[("2023-02", "24.5"), ("2023-01", "24.1")],
    );
    write_region(
        dir.path(),
        "PAPR",
        "WORLD",
        "Crude Oil Production, World",
        &[("2024-02", "102.7"), ("2024-01", "101.9")],
    );

    let tables = TablesDir::new(dir.path());
    let table = build_table(&tables, &dir.path().join("PAPR")).unwrap();

    assert_eq!(table.name(), "PAPR");
    assert_eq!(table.columns(), ["North America", "World"]);

    let periods: Vec<&str> = table.periods_desc().collect();
    assert_eq!(periods, vec!["2024-02", "2024-01", "2023-02", "2023-01"]);
    assert_eq!(table.value("2024-02", "World"), Some(102.7));
    assert_eq!(table.value("2024-02", "North America"), None);
    assert_eq!(table.value("2023-01", "North America"), Some(24.1));
    assert_eq!(table.value("2023-01", "World"), None);
}

#[test]
fn test_build_table_duplicate_description_last_wins() {
    let dir = TempDir::new().unwrap();
    write_region(dir.path(), "PAPR", "A", "Crude Oil Production, World", &[("2024-01", "1")]);
    write_region(dir.path(), "PAPR", "B", "World, Crude Oil Production", &[("2024-01", "2")]);

    let tables = TablesDir::new(dir.path());
    let table = build_table(&tables, &dir.path().join("PAPR")).unwrap();

    assert_eq!(table.columns(), ["World"]);
    assert_eq!(table.value("2024-01", "World"), Some(2.0));
}

#[test]
fn test_build_table_empty_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("PAPR")).unwrap();

    let tables = TablesDir::new(dir.path());
    let result = build_table(&tables, &dir.path().join("PAPR"));
    assert!(matches!(result, Err(ConsolidateError::EmptyTable(_))));
}

#[test]
fn test_consolidate_all_writes_sheet_per_table() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(
        &root,
        "PAPR",
        "NA",
        "Crude Oil Production, North America",
        &[("2024-02", "25.1"), ("2024-01", "24.9")],
    );
    write_region(
        &root,
        "PAPR",
        "WORLD",
        "Crude Oil Production, World",
        &[("2024-03", "103.0"), ("2024-02", "102.7")],
    );
    write_region(
        &root,
        "PATC",
        "WORLD",
        "Liquid Fuels Consumption, World",
        &[("2024-01", "101.2")],
    );

    let output = dir.path().join("excels").join("STEO.xlsx");
    let summary =
        consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden()).unwrap();

    assert_eq!(summary.path, output);
    assert_eq!(summary.sheets, vec!["PAPR", "PATC"]);
    assert!(output.exists());
    assert_eq!(sheet_names(&output), vec!["PAPR", "PATC"]);

    let rows = read_sheet(&output, "PAPR");
    assert_eq!(
        rows[0],
        vec![
            Data::String("period".into()),
            Data::String("North America".into()),
            Data::String("World".into()),
        ]
    );
    assert_eq!(
        rows[1..],
        [
            vec![Data::String("2024-03".into()), Data::Empty, Data::Float(103.0)],
            vec![Data::String("2024-02".into()), Data::Float(25.1), Data::Float(102.7)],
            vec![Data::String("2024-01".into()), Data::Float(24.9), Data::Empty],
        ]
    );

    let rows = read_sheet(&output, "PATC");
    assert_eq!(rows[0][1], Data::String("World".into()));
    assert_eq!(rows[1][1], Data::Float(101.2));
}

#[test]
fn test_consolidate_all_no_tables() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("STEO.xlsx");

    let result = consolidate_all(&TablesDir::new(dir.path()), &output, &ProgressBar::hidden());
    assert!(matches!(result, Err(ConsolidateError::NoTables(_))));
    assert!(!output.exists());
}

#[test]
fn test_consolidate_all_missing_root() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("STEO.xlsx");

    let result = consolidate_all(
        &TablesDir::new(dir.path().join("missing")),
        &output,
        &ProgressBar::hidden(),
    );
    assert!(matches!(
        result,
        Err(ConsolidateError::Table(TableError::MissingRoot(_)))
    ));
}

#[test]
fn test_consolidate_all_aborts_without_writing_on_bad_region() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(&root, "PAPR", "NA", "Crude Oil Production, North America", &[("2024-01", "1")]);
    fs::create_dir_all(root.join("PATC")).unwrap();
    fs::write(root.join("PATC").join("WORLD.csv"), "period,value\n2024-01,1\n").unwrap();

    let output = dir.path().join("STEO.xlsx");
    let result = consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden());

    assert!(matches!(
        result,
        Err(ConsolidateError::Table(TableError::MissingColumn { .. }))
    ));
    assert!(!output.exists());
}

#[test]
fn test_consolidate_all_ignores_hidden_directories() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(&root, "PAPR", "NA", "Crude Oil Production, North America", &[("2024-01", "1")]);
    fs::create_dir_all(root.join(".cache")).unwrap();

    let output = dir.path().join("STEO.xlsx");
    let summary =
        consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden()).unwrap();

    assert_eq!(summary.sheets, vec!["PAPR"]);
    assert_eq!(sheet_names(&output), vec!["PAPR"]);
}

#[test]
fn test_consolidate_all_non_finite_values_are_blank() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(
        &root,
        "PAPR",
        "WORLD",
        "Crude Oil Production, World",
        &[("2024-03", "NaN"), ("2024-02", "inf"), ("2024-01", "101.9")],
    );

    let output = dir.path().join("STEO.xlsx");
    consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden()).unwrap();

    let rows = read_sheet(&output, "PAPR");
    assert_eq!(rows[1][1], Data::Empty);
    assert_eq!(rows[2][1], Data::Empty);
    assert_eq!(rows[3][1], Data::Float(101.9));
}

#[test]
fn test_consolidate_all_strips_edge_apostrophes_from_sheet_name() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(&root, "'Q", "WORLD", "Crude Oil Production, World", &[("2024-01", "1")]);

    let output = dir.path().join("STEO.xlsx");
    let summary =
        consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden()).unwrap();

    assert_eq!(summary.sheets, vec!["Q"]);
    assert_eq!(sheet_names(&output), vec!["Q"]);
}

#[test]
fn test_consolidate_all_sheet_name_clash() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(&root, "A:B", "WORLD", "Crude Oil Production, World", &[("2024-01", "1")]);
    write_region(&root, "A?B", "WORLD", "Crude Oil Production, World", &[("2024-01", "2")]);

    let output = dir.path().join("STEO.xlsx");
    let result = consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden());

    match result {
        Err(ConsolidateError::SheetNameClash { table, sheet }) => {
            assert_eq!(table, "A?B");
            assert_eq!(sheet, "A_B");
        }
        other => panic!("Expected SheetNameClash, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_consolidate_all_sheet_names_differing_only_in_case() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("tables");
    write_region(&root, "PAPR", "WORLD", "Crude Oil Production, World", &[("2024-01", "1")]);
    write_region(&root, "papr", "WORLD", "Crude Oil Production, World", &[("2024-01", "2")]);

    let output = dir.path().join("STEO.xlsx");
    let result = consolidate_all(&TablesDir::new(&root), &output, &ProgressBar::hidden());

    assert!(matches!(result, Err(ConsolidateError::SheetNameClash { .. })));
    assert!(!output.exists());
}
