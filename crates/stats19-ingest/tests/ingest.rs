//! Integration tests for loading a year of the extract.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use tempfile::TempDir;

use stats19_ingest::{
    CsvTableSource, InMemoryTableSource, IngestError, TableSource, load_year,
    normalize_accident_reference,
};
use stats19_model::TableKind;

fn frame(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
    DataFrame::new(
        columns
            .into_iter()
            .map(|(name, values)| Series::new(name.into(), values).into_column())
            .collect(),
    )
    .unwrap()
}

fn write_year(dir: &TempDir, year: i32) {
    let write = |kind: &str, content: &str| {
        std::fs::write(
            dir.path()
                .join(format!("dft-road-casualty-statistics-{kind}-{year}.csv")),
            content,
        )
        .unwrap();
    };
    write(
        "accident",
        "accident_index,accident_year,accident_reference,longitude,latitude,date,time,speed_limit\n\
         2021010000001,2021,10000001,-0.1,51.5,04/01/2021,08:30,30\n\
         2021010000002,2021,010000002,-0.2,51.6,05/01/2021,17:05,99\n",
    );
    write(
        "vehicle",
        "accident_index,accident_year,accident_reference,vehicle_reference,vehicle_type,generic_make_model\n\
         2021010000001,2021,010000001,1,9,FORD FIESTA\n\
         2021010000001,2021,010000001,2,3,-1\n\
         2021010000002,2021,10000002,1,11,-1\n",
    );
    write(
        "casualty",
        "accident_index,accident_year,accident_reference,vehicle_reference,casualty_reference,casualty_class,casualty_severity,casualty_type\n\
         2021010000001,2021,010000001,1,1,1,3,9\n",
    );
}

#[test]
fn load_year_from_csv_normalizes_keys() {
    let dir = TempDir::new().unwrap();
    write_year(&dir, 2021);

    let source = CsvTableSource::new(dir.path());
    let tables = load_year(&source, 2021).unwrap();

    assert_eq!(tables.year, 2021);
    assert_eq!(tables.accidents.len(), 2);
    assert_eq!(tables.vehicles.len(), 3);
    assert_eq!(tables.casualties.len(), 1);
    assert_eq!(tables.accidents[0].accident_reference, "010000001");
    assert_eq!(tables.vehicles[2].accident_reference, "010000002");
    assert_eq!(tables.vehicles[0].accident_year, Some(2021));
    assert_eq!(tables.vehicles[1].vehicle_type, Some(3));
    assert_eq!(tables.accidents[1].speed_limit, Some(99));
    assert_eq!(tables.accidents[0].time.as_deref(), Some("08:30"));
}

#[test]
fn load_year_reports_missing_table() {
    let source = InMemoryTableSource::new().with_table(
        2020,
        TableKind::Accident,
        frame(vec![("accident_reference", vec!["1"])]),
    );
    let err = load_year(&source, 2020).unwrap_err();
    assert!(matches!(
        err,
        IngestError::TableNotFound {
            year: 2020,
            kind: TableKind::Vehicle
        }
    ));
}

#[test]
fn in_memory_source_returns_registered_frame() {
    let df = frame(vec![("accident_reference", vec!["1", "2"])]);
    let source = InMemoryTableSource::new().with_table(2019, TableKind::Accident, df);
    let read = source.read_table(2019, TableKind::Accident).unwrap();
    assert_eq!(read.height(), 2);
}

#[test]
fn normalizes_short_reference() {
    assert_eq!(normalize_accident_reference("123"), "000000123");
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[0-9A-Z]{1,12}") {
        let once = normalize_accident_reference(&raw);
        let twice = normalize_accident_reference(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.len() >= 9);
        prop_assert!(once.ends_with(raw.as_str()));
    }

    #[test]
    fn numeric_references_pad_to_width(value in 0u32..=999_999_999) {
        let normalized = normalize_accident_reference(&value.to_string());
        prop_assert_eq!(normalized.len(), 9);
        prop_assert_eq!(normalized.parse::<u32>().unwrap(), value);
    }
}
