//! Round-trip tests across the raw store and the aggregator: what is
//! written to disk, read back, and re-aggregated must match the table
//! computed from the in-memory history.

use chrono::{NaiveDate, NaiveDateTime};

use presslog_core::store::csv;
use presslog_core::{minute_averages, parse_line, Reading};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[test]
fn raw_store_round_trips_readings_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pressure_readings_2024-01-01.csv");

    let readings: Vec<Reading> = (0..25)
        .map(|i| parse_line(&format!("P={}.{}", i, i), at(10, i / 10, (i % 10) * 6)).unwrap())
        .collect();

    csv::init(&path).unwrap();
    csv::append(&path, &readings).unwrap();

    let restored = csv::read_day(&path).unwrap();
    assert_eq!(restored, readings);
}

#[test]
fn reaggregating_the_read_back_rows_matches_the_in_memory_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("day.csv");

    let readings = vec![
        parse_line("P=1.0", at(10, 0, 5)).unwrap(),
        parse_line("P=3.0", at(10, 0, 45)).unwrap(),
        parse_line("P=5.0", at(10, 1, 10)).unwrap(),
        parse_line("P=-2.5", at(10, 1, 30)).unwrap(),
    ];

    csv::init(&path).unwrap();
    csv::append(&path, &readings).unwrap();

    let from_disk = minute_averages(&csv::read_day(&path).unwrap());
    let from_memory = minute_averages(&readings);
    assert_eq!(from_disk, from_memory);

    assert_eq!(from_memory[0].minute, "2024-01-01 10:00");
    assert_eq!(from_memory[0].average, 2.0);
    assert_eq!(from_memory[1].minute, "2024-01-01 10:01");
    assert_eq!(from_memory[1].average, 1.25);
}

#[test]
fn batched_appends_accumulate_like_one_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("day.csv");

    let first = vec![parse_line("P=1.0", at(9, 0, 0)).unwrap()];
    let second = vec![
        parse_line("P=2.0", at(9, 0, 30)).unwrap(),
        parse_line("P=3.0", at(9, 1, 0)).unwrap(),
    ];

    csv::init(&path).unwrap();
    csv::append(&path, &first).unwrap();
    csv::init(&path).unwrap(); // same-day re-init must not truncate
    csv::append(&path, &second).unwrap();

    let rows = csv::read_day(&path).unwrap();
    assert_eq!(rows.len(), 3);

    let table = minute_averages(&rows);
    assert_eq!(table[0].average, 1.5);
    assert_eq!(table[1].average, 3.0);
}
