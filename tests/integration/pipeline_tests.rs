//! Pagination controller tests with a scripted fetcher

use crate::common::*;
use async_trait::async_trait;
use catalog_harvest::crawler::{FetchResult, PageFetcher, PaginationController};
use catalog_harvest::output::{
    build_sinks, count_csv_rows, CsvSink, JsonSink, ProductRecord, RecordSink, SinkError,
    SinkOutcome, SinkResult,
};
use catalog_harvest::state::{CheckpointStore, RunState, Termination};
use catalog_harvest::storage::SqliteSink;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const TEMPLATE: &str = "https://shop.example.com/eyeglasses/?p={page}&type=pagestate";

enum Step {
    Page(String),
    Timeout,
    Hang,
}

struct ScriptedFetcher {
    steps: VecDeque<Step>,
    requested: Vec<Url>,
    closed: bool,
}

impl ScriptedFetcher {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            requested: Vec::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&mut self, url: &Url) -> FetchResult {
        self.requested.push(url.clone());
        match self.steps.pop_front() {
            Some(Step::Page(markup)) => FetchResult::Success {
                url: url.clone(),
                markup,
            },
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Timeout) | None => FetchResult::Timeout { url: url.clone() },
        }
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

struct FailingSink;

impl RecordSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn write_batch(&mut self, _records: &[ProductRecord]) -> SinkResult<usize> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

fn checkpoint_in(dir: &Path) -> CheckpointStore {
    CheckpointStore::new(dir.join("checkpoint.json"))
}

fn controller(
    dir: &Path,
    max_pages: u32,
    steps: Vec<Step>,
    sinks: Vec<Box<dyn RecordSink>>,
) -> PaginationController<ScriptedFetcher> {
    PaginationController::new(
        crawler_config(TEMPLATE, max_pages),
        compiled_rules(),
        checkpoint_in(dir),
        ScriptedFetcher::new(steps),
        sinks,
    )
}

fn page_with_next(name: &str) -> Step {
    Step::Page(catalog_page(
        &[product("Acme", name, Some(("$10", "$8", "20%")))],
        Some("?next"),
    ))
}

fn last_page(name: &str) -> Step {
    Step::Page(catalog_page(
        &[product("Acme", name, Some(("$10", "$8", "20%")))],
        None,
    ))
}

fn sqlite_rows(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
        .unwrap()
}

#[tokio::test]
async fn test_fresh_start_fetches_page_one() {
    let temp_dir = TempDir::new().unwrap();
    let mut controller = controller(temp_dir.path(), 10, vec![last_page("One")], Vec::new());

    let report = controller.run().await;

    assert_eq!(report.start_page, 1);
    assert_eq!(
        controller.fetcher().requested[0].as_str(),
        "https://shop.example.com/eyeglasses/?p=1&type=pagestate"
    );
}

#[tokio::test]
async fn test_resume_fetches_page_after_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    checkpoint_in(temp_dir.path()).write_last_page(3).unwrap();

    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![page_with_next("Four"), last_page("Five")],
        Vec::new(),
    );
    let report = controller.run().await;

    let requested: Vec<String> = controller
        .fetcher()
        .requested
        .iter()
        .map(|u| u.query().unwrap_or_default().to_string())
        .collect();
    assert_eq!(requested, vec!["p=4&type=pagestate", "p=5&type=pagestate"]);
    assert_eq!(report.start_page, 4);
    assert_eq!(report.last_completed_page, Some(5));
    assert_eq!(checkpoint_in(temp_dir.path()).read_last_page(), 5);
}

#[tokio::test]
async fn test_no_more_pages() {
    let temp_dir = TempDir::new().unwrap();
    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![page_with_next("One"), last_page("Two")],
        Vec::new(),
    );

    let report = controller.run().await;

    assert_eq!(report.termination, Termination::NoMorePages);
    assert!(report.is_success());
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(
        controller.state(),
        RunState::Terminated(Termination::NoMorePages)
    );
    assert!(controller.fetcher().closed);
}

#[tokio::test]
async fn test_max_pages_reached() {
    let temp_dir = TempDir::new().unwrap();
    let mut controller = controller(
        temp_dir.path(),
        3,
        vec![
            page_with_next("One"),
            page_with_next("Two"),
            page_with_next("Three"),
            page_with_next("Four"),
        ],
        Vec::new(),
    );

    let report = controller.run().await;

    assert_eq!(report.termination, Termination::MaxPagesReached);
    assert!(report.is_success());
    assert_eq!(controller.fetcher().requested.len(), 3);
    assert_eq!(checkpoint_in(temp_dir.path()).read_last_page(), 3);
}

#[tokio::test]
async fn test_fetch_timeout_flushes_collected_records() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");
    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![page_with_next("One"), Step::Timeout],
        vec![Box::new(CsvSink::new(&csv_path))],
    );

    let report = controller.run().await;

    assert_eq!(report.termination, Termination::FetchTimeout);
    assert!(!report.is_success());
    assert_eq!(report.last_completed_page, Some(1));
    assert_eq!(report.sinks[0].outcome, SinkOutcome::Written(1));
    assert_eq!(count_csv_rows(&csv_path).unwrap(), 1);
    assert_eq!(checkpoint_in(temp_dir.path()).read_last_page(), 1);
}

#[tokio::test]
async fn test_checkpoint_failure_still_flushes() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let csv_path = temp_dir.path().join("products.csv");
    let mut controller = PaginationController::new(
        crawler_config(TEMPLATE, 10),
        compiled_rules(),
        CheckpointStore::new(blocker.join("checkpoint.json")),
        ScriptedFetcher::new(vec![page_with_next("One"), last_page("Two")]),
        vec![Box::new(CsvSink::new(&csv_path))],
    );

    let report = controller.run().await;

    assert_eq!(report.termination, Termination::CheckpointFailed);
    assert_eq!(report.last_completed_page, None);
    assert_eq!(controller.fetcher().requested.len(), 1);
    assert_eq!(count_csv_rows(&csv_path).unwrap(), 1);
}

#[tokio::test]
async fn test_interrupt_during_fetch_flushes_previous_pages() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");
    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![page_with_next("One"), Step::Hang],
        vec![Box::new(JsonSink::new(&json_path))],
    );

    let report = controller
        .run_until(tokio::time::sleep(Duration::from_millis(200)))
        .await;

    assert_eq!(report.termination, Termination::Interrupted);
    assert_eq!(report.records_collected, 1);
    assert_eq!(report.sinks[0].outcome, SinkOutcome::Written(1));
    assert_eq!(JsonSink::new(&json_path).load_entries().unwrap().len(), 1);
    assert_eq!(checkpoint_in(temp_dir.path()).read_last_page(), 1);
    assert!(controller.fetcher().closed);
}

#[tokio::test]
async fn test_zero_records_skips_sinks() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");
    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![Step::Timeout],
        vec![Box::new(CsvSink::new(&csv_path)), Box::new(FailingSink)],
    );

    let report = controller.run().await;

    assert_eq!(report.records_collected, 0);
    assert!(report
        .sinks
        .iter()
        .all(|s| s.outcome == SinkOutcome::Skipped));
    assert!(!report.has_sink_failures());
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_failed_database_does_not_block_file_sinks() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");
    let json_path = temp_dir.path().join("products.json");
    let sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(SqliteSink::new(temp_dir.path())),
        Box::new(CsvSink::new(&csv_path)),
        Box::new(JsonSink::new(&json_path)),
    ];
    let mut controller = controller(temp_dir.path(), 10, vec![last_page("One")], sinks);

    let report = controller.run().await;

    assert!(report.sinks[0].is_failure());
    assert_eq!(report.sinks[1].outcome, SinkOutcome::Written(1));
    assert_eq!(report.sinks[2].outcome, SinkOutcome::Written(1));
    assert_eq!(count_csv_rows(&csv_path).unwrap(), 1);
    assert_eq!(checkpoint_in(temp_dir.path()).read_last_page(), 1);
}

#[tokio::test]
async fn test_failed_file_sink_does_not_block_database() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");
    let db_path = temp_dir.path().join("products.db");
    fs::write(&json_path, r#"{"not": "an array"}"#).unwrap();

    let sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(JsonSink::new(&json_path)),
        Box::new(SqliteSink::new(&db_path)),
    ];
    let mut controller = controller(
        temp_dir.path(),
        10,
        vec![page_with_next("One"), last_page("Two")],
        sinks,
    );

    let report = controller.run().await;

    assert!(report.sinks[0].is_failure());
    assert_eq!(report.sinks[1].outcome, SinkOutcome::Written(2));
    assert_eq!(sqlite_rows(&db_path), 2);
    assert_eq!(
        fs::read_to_string(&json_path).unwrap(),
        r#"{"not": "an array"}"#
    );
}

#[tokio::test]
async fn test_two_page_catalog_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(TEMPLATE, temp_dir.path());
    let sinks = build_sinks(&config.output);

    let mut controller = PaginationController::new(
        config.crawler.clone(),
        compiled_rules(),
        CheckpointStore::new(&config.output.checkpoint_path),
        ScriptedFetcher::new(vec![
            Step::Page(two_page_catalog_first()),
            Step::Page(two_page_catalog_second()),
        ]),
        sinks,
    );

    let report = controller.run().await;

    assert_eq!(report.termination, Termination::NoMorePages);
    assert_eq!(report.records_collected, 4);
    assert_eq!(
        CheckpointStore::new(&config.output.checkpoint_path).read_last_page(),
        2
    );

    let csv = fs::read_to_string(config.output.csv_path.as_ref().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "Brand,Product_Name,Former_Price,Current_Price,Discount"
    );
    assert_eq!(lines[1], "Acme,Aviator 58,150,120,20");
    assert_eq!(lines[2], "Acme,Round 50,1234.5,999,19");
    assert_eq!(lines[3], "Birch,Cat Eye,,,");
    assert_eq!(lines[4], "Birch,Square 54,80,60,25");

    let entries = JsonSink::new(config.output.json_path.as_ref().unwrap())
        .load_entries()
        .unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2]["Brand"], "Birch");
    assert!(entries[2]["Current_Price"].is_null());

    let db_path = config.output.database_path.as_ref().unwrap();
    assert_eq!(sqlite_rows(Path::new(db_path)), 4);
    assert!(report.sinks.iter().all(|s| s.outcome == SinkOutcome::Written(4)));
}
