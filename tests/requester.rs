use std::io::{Cursor, Write};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;
use toucan_client::error::ErrorKind;
use toucan_client::{Auth, SmallAppRequester, Table};
use toucan_dispatch::{MockDispatcher, Response};
use toucan_route::Verb;
use zip::write::SimpleFileOptions;

const BASE_ROUTE: &str = "fake.route/my-small-app";

fn table(columns: Vec<(&str, ArrayRef)>) -> Table {
    let schema = Arc::new(Schema::new(
        columns.iter().map(|(name, array)| Field::new(*name, array.data_type().clone(), false)).collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, array)| array).collect()).unwrap();
    Table::new(schema, vec![batch])
}

fn df() -> Table {
    table(vec![
        ("a", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        ("b", Arc::new(Int64Array::from(vec![4, 5, 6])) as ArrayRef),
    ])
}

fn df2() -> Table {
    table(vec![
        ("a", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
        ("b", Arc::new(StringArray::from(vec!["c", "d"])) as ArrayRef),
    ])
}

fn extraction_archive() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, table) in [("df", df()), ("df2", df2())] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&table.to_bytes().unwrap()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[fixture]
fn mock() -> Arc<MockDispatcher> {
    Arc::new(MockDispatcher::default())
}

#[fixture]
fn workdir() -> TempDir {
    TempDir::new().unwrap()
}

fn requester(mock: &Arc<MockDispatcher>, workdir: &TempDir) -> SmallAppRequester {
    SmallAppRequester::new(BASE_ROUTE, mock.clone()).with_cache_path(workdir.path().join("extraction_cache"))
}

#[rstest]
fn route_is_composed_from_segments(mock: Arc<MockDispatcher>, workdir: TempDir) {
    let mut requester = requester(&mock, &workdir);
    requester.segment("config").segment("etl").segment("get").call().unwrap();

    let call = mock.last_call().unwrap();
    assert_eq!(call.verb, Verb::Get);
    assert_eq!(call.url, "fake.route/my-small-app/config/etl");
}

#[rstest]
fn segments_reset_after_each_call(mock: Arc<MockDispatcher>, workdir: TempDir) {
    let mut requester = requester(&mock, &workdir);
    requester.config().etl().get().unwrap();
    requester.data().sources().post().unwrap();

    let urls: Vec<_> = mock.calls().into_iter().map(|call| (call.verb, call.url)).collect();
    assert_eq!(
        urls,
        vec![
            (Verb::Get, "fake.route/my-small-app/config/etl".to_string()),
            (Verb::Post, "fake.route/my-small-app/data/sources".to_string()),
        ]
    );
    assert!(requester.route().segments().is_empty());
}

#[rstest]
fn stage_persists_across_calls(mock: Arc<MockDispatcher>, workdir: TempDir) {
    let mut requester = requester(&mock, &workdir);
    requester.set_stage("staging");
    requester.config().etl().get().unwrap();
    requester.config().delete().unwrap();

    let urls: Vec<_> = mock.calls().into_iter().map(|call| call.url).collect();
    assert_eq!(
        urls,
        vec!["fake.route/my-small-app/config/etl?stage=staging", "fake.route/my-small-app/config?stage=staging"]
    );
}

#[rstest]
fn trailing_slash_in_base_is_stripped(mock: Arc<MockDispatcher>, workdir: TempDir) {
    let mut requester =
        SmallAppRequester::new("fake.route/my-small-app/", mock.clone()).with_cache_path(workdir.path().join("cache"));
    requester.config().etl().get().unwrap();
    assert_eq!(mock.last_call().unwrap().url, "fake.route/my-small-app/config/etl");
}

#[rstest]
fn options_are_forwarded_and_kept(mock: Arc<MockDispatcher>, workdir: TempDir) {
    let mut requester = requester(&mock, &workdir);
    requester.options_mut().auth = Some(Auth::basic("me", "pw"));
    requester.options_mut().json = Some(json!({"DATA_SOURCE": []}));

    requester.config().etl().put().unwrap();
    requester.config().etl().get().unwrap();

    for call in mock.calls() {
        assert_eq!(call.options.auth, Some(Auth::basic("me", "pw")));
        assert_eq!(call.options.json, Some(json!({"DATA_SOURCE": []})));
    }
}

#[rstest]
fn responses_are_returned_unchanged(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::new(404, "no such app").with_header("X-Request-Id", "42"));
    let response = requester(&mock, &workdir).config().get().unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.header("x-request-id"), Some("42"));
    assert_eq!(response.text().unwrap(), "no such app");
}

#[rstest]
fn dispatch_errors_are_wrapped(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.set_failing(true);
    let err = requester(&mock, &workdir).config().get().unwrap_err();
    assert_eq!(*err, ErrorKind::Dispatch);
}

#[rstest]
fn dfs_downloads_once(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::ok(extraction_archive()));
    let mut requester = requester(&mock, &workdir);
    requester.set_stage("staging");

    let tables = requester.dfs().unwrap().clone();
    assert_eq!(tables["df"], df());
    assert_eq!(tables["df2"], df2());
    assert_eq!(requester.dfs().unwrap(), &tables);

    assert_eq!(mock.calls().len(), 1);
    let call = mock.last_call().unwrap();
    assert_eq!(call.verb, Verb::Get);
    assert_eq!(call.url, "fake.route/my-small-app/sdk?stage=staging");
}

#[rstest]
fn dfs_leaves_pending_segments_alone(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::ok(extraction_archive()));
    let mut requester = requester(&mock, &workdir);
    requester.config();
    requester.dfs().unwrap();
    assert_eq!(requester.route().segments(), ["config"]);
}

#[rstest]
fn invalidate_reads_disk_again(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::ok(extraction_archive()));
    let mut requester = requester(&mock, &workdir);
    requester.dfs().unwrap();
    mock.reset_calls();

    requester.invalidate_cache();
    assert!(!requester.cache().is_loaded());
    let tables = requester.dfs().unwrap();
    assert_eq!(tables.len(), 2);
    assert!(mock.calls().is_empty());
}

#[rstest]
fn warm_cache_survives_a_new_requester(mock: Arc<MockDispatcher>, workdir: TempDir) {
    requester(&mock, &workdir).cache_dfs(&extraction_archive()).unwrap();

    let mut fresh = requester(&mock, &workdir);
    assert_eq!(fresh.dfs().unwrap()["df"], df());
    assert!(mock.calls().is_empty());
}

#[rstest]
fn purge_downloads_again(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::ok(extraction_archive()));
    mock.push_response(Response::ok(extraction_archive()));
    let mut requester = requester(&mock, &workdir);
    requester.dfs().unwrap();
    requester.purge_cache().unwrap();
    requester.dfs().unwrap();
    assert_eq!(mock.call_count(Verb::Get), 2);
}

#[rstest]
fn failed_download_is_a_cache_error(mock: Arc<MockDispatcher>, workdir: TempDir) {
    mock.push_response(Response::new(401, "unauthorized"));
    let mut requester = requester(&mock, &workdir);
    let err = requester.dfs().unwrap_err();
    assert_eq!(*err, ErrorKind::Cache);
    assert!(!requester.cache().exists_on_disk());
}
