use std::collections::BTreeMap;

use delta_append_kernel::log::{
    build_add, build_metadata, build_protocol, serialize_commit, Commit, DataFile,
    InMemoryLogStore, LogStore,
};
use delta_append_kernel::notify::{
    InMemorySink, NotificationSink, TransactionDestination, TransactionNotification,
    TransportMessage,
};
use delta_append_kernel::pipeline::{
    generate_append_commit, generate_append_notification, AppendRequest,
};
use delta_append_kernel::schema::{encode_schema, Column, ColumnType, TableSchema};
use serde_json::Value;

const TIME: i64 = 1_700_000_000_000;

fn archer_schema() -> TableSchema {
    TableSchema::new(vec![
        Column::new("archer", ColumnType::String, false),
        Column::new("year", ColumnType::Int16, true),
    ])
}

fn archer_request() -> AppendRequest {
    AppendRequest::single_file(
        "abc-123",
        vec!["year".into()],
        TIME,
        1,
        2,
        DataFile {
            path: "year=1992/part-0.parquet".into(),
            partition_values: BTreeMap::from([("year".into(), "1992".into())]),
            size: 100,
            modification_time: TIME,
        },
    )
}

fn destination() -> TransactionDestination {
    TransactionDestination {
        storage_account_auth_type: "WorkloadIdentityCredential".into(),
        storage_account_name: "arcdata".into(),
        storage_container_name: "onelake".into(),
        table_relative_path: "raw/eventhub/notifications".into(),
        storage_account_dfs_endpoint: "dfs.core.windows.net".into(),
        storage_account_tenant_id: "72f988bf-86f1-41af-91ab-2d7cd011db47".into(),
        engine_info: "DeltaLakeStandaloneDotnet/V1".into(),
    }
}

fn decode_lines(text: &str) -> Vec<Value> {
    text.split('\n')
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect()
}

#[test]
fn archer_scenario_produces_expected_lines() {
    let text = generate_append_commit(&archer_schema(), &archer_request()).unwrap();
    let lines: Vec<&str> = text.split('\n').collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(concat!(
        r#""schemaString":"{\"type\":\"struct\",\"fields\":["#,
        r#"{\"name\":\"archer\",\"type\":\"string\",\"nullable\":false,\"metadata\":{}},"#,
        r#"{\"name\":\"year\",\"type\":\"short\",\"nullable\":true,\"metadata\":{}}]}""#
    )));
    assert!(lines[2].contains(r#""dataChange":true"#));
    assert!(lines[2].contains(r#""path":"year=1992/part-0.parquet""#));
}

#[test]
fn archer_scenario_is_byte_exact() {
    let text = generate_append_commit(&archer_schema(), &archer_request()).unwrap();

    let expected = [
        concat!(
            r#"{"metaData":{"id":"abc-123","format":{"provider":"parquet","options":{}},"#,
            r#""schemaString":"{\"type\":\"struct\",\"fields\":["#,
            r#"{\"name\":\"archer\",\"type\":\"string\",\"nullable\":false,\"metadata\":{}},"#,
            r#"{\"name\":\"year\",\"type\":\"short\",\"nullable\":true,\"metadata\":{}}]}","#,
            r#""partitionColumns":["year"],"createdTime":1700000000000,"configuration":{}}}"#
        ),
        r#"{"protocol":{"minReaderVersion":1,"minWriterVersion":2,"readerFeatures":null,"writerFeatures":null}}"#,
        concat!(
            r#"{"add":{"path":"year=1992/part-0.parquet","partitionValues":{"year":"1992"},"#,
            r#""size":100,"modificationTime":1700000000000,"dataChange":true,"tags":{}}}"#
        ),
    ]
    .join("\n");

    assert_eq!(text, expected);
}

#[test]
fn decoded_lines_have_action_keys() {
    let text = generate_append_commit(&archer_schema(), &archer_request()).unwrap();
    let lines = decode_lines(&text);

    assert_eq!(lines.len(), 2 + archer_request().files.len());
    assert!(lines[0].get("metaData").is_some());
    assert!(lines[1].get("protocol").is_some());
    assert!(lines[2..].iter().all(|l| l.get("add").is_some()));
}

#[test]
fn unpartitioned_commit_uses_empty_collections() {
    let request = AppendRequest::single_file(
        "t",
        vec![],
        TIME,
        1,
        2,
        DataFile {
            path: "part-0.parquet".into(),
            partition_values: BTreeMap::new(),
            size: 1,
            modification_time: TIME,
        },
    );

    let lines = decode_lines(&generate_append_commit(&archer_schema(), &request).unwrap());

    assert_eq!(lines[0]["metaData"]["partitionColumns"], serde_json::json!([]));
    assert_eq!(lines[2]["add"]["partitionValues"], serde_json::json!({}));
}

#[test]
fn multi_file_commit_keeps_supplied_order() {
    let file = |n: u32| DataFile {
        path: format!("year=1992/part-{n}.parquet"),
        partition_values: BTreeMap::from([("year".into(), "1992".into())]),
        size: i64::from(n) * 10,
        modification_time: TIME,
    };
    let mut request = archer_request();
    request.files = vec![file(2), file(0), file(1)];

    let text = generate_append_commit(&archer_schema(), &request).unwrap();
    let lines = decode_lines(&text);

    assert_eq!(lines.len(), 5);
    let paths: Vec<_> = lines[2..]
        .iter()
        .map(|l| l["add"]["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        paths,
        [
            "year=1992/part-2.parquet",
            "year=1992/part-0.parquet",
            "year=1992/part-1.parquet"
        ]
    );
}

#[test]
fn identical_inputs_produce_identical_bytes() {
    let first = generate_append_notification(&archer_schema(), &archer_request(), destination())
        .unwrap();
    let second = generate_append_notification(&archer_schema(), &archer_request(), destination())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn envelope_base64_round_trips_to_commit_text() {
    let commit = generate_append_commit(&archer_schema(), &archer_request()).unwrap();
    let envelope =
        generate_append_notification(&archer_schema(), &archer_request(), destination()).unwrap();

    let value: Value = serde_json::from_str(&envelope).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 2);

    let notification: TransactionNotification = serde_json::from_str(&envelope).unwrap();
    assert_eq!(notification.commit_text().unwrap(), commit);
}

#[test]
fn low_level_building_blocks_match_pipeline_output() {
    let schema_string = encode_schema(&archer_schema()).unwrap();
    let metadata = build_metadata("abc-123", schema_string, ["year"], TIME);
    let protocol = build_protocol(1, 2);
    let add = build_add("year=1992/part-0.parquet", [("year", "1992")], 100, TIME);

    let commit = Commit::new(metadata.clone(), protocol.clone(), vec![add.clone()]).unwrap();
    let direct = serialize_commit(&metadata, &protocol, &[add]).unwrap();

    assert_eq!(commit.to_log_text().unwrap(), direct);
    assert_eq!(
        direct,
        generate_append_commit(&archer_schema(), &archer_request()).unwrap()
    );
}

#[test]
fn commit_flows_to_log_store_and_sink() {
    let commit = generate_append_commit(&archer_schema(), &archer_request()).unwrap();

    let mut store = InMemoryLogStore::new();
    store.append(0, &commit).unwrap();
    assert_eq!(store.entry(0), Some(commit.as_str()));

    let notification = TransactionNotification::new(&commit, destination());
    let mut sink = InMemorySink::new();
    sink.deliver(TransportMessage::from_notification(&notification).unwrap())
        .unwrap();

    assert_eq!(sink.delivered().len(), 1);
    assert_eq!(
        sink.delivered()[0].message_type,
        "DeltaLakeTransactionNotification"
    );
}
