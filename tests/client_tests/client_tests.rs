//! End-to-end tests for Client over the in-memory transport
//!
//! These tests verify:
//! - Write-then-read with inferred writes and byte/string reads
//! - Column counting, column deletion and row deletion
//! - Name ranges, reversal and empty inverted ranges
//! - Supercolumn insert, fetch and sub-column deletion
//! - Lifecycle: keyspace switching and disconnect

use std::collections::BTreeMap;

use colkv::options::OptionValue;
use colkv::request::{ReadRequest, SliceRange};
use colkv::{
    fields, super_field, CallOptions, Client, ClientConfig, ColError, Columns, MemoryTransport,
    Transport, Value,
};

// =============================================================================
// Helper Functions
// =============================================================================

const CF: &str = "Statuses";
const SUPER_CF: &str = "StatusRelationships";

fn create_client() -> Client<MemoryTransport> {
    let config = ClientConfig::builder()
        .cluster_name("Test Cluster")
        .keyspace("Twitter")
        .build();
    Client::connect(MemoryTransport::new(), &config).unwrap()
}

fn string_codecs() -> CallOptions {
    CallOptions::new()
        .n_serializer("string")
        .v_serializer("string")
        .s_serializer("string")
}

fn names(columns: &Columns) -> Vec<Value> {
    columns.keys().cloned().collect()
}

// =============================================================================
// Write-then-Read Tests
// =============================================================================

#[test]
fn test_reads_default_to_bytes() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    let rows = client.get_rows(CF, &["k".into()], &CallOptions::new()).unwrap();

    let expected = BTreeMap::from([(
        Value::from("k"),
        Columns::from([(Value::from(b"a"), Value::from(b"b"))]),
    )]);
    assert_eq!(rows, expected);
}

#[test]
fn test_string_codecs_on_read() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    let rows = client.get_rows(CF, &["k".into()], &string_codecs()).unwrap();

    assert_eq!(
        rows[&Value::from("k")],
        Columns::from([(Value::from("a"), Value::from("b"))])
    );
}

#[test]
fn test_inferred_long_names_and_values() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([(1i64, 10i64), (2i64, 20i64)]), &CallOptions::new())
        .unwrap();

    let options = CallOptions::new().n_serializer("long").v_serializer("long");
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();

    let columns = &rows[&Value::from("k")];
    assert_eq!(columns[&Value::Long(1)], Value::Long(10));
    assert_eq!(columns[&Value::Long(2)], Value::Long(20));
}

#[test]
fn test_missing_rows_are_absent() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    let rows = client
        .get_rows(CF, &["k".into(), "nobody".into()], &string_codecs())
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows.contains_key(&Value::from("nobody")));
}

#[test]
fn test_empty_key_list() {
    let client = create_client();
    assert!(client.get_rows(CF, &[], &CallOptions::new()).unwrap().is_empty());
    assert!(client
        .get_super_rows(SUPER_CF, &[], &[], &CallOptions::new())
        .unwrap()
        .is_empty());
}

#[test]
fn test_later_write_overwrites() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "old")]), &CallOptions::new())
        .unwrap();
    client
        .put_row(CF, "k", &fields([("a", "new")]), &CallOptions::new())
        .unwrap();

    let columns = client
        .get_columns(CF, "k", &["a".into()], &string_codecs())
        .unwrap();
    assert_eq!(columns[&Value::from("a")], Value::from("new"));
}

// =============================================================================
// Point Lookup Tests
// =============================================================================

#[test]
fn test_get_single_column() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b"), ("c", "d")]), &CallOptions::new())
        .unwrap();

    let columns = client
        .get_columns(CF, "k", &["c".into()], &string_codecs())
        .unwrap();
    assert_eq!(columns, Columns::from([(Value::from("c"), Value::from("d"))]));

    let missing = client
        .get_columns(CF, "k", &["zz".into()], &string_codecs())
        .unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_multi_name_fetch_is_unsupported() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b"), ("c", "d")]), &CallOptions::new())
        .unwrap();

    let result = client.get_columns(CF, "k", &["a".into(), "c".into()], &string_codecs());

    match result {
        Err(ColError::Unsupported {
            operation,
            column_family,
            ..
        }) => {
            assert_eq!(operation, "get_columns");
            assert_eq!(column_family, CF);
        }
        other => panic!("Expected Unsupported, got {:?}", other),
    }
}

#[test]
fn test_no_names_returns_empty() {
    let client = create_client();
    let columns = client.get_columns(CF, "k", &[], &CallOptions::new()).unwrap();
    assert!(columns.is_empty());
}

// =============================================================================
// Count and Deletion Tests
// =============================================================================

#[test]
fn test_count_columns() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "1"), ("b", "2")]), &CallOptions::new())
        .unwrap();

    assert_eq!(client.count_columns(CF, "k", &CallOptions::new()).unwrap(), 2);
    assert_eq!(client.count_columns(CF, "nobody", &CallOptions::new()).unwrap(), 0);
}

#[test]
fn test_count_honours_range_and_cap() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "1"), ("b", "2"), ("c", "3")]), &CallOptions::new())
        .unwrap();

    let ranged = string_codecs().start("b").finish("c");
    assert_eq!(client.count_columns(CF, "k", &ranged).unwrap(), 2);

    let capped = CallOptions::new().count(1);
    assert_eq!(client.count_columns(CF, "k", &capped).unwrap(), 1);
}

#[test]
fn test_delete_column_keeps_row() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    client
        .delete_columns(CF, "k", &["a".into()], &CallOptions::new())
        .unwrap();

    let rows = client.get_rows(CF, &["k".into()], &string_codecs()).unwrap();
    let expected = BTreeMap::from([(Value::from("k"), Columns::new())]);
    assert_eq!(rows, expected);
}

#[test]
fn test_delete_rows() {
    let client = create_client();
    client
        .put_row(CF, "k1", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();
    client
        .put_row(CF, "k2", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    client.delete_rows(CF, &["k1".into()], &CallOptions::new()).unwrap();

    let rows = client
        .get_rows(CF, &["k1".into(), "k2".into()], &string_codecs())
        .unwrap();
    assert_eq!(rows.keys().cloned().collect::<Vec<_>>(), vec![Value::from("k2")]);
}

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn test_long_name_range() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([(1i64, "a"), (2i64, "b"), (3i64, "c")]), &CallOptions::new())
        .unwrap();

    let options = CallOptions::new()
        .n_serializer("long")
        .v_serializer("string")
        .start(2i64)
        .finish(3i64);
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();

    let columns = &rows[&Value::from("k")];
    assert_eq!(names(columns), vec![Value::Long(2), Value::Long(3)]);
}

#[test]
fn test_reversed_range_with_count() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "1"), ("b", "2"), ("c", "3")]), &CallOptions::new())
        .unwrap();

    let options = string_codecs().reversed(true).count(2);
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();

    // the cap keeps the first columns in walking order, c then b
    assert_eq!(
        names(&rows[&Value::from("k")]),
        vec![Value::from("b"), Value::from("c")]
    );
}

#[test]
fn test_inverted_range_is_empty() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "1"), ("b", "2"), ("c", "3")]), &CallOptions::new())
        .unwrap();

    let options = string_codecs().start("c").finish("a");
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();
    assert!(rows[&Value::from("k")].is_empty());

    let keys = client.get_range(CF, "z", "a", &string_codecs()).unwrap();
    assert!(keys.is_empty());
}

#[test]
fn test_finish_bound_is_inclusive() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "1"), ("b", "2"), ("c", "3")]), &CallOptions::new())
        .unwrap();

    let options = string_codecs().start("a").finish("b");
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();
    assert_eq!(
        names(&rows[&Value::from("k")]),
        vec![Value::from("a"), Value::from("b")]
    );

    let keys = client.get_range(CF, "k", "k", &string_codecs()).unwrap();
    assert_eq!(keys.len(), 1);
}

#[test]
fn test_text_bounds_parse_with_name_serializer() {
    let client = create_client();
    client
        .put_row(CF, "k", &fields([(1i64, "a"), (2i64, "b"), (3i64, "c")]), &CallOptions::new())
        .unwrap();

    let options = CallOptions::new()
        .n_serializer("long")
        .v_serializer("string")
        .set("start", OptionValue::Text("2".into()))
        .set("finish", OptionValue::Text("3".into()));
    let rows = client.get_rows(CF, &["k".into()], &options).unwrap();

    assert_eq!(names(&rows[&Value::from("k")]), vec![Value::Long(2), Value::Long(3)]);
}

#[test]
fn test_bound_not_encodable_is_invalid_range() {
    let client = create_client();
    let options = CallOptions::new().n_serializer("long").start("not a long");

    let result = client.get_rows(CF, &["k".into()], &options);
    assert!(matches!(result, Err(ColError::InvalidRange { .. })));
}

#[test]
fn test_get_range_over_keys() {
    let client = create_client();
    for key in ["a", "b", "c", "d"] {
        client
            .put_row(CF, key, &fields([("n", key)]), &CallOptions::new())
            .unwrap();
    }

    let rows = client.get_range(CF, "b", "c", &string_codecs()).unwrap();

    assert_eq!(
        rows.keys().cloned().collect::<Vec<_>>(),
        vec![Value::from("b"), Value::from("c")]
    );
    assert_eq!(rows[&Value::from("c")][&Value::from("n")], Value::from("c"));
}

#[test]
fn test_unknown_serializer() {
    let client = create_client();
    let options = CallOptions::new().v_serializer("timeuuid");

    let result = client.put_row(CF, "k", &fields([("a", "b")]), &options);
    assert!(matches!(result, Err(ColError::UnknownSerializer(_))));
}

// =============================================================================
// Supercolumn Tests
// =============================================================================

fn put_supercolumns(client: &Client<MemoryTransport>) {
    let row = BTreeMap::from([
        (Value::from("SuperCol"), super_field([("k", "v"), ("k2", "v2")])),
        (Value::from("SuperCol2"), super_field([("k", "v"), ("k2", "v2")])),
    ]);
    client.put_row(SUPER_CF, "row", &row, &CallOptions::new()).unwrap();
}

#[test]
fn test_supercolumn_round_trip() {
    let client = create_client();
    put_supercolumns(&client);

    let columns = client
        .get_super_columns(SUPER_CF, "row", "SuperCol", &["k".into()], &string_codecs())
        .unwrap();

    assert_eq!(columns, Columns::from([(Value::from("k"), Value::from("v"))]));
}

#[test]
fn test_get_super_rows_by_name_and_range() {
    let client = create_client();
    put_supercolumns(&client);

    let named = client
        .get_super_rows(SUPER_CF, &["row".into()], &["SuperCol2".into()], &string_codecs())
        .unwrap();
    let supers = &named[&Value::from("row")];
    assert_eq!(supers.len(), 1);
    assert_eq!(supers[0].name, Value::from("SuperCol2"));
    assert_eq!(supers[0].columns.len(), 2);

    let all = client
        .get_super_rows(SUPER_CF, &["row".into()], &[], &string_codecs())
        .unwrap();
    let names: Vec<_> = all[&Value::from("row")].iter().map(|sc| sc.name.clone()).collect();
    assert_eq!(names, vec![Value::from("SuperCol"), Value::from("SuperCol2")]);
}

#[test]
fn test_super_rows_bounded_by_supercolumn_name() {
    let client = create_client();
    put_supercolumns(&client);

    // bounds range over supercolumn names, so only s_serializer has to fit them
    let options = CallOptions::new()
        .s_serializer("string")
        .n_serializer("string")
        .v_serializer("string")
        .start("SuperCol2");
    let rows = client
        .get_super_rows(SUPER_CF, &["row".into()], &[], &options)
        .unwrap();
    let names: Vec<_> = rows[&Value::from("row")].iter().map(|sc| sc.name.clone()).collect();
    assert_eq!(names, vec![Value::from("SuperCol2")]);

    let bytes_names = CallOptions::new().s_serializer("string").start("SuperCol2").finish("SuperCol2");
    let result = client.get_super_rows(SUPER_CF, &["row".into()], &[], &bytes_names);
    let rows = result.unwrap();
    assert_eq!(rows[&Value::from("row")].len(), 1);
    assert_eq!(rows[&Value::from("row")][0].columns.len(), 2);
}

#[test]
fn test_super_range_bound_checked_against_supercolumn_serializer() {
    let client = create_client();
    put_supercolumns(&client);

    let options = CallOptions::new().s_serializer("long").start("SuperCol");
    let result = client.get_super_rows(SUPER_CF, &["row".into()], &[], &options);

    match result {
        Err(ColError::InvalidRange { operation, .. }) => assert_eq!(operation, "get_super_rows"),
        other => panic!("Expected InvalidRange, got {:?}", other),
    }
}

#[test]
fn test_delete_super_columns() {
    let client = create_client();
    put_supercolumns(&client);

    let targets = BTreeMap::from([(
        Value::from("row"),
        BTreeMap::from([
            (Value::from("SuperCol"), vec![Value::from("k2")]),
            (Value::from("SuperCol2"), vec![Value::from("k2")]),
        ]),
    )]);
    client
        .delete_super_columns(SUPER_CF, &targets, &CallOptions::new())
        .unwrap();

    let rows = client
        .get_super_rows(SUPER_CF, &["row".into()], &[], &string_codecs())
        .unwrap();
    for sc in &rows[&Value::from("row")] {
        assert_eq!(names(&sc.columns), vec![Value::from("k")]);
    }
}

#[test]
fn test_super_row_read_as_flat_fails_with_decode_error() {
    let client = create_client();
    put_supercolumns(&client);

    let result = client.get_rows(SUPER_CF, &["row".into()], &string_codecs());
    assert!(matches!(result, Err(ColError::Decode { .. })));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_keyspaces_are_isolated() {
    let mut client = create_client();
    client
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    client.set_keyspace("Other").unwrap();
    assert_eq!(client.keyspace().name(), "Other");
    assert!(client.get_rows(CF, &["k".into()], &CallOptions::new()).unwrap().is_empty());

    client.set_keyspace("Twitter").unwrap();
    assert_eq!(client.get_rows(CF, &["k".into()], &CallOptions::new()).unwrap().len(), 1);
}

#[test]
fn test_shared_store_between_clients() {
    let transport = MemoryTransport::new();
    let config = ClientConfig::builder().keyspace("Twitter").build();
    let writer = Client::connect(transport.clone(), &config).unwrap();
    let reader = Client::connect(transport, &config).unwrap();

    writer
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();

    assert_eq!(reader.count_columns(CF, "k", &CallOptions::new()).unwrap(), 1);
}

#[test]
fn test_disconnect_leaves_other_handles_open() {
    let transport = MemoryTransport::new();
    let config = ClientConfig::builder().keyspace("Twitter").build();
    let client = Client::connect(transport.clone(), &config).unwrap();
    let other = Client::connect(transport, &config).unwrap();

    client.disconnect().unwrap();

    other
        .put_row(CF, "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();
}

#[test]
fn test_stale_handle_fails_with_connection_error() {
    let transport = MemoryTransport::new();
    let cluster = transport.connect("Test Cluster", &[]).unwrap();
    let keyspace = transport.open_keyspace(&cluster, "Twitter").unwrap();
    transport.disconnect(cluster.clone()).unwrap();

    let request = ReadRequest::Count {
        column_family: CF.to_string(),
        key: b"k".to_vec(),
        range: SliceRange {
            start: vec![],
            finish: vec![],
            reversed: false,
            count: u32::MAX,
        },
    };
    assert!(matches!(
        transport.execute_read(&keyspace, &request),
        Err(ColError::Connection(_))
    ));
    assert!(matches!(transport.disconnect(cluster), Err(ColError::Connection(_))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ClientConfig::builder().endpoints(Vec::<String>::new()).build();
    assert!(matches!(
        Client::connect(MemoryTransport::new(), &config),
        Err(ColError::Config(_))
    ));
}
