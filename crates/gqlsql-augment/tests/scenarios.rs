//! End-to-end augmentation coverage: runs the full driver (spec §4.6) over a small
//! directive-annotated schema and asserts on the synthesised filter/order/aggregate
//! surface in the written-out augmented schema text, the same artifact
//! `gqlsql_translate` consumes downstream. Placed in `tests/` rather than beside
//! `driver.rs`'s own unit test since this fixes the crate's on-disk output contract end
//! to end, not just one pass's internal effect on an in-memory `Schema`.

use gqlsql_augment::generate;

fn write_source(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn full_pipeline_synthesises_filters_ordering_and_aggregation() {
    let dir = std::env::temp_dir().join(format!("gqlsql-augment-scenarios-{:?}", std::thread::current().id()));
    std::fs::create_dir_all(&dir).unwrap();

    write_source(
        &dir,
        "schema.graphql",
        r#"
        type Query {
            adapterDevices: [AdapterDevice!]!
        }

        type AdapterDevice @generateInputs(where: "adapter_device_bool_exp", orderBy: "adapter_device_order_by") {
            id: ID!
            hostname: String!
            fetchCycle: Int!
            interfaces: [NetworkInterface!]! @relation(name: "network_interfaces", fkNames: ["id", "fetchCycle"], relationFkNames: ["deviceId", "fetchCycle"], relType: ONE_TO_MANY)
        }

        type NetworkInterface @generateInputs(where: "network_interface_bool_exp", orderBy: "network_interface_order_by") {
            macAddr: String!
        }

        interface Aggregate {
            sum: Int
            avg: Int
            min: Int
            max: Int
            count: Int
            groupBy: Int
        }
        "#,
    );

    let output = dir.join("augmented.graphql");
    generate(&dir, &output).expect("augmentation succeeds");
    let text = std::fs::read_to_string(&output).unwrap();

    assert!(text.starts_with("# Code generated"));

    // Filters augmenter (spec §4.3): bool-exp input, comparator fields, AND/OR/NOT.
    assert!(text.contains("input adapter_device_bool_exp"));
    assert!(text.contains("hostname: StringComparator"));
    assert!(text.contains("OR: [adapter_device_bool_exp!]"));
    assert!(text.contains("NOT: adapter_device_bool_exp"));

    // Ordering augmenter (spec §4.4): order-by enum with ASC/DESC values.
    assert!(text.contains("enum adapter_device_order_by"));
    assert!(text.contains("hostname_ASC"));
    assert!(text.contains("hostname_DESC"));

    // Pagination augmenter (spec §4.2): limit/offset on every composite list field.
    assert!(text.contains("limit: Int = 100"));
    assert!(text.contains("offset: Int = 0"));

    // Root field gets `where`/`orderBy` arguments attached by the field passes, in
    // Pagination -> Filters -> Ordering argument order (spec §4.6's pass ordering).
    assert!(text.contains("adapterDevices(limit: Int = 100, offset: Int = 0, where: adapter_device_bool_exp, orderBy: [adapter_device_order_by!]): [AdapterDevice!]!"));

    // Aggregation augmenter (spec §4.5): sibling field plus its aggregate object type.
    assert!(text.contains("interfaces_aggregate"));
    assert!(text.contains("type interfacesAggregate"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_generate_inputs_argument_is_a_fatal_schema_error() {
    let dir = std::env::temp_dir().join(format!("gqlsql-augment-scenarios-err-{:?}", std::thread::current().id()));
    std::fs::create_dir_all(&dir).unwrap();
    write_source(
        &dir,
        "schema.graphql",
        r#"
        type Query { adapterDevices: [AdapterDevice!]! }
        type AdapterDevice @generateInputs(where: "adapter_device_bool_exp") {
            id: ID!
        }
        "#,
    );
    let output = dir.join("augmented.graphql");
    let result = generate(&dir, &output);
    assert!(result.is_err());
    assert!(!output.exists(), "no partial output is written on a fatal augmenter error");
    std::fs::remove_dir_all(&dir).ok();
}
