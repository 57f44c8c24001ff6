use std::fs;

use exset_model::{
    Annotation, Column, ColumnValues, Dataset, ExampleSet, ExchangeError, SemanticType,
};
use exset_table::{
    DictionaryPlacement, TableCodec, TableLayout, read_table_file, write_table_file,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn roundtrip(set: &ExampleSet) -> ExampleSet {
    let codec = TableCodec::new();
    let mut bytes = Vec::new();
    codec.write(set, &mut bytes).expect("write");
    codec.read(&bytes[..]).expect("read")
}

fn semantic_type(set: &ExampleSet, column: &str) -> Option<SemanticType> {
    set.column_metadata(column).map(|meta| meta.semantic_type)
}

#[test]
fn binominal_positive_index_survives_roundtrip() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::utf8(
            "churn",
            [Some("yes"), Some("no"), None, Some("yes")],
        )])
        .expect("dataset"),
    )
    .with_annotation("churn", Annotation::new(SemanticType::Binominal, "label"));

    let codec = TableCodec::new();
    let mut bytes = Vec::new();
    codec.write(&set, &mut bytes).expect("write");

    let layout = TableLayout::read(&bytes[..]).expect("layout");
    let churn = layout.column("churn").expect("churn layout");
    assert_eq!(churn.positive_index, Some(2));

    let back = codec.read(&bytes[..]).expect("read");
    assert_eq!(back.data, set.data);
    assert_eq!(semantic_type(&back, "churn"), Some(SemanticType::Binominal));
    assert_eq!(
        back.column_metadata("churn").map(|meta| meta.role.as_str().to_string()),
        Some("label".to_string())
    );

    // writing the decoded set again keeps the same positive class
    let mut again = Vec::new();
    codec.write(&back, &mut again).expect("rewrite");
    let relayout = TableLayout::read(&again[..]).expect("layout");
    assert_eq!(relayout.column("churn").expect("churn").positive_index, Some(2));
}

#[test]
fn binominal_with_three_values_is_rejected() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::utf8("c", [Some("a"), Some("b"), Some("c")])])
            .expect("dataset"),
    )
    .with_annotation("c", Annotation::typed(SemanticType::Binominal));
    let mut bytes = Vec::new();
    let err = TableCodec::new().write(&set, &mut bytes).expect_err("too many values");
    assert!(matches!(err, ExchangeError::TooManyValues { distinct: 3, .. }));
    assert!(bytes.is_empty());
}

#[test]
fn literal_null_string_is_not_missing() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::utf8(
            "s",
            [Some("NULL"), None, Some("x"), Some("y")],
        )])
        .expect("dataset"),
    );
    let back = roundtrip(&set);
    assert_eq!(back.data, set.data);
}

#[test]
fn large_dictionary_is_referenced() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::utf8(
            "city",
            [Some("Berlin"), Some("Dortmund"), Some("Porto"), None],
        )])
        .expect("dataset"),
    );
    let codec = TableCodec::new();
    let root = codec.encode(&set).expect("encode");
    let layout = TableLayout::from_group(1, &root);
    let dictionary = layout.columns[0].dictionary.clone().expect("dictionary");
    assert_eq!(dictionary.placement, DictionaryPlacement::Referenced);
    assert_eq!(dictionary.entry.as_deref(), Some("/d0"));
    assert_eq!(dictionary.distinct, 3);

    let back = codec.decode(&root).expect("decode");
    assert_eq!(back.data, set.data);
    assert_eq!(semantic_type(&back, "city"), Some(SemanticType::Polynominal));
}

#[test]
fn dates_keep_nanoseconds_and_missing() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![
            Column::timestamp(
                "when",
                [Some(1_600_000_000_123_456_789), None, Some(-86_400_000_000_001)],
            ),
            Column::timestamp("clock", [Some(3_723_000_000_007), None, Some(0)]),
            Column::timestamp("day", [Some(0), Some(86_400_000_000_000), None]),
        ])
        .expect("dataset"),
    )
    .with_annotation("clock", Annotation::typed(SemanticType::Time))
    .with_annotation("day", Annotation::typed(SemanticType::Date));

    let back = roundtrip(&set);
    assert_eq!(back.data, set.data);
    assert_eq!(semantic_type(&back, "when"), Some(SemanticType::DateTime));
    assert_eq!(semantic_type(&back, "clock"), Some(SemanticType::Time));
    assert_eq!(semantic_type(&back, "day"), Some(SemanticType::Date));
}

#[test]
fn integer_with_missing_values_reads_as_real() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::int64("n", [Some(1), None, Some(3)])])
            .expect("dataset"),
    );
    let back = roundtrip(&set);
    assert_eq!(
        back.data.columns()[0].values,
        ColumnValues::Float64(vec![Some(1.0), None, Some(3.0)])
    );
    assert_eq!(semantic_type(&back, "n"), Some(SemanticType::Real));
}

#[test]
fn numeric_names_are_kept() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::int64("123", [Some(7)])]).expect("dataset"),
    )
    .with_annotation("123", Annotation::with_role("id"));
    let back = roundtrip(&set);
    assert_eq!(back.data.column_names(), vec!["123"]);
    assert_eq!(
        back.column_metadata("123").map(|meta| meta.role.as_str().to_string()),
        Some("id".to_string())
    );
}

#[test]
fn free_form_roles_roundtrip() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![
            Column::float64("p", [Some(0.25)]),
            Column::float64("m", [Some(1.0)]),
        ])
        .expect("dataset"),
    )
    .with_annotation("p", Annotation::with_role("confidence_yes"))
    .with_annotation("m", Annotation::with_role("source"));
    let back = roundtrip(&set);
    let role = |name: &str| back.column_metadata(name).map(|meta| meta.role.as_str().to_string());
    assert_eq!(role("p").as_deref(), Some("confidence_yes"));
    assert_eq!(role("m").as_deref(), Some("source"));
}

#[test]
fn corrupt_bytes_are_a_storage_error() {
    let err = TableCodec::new()
        .read(&b"definitely not a table"[..])
        .expect_err("corrupt");
    match err {
        ExchangeError::Storage { message, .. } => {
            assert_eq!(message, "not a valid container file format");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_roundtrip_adds_extension() {
    let dir = tempdir().expect("tempdir");
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::float64("x", [Some(1.5), None])]).expect("dataset"),
    );
    let written = write_table_file(&set, dir.path().join("data")).expect("write");
    assert_eq!(written, dir.path().join("data.rmhdf5table"));
    assert!(!dir.path().join("data.rmhdf5table.tmp").exists());

    let back = read_table_file(dir.path().join("data")).expect("read");
    assert_eq!(back.data, set.data);
}

#[test]
fn missing_parent_directory_is_a_storage_error() {
    let dir = tempdir().expect("tempdir");
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::int64("x", [Some(1)])]).expect("dataset"),
    );
    let err = write_table_file(&set, dir.path().join("missing").join("data"))
        .expect_err("missing directory");
    assert!(matches!(err, ExchangeError::Storage { .. }));
}

#[test]
fn corrupt_file_reports_its_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.rmhdf5table");
    fs::write(&path, b"garbage").expect("write");
    match read_table_file(&path).expect_err("corrupt") {
        ExchangeError::Storage { path: reported, .. } => {
            assert_eq!(reported.as_deref(), Some(path.as_path()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn row_strategy() -> impl Strategy<Value = (i64, f64, String, i64)> {
    (
        any::<i64>(),
        any::<f64>().prop_filter("finite", |value| value.is_finite()),
        ".*",
        // seconds * 10^9 must not overflow on the way back
        -9_000_000_000_000_000_000i64..9_000_000_000_000_000_000,
    )
}

proptest! {
    #[test]
    fn table_roundtrip_is_identity(rows in prop::collection::vec(row_strategy(), 0..20)) {
        let data = Dataset::with_columns(vec![
            Column::int64("i", rows.iter().map(|row| Some(row.0))),
            Column::float64("r", rows.iter().map(|row| Some(row.1))),
            Column::utf8("p", rows.iter().map(|row| Some(row.2.clone()))),
            Column::timestamp("d", rows.iter().map(|row| Some(row.3))),
        ])
        .expect("dataset");
        let set = ExampleSet::new(data)
            .with_annotation("p", Annotation::new(SemanticType::Polynominal, "label"));

        let back = roundtrip(&set);
        prop_assert_eq!(&back.data, &set.data);
        let types: Vec<_> = ["i", "r", "p", "d"]
            .iter()
            .map(|name| semantic_type(&back, name))
            .collect();
        prop_assert_eq!(
            types,
            vec![
                Some(SemanticType::Integer),
                Some(SemanticType::Real),
                Some(SemanticType::Polynominal),
                Some(SemanticType::DateTime),
            ]
        );
    }
}
