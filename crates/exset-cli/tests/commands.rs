use std::fs;

use exset_cli::commands::{
    Target, TextPair, Written, load_annotations, read_plain_csv, read_text_pair, run_convert,
    run_decode, run_encode, run_inspect,
};
use exset_model::{Column, ColumnValues, Dataset, ExampleSet, SemanticType};
use exset_table::{DictionaryPlacement, TableCodec, read_table_file};
use exset_text::{TextCodec, TextCodecOptions};
use tempfile::tempdir;

const CSV: &str = "id,score,churn\n1,0.5,yes\n2,1.5,no\n3,,yes\n";
const ANNOTATIONS: &str = r#"{"churn": ["binominal", "label"], "id": [null, "id"]}"#;

#[test]
fn plain_csv_columns_get_value_kinds() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("churn.csv");
    fs::write(&input, CSV).expect("write csv");

    let data = read_plain_csv(&input).expect("read csv");
    assert_eq!(data.column_names(), vec!["id", "score", "churn"]);
    let columns = data.columns();
    assert_eq!(columns[0].values, ColumnValues::Int64(vec![Some(1), Some(2), Some(3)]));
    assert_eq!(columns[1].values, ColumnValues::Float64(vec![Some(0.5), Some(1.5), None]));
    assert_eq!(
        columns[2].values,
        ColumnValues::Utf8(vec![Some("yes".into()), Some("no".into()), Some("yes".into())])
    );
}

#[test]
fn ragged_csv_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("ragged.csv");
    fs::write(&input, "a,b\n1,2\n3\n").expect("write csv");
    assert!(read_plain_csv(&input).is_err());
}

#[test]
fn convert_encode_decode_cycle() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("churn.csv");
    let annotations = dir.path().join("churn.json");
    fs::write(&input, CSV).expect("write csv");
    fs::write(&annotations, ANNOTATIONS).expect("write annotations");

    let written = run_convert(
        &input,
        &dir.path().join("churn"),
        Target::Table,
        Some(&annotations),
        TextCodecOptions::new(),
    )
    .expect("convert");
    let Written::Table(table) = written else {
        panic!("expected a table file");
    };
    assert_eq!(table, dir.path().join("churn.rmhdf5table"));

    let layout = run_inspect(&table).expect("inspect");
    assert_eq!(layout.rows, Some(3));
    let churn = layout.column("churn").expect("churn column");
    assert_eq!(churn.positive_index, Some(2));
    assert_eq!(
        churn.dictionary.as_ref().map(|dict| dict.placement),
        Some(DictionaryPlacement::Inline)
    );

    let (pair, summary) =
        run_decode(&table, &dir.path().join("decoded"), TextCodecOptions::new()).expect("decode");
    assert_eq!(summary.rows, 3);
    assert!(pair.csv.exists());
    assert!(pair.metadata.exists());

    let reencoded = run_encode(&dir.path().join("decoded"), &dir.path().join("again"))
        .expect("encode");
    let first = read_table_file(&table).expect("read first");
    let second = read_table_file(&reencoded).expect("read second");
    assert_eq!(first.data, second.data);
    assert_eq!(
        second.column_metadata("churn").map(|meta| meta.semantic_type),
        Some(SemanticType::Binominal)
    );
    assert_eq!(
        second.column_metadata("id").map(|meta| meta.role.as_str().to_string()),
        Some("id".to_string())
    );
}

#[test]
fn convert_to_text_pair() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("churn.csv");
    fs::write(&input, CSV).expect("write csv");

    let written = run_convert(
        &input,
        &dir.path().join("out"),
        Target::Text,
        None,
        TextCodecOptions::new(),
    )
    .expect("convert");
    let Written::Text(pair, summary) = written else {
        panic!("expected a text pair");
    };
    assert_eq!(pair, TextPair::from_base(&dir.path().join("out")));
    assert_eq!(summary.columns.len(), 3);

    let set = read_text_pair(&pair).expect("read pair");
    assert_eq!(set.data.num_rows(), 3);
    assert_eq!(set.data.column_names(), vec!["id", "score", "churn"]);
}

#[test]
fn annotations_must_be_an_object() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    fs::write(&path, "[1, 2]").expect("write");
    assert!(load_annotations(&path).is_err());
}

#[test]
fn missing_text_pair_names_the_file() {
    let dir = tempdir().expect("tempdir");
    let err = run_encode(&dir.path().join("nothing"), &dir.path().join("out"))
        .expect_err("missing input");
    assert!(format!("{err:#}").contains("nothing.csv-encoded"));
}

#[test]
fn text_hop_truncates_date_time_to_microseconds() {
    let set = ExampleSet::new(
        Dataset::with_columns(vec![Column::timestamp(
            "when",
            [Some(1_500_000_000_123_456_789), None],
        )])
        .expect("dataset"),
    );

    let table = TableCodec::new();
    let mut bytes = Vec::new();
    table.write(&set, &mut bytes).expect("table write");
    let from_table = table.read(&bytes[..]).expect("table read");
    assert_eq!(
        from_table.data.columns()[0].values,
        ColumnValues::Timestamp(vec![Some(1_500_000_000_123_456_789), None])
    );

    let text = TextCodec::default();
    let (mut csv, mut pmd) = (Vec::new(), Vec::new());
    text.write(&from_table, &mut csv, &mut pmd).expect("text write");
    let from_text = text.read(&csv[..], &pmd[..]).expect("text read");

    let mut again = Vec::new();
    table.write(&from_text, &mut again).expect("table rewrite");
    let back = table.read(&again[..]).expect("table reread");
    // the text format carries whole microseconds only
    assert_eq!(
        back.data.columns()[0].values,
        ColumnValues::Timestamp(vec![Some(1_500_000_000_123_456_000), None])
    );
    assert_eq!(
        back.column_metadata("when").map(|meta| meta.semantic_type),
        Some(SemanticType::DateTime)
    );
}
