use pagetap::{decode_body, export_filename, to_jsonl};
use serde_json::json;

#[test]
fn jsonl_round_trips_through_the_decoder() {
    let records = vec![
        json!({"id": "a", "n": 1}),
        json!({"id": "b", "nested": {"x": [1, 2]}}),
        json!({"id": "c"}),
    ];
    let encoded = to_jsonl(&records).unwrap();
    assert_eq!(encoded.lines().count(), 3);
    assert!(!encoded.ends_with('\n'));

    let decoded = decode_body(&encoded).unwrap();
    assert_eq!(decoded, json!(records));
}

#[test]
fn a_single_record_is_one_self_contained_line() {
    let records = vec![json!({"id": "only"})];
    let encoded = to_jsonl(&records).unwrap();
    assert_eq!(encoded.lines().count(), 1);
    assert_eq!(decode_body(&encoded), Some(json!({"id": "only"})));
}

#[test]
fn empty_input_encodes_to_an_empty_string() {
    assert_eq!(to_jsonl(&[]).unwrap(), "");
}

#[test]
fn filename_carries_prefix_stamp_and_extension() {
    let name = export_filename("host-logs", "jsonl");
    let re = regex::Regex::new(r"^host-logs-\d{8}-\d{6}\.jsonl$").unwrap();
    assert!(re.is_match(&name), "unexpected filename: {name}");
}
