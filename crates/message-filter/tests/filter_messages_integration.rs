//! Integration tests for filtering record collections through the public API.
//!
//! Records and filters are built from JSON fixtures, the way callers receive them.

use message_filter_rs::filter::{EvaluatorOptions, FilterParser};
use message_filter_rs::{evaluate, filter_messages, Filter, FilterEvaluator, Record};
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

fn inbox() -> Vec<Record> {
    let messages = json!([
        {"id": "m1", "from": "anna@example.com", "subject": "Quarterly report", "priority": 2, "read": false, "sentAt": "2023-03-01T09:30:00Z"},
        {"id": "m2", "from": "bob@example.org", "subject": "Lunch?", "priority": 0, "read": true, "sentAt": "2023-06-15"},
        {"id": "m3", "from": "carol@example.com", "subject": "Re: Quarterly report", "priority": 5, "read": true, "sentAt": "2023-07-20T18:00:00+02:00"},
        {"id": "m4", "from": "", "subject": "No sender", "read": false, "sentAt": "sometime"},
        {"id": "m5", "from": "dave@example.com", "subject": "quarterly numbers", "priority": 3, "read": false}
    ]);
    serde_json::from_value(messages).expect("fixture records should deserialize")
}

fn ids(records: &[&Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.text_field("id").present())
        .map(str::to_string)
        .collect()
}

fn parse(filter: serde_json::Value) -> Filter {
    FilterParser::parse(&filter.to_string()).expect("fixture filter should parse")
}

// ============================================================================
// Collection Filtering
// ============================================================================

#[test]
fn test_unread_from_example_com() {
    let records = inbox();
    let filter = parse(json!({
        "type": "and",
        "filters": [
            {"type": "boolean", "field": "read", "operation": "eq", "value": false},
            {"type": "string", "field": "from", "operation": "endsWith", "value": "@example.com"}
        ]
    }));

    assert_eq!(ids(&filter_messages(&records, &filter)), vec!["m1", "m5"]);
}

#[test]
fn test_subject_contains_is_case_sensitive() {
    let records = inbox();
    let filter = parse(json!(
        {"type": "string", "field": "subject", "operation": "contains", "value": "Quarterly"}
    ));

    assert_eq!(ids(&filter_messages(&records, &filter)), vec!["m1", "m3"]);
}

#[test]
fn test_priority_zero_and_missing_are_excluded() {
    let records = inbox();
    let filter = parse(json!(
        {"type": "number", "field": "priority", "operation": "lte", "value": 3}
    ));

    // m2 has priority 0 and m4 has none; neither is kept
    assert_eq!(ids(&filter_messages(&records, &filter)), vec!["m1", "m5"]);
}

#[test]
fn test_sent_between_dates() {
    let records = inbox();
    let filter = parse(json!({
        "type": "and",
        "filters": [
            {"type": "date", "field": "sentAt", "operation": "after", "value": "2023-06-01"},
            {"type": "date", "field": "sentAt", "operation": "before", "value": "2023-07-20T17:00:00Z"}
        ]
    }));

    // m3 is 16:00Z, m4 is unparseable, m5 has no date
    assert_eq!(ids(&filter_messages(&records, &filter)), vec!["m2", "m3"]);
}

#[test]
fn test_empty_and_keeps_everything_in_order() {
    let records = inbox();
    let filter = parse(json!({"type": "and", "filters": []}));

    assert_eq!(
        ids(&filter_messages(&records, &filter)),
        vec!["m1", "m2", "m3", "m4", "m5"]
    );
}

#[test]
fn test_empty_or_keeps_nothing() {
    let records = inbox();
    let filter = parse(json!({"type": "or", "filters": []}));

    assert!(filter_messages(&records, &filter).is_empty());
}

#[test]
fn test_empty_sender_is_no_value() {
    let records = inbox();
    let filter = parse(json!(
        {"type": "string", "field": "from", "operation": "startsWith", "value": ""}
    ));

    // Every non-empty sender starts with ""; m4's empty sender does not count
    assert_eq!(
        ids(&filter_messages(&records, &filter)),
        vec!["m1", "m2", "m3", "m5"]
    );
}

#[test]
fn test_output_is_subsequence_of_input() {
    let records = inbox();
    let filter = parse(json!({
        "type": "or",
        "filters": [
            {"type": "boolean", "field": "read", "operation": "eq", "value": true},
            {"type": "number", "field": "priority", "operation": "gt", "value": 2}
        ]
    }));

    let matched = filter_messages(&records, &filter);
    assert!(matched.len() <= records.len());

    let mut last_index = None;
    for record in matched {
        let index = records
            .iter()
            .position(|r| std::ptr::eq(r, record))
            .expect("matched record comes from the input");
        if let Some(last) = last_index {
            assert!(index > last);
        }
        last_index = Some(index);
    }
}

#[test]
fn test_filter_does_not_mutate_inputs() {
    let records = inbox();
    let snapshot = records.clone();
    let filter = parse(json!(
        {"type": "date", "field": "sentAt", "operation": "eq", "value": "2023-06-15"}
    ));
    let filter_snapshot = filter.clone();

    let first = ids(&filter_messages(&records, &filter));
    let second = ids(&filter_messages(&records, &filter));

    assert_eq!(first, vec!["m2"]);
    assert_eq!(first, second);
    assert_eq!(records, snapshot);
    assert_eq!(filter, filter_snapshot);
}

// ============================================================================
// Malformed Filters
// ============================================================================

#[test]
fn test_lenient_filter_with_unknown_node_fails_closed() {
    let records = inbox();
    let filter = FilterParser::parse_lenient(
        &json!({
            "type": "or",
            "filters": [
                {"type": "regex", "field": "subject", "pattern": "^Re:"},
                {"type": "string", "field": "id", "operation": "eq", "value": "m2"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    assert_eq!(ids(&filter_messages(&records, &filter)), vec!["m2"]);
}

#[test]
fn test_strict_parse_rejects_unknown_node() {
    let result = FilterParser::parse(
        &json!({"type": "and", "filters": [{"type": "regex"}]}).to_string(),
    );
    assert!(result.is_err());
}

// ============================================================================
// Evaluator Configuration
// ============================================================================

#[test]
fn test_options_from_json_config() {
    let options: EvaluatorOptions =
        serde_json::from_value(json!({"max_depth": 1, "naive_utc_offset_minutes": 0})).unwrap();
    let filter = parse(json!({
        "type": "and",
        "filters": [{"type": "boolean", "field": "read", "operation": "eq", "value": true}]
    }));

    let records = inbox();
    let evaluator = FilterEvaluator::with_options(&filter, options);
    assert!(evaluator.filter_records(&records).is_empty());

    assert_eq!(ids(&FilterEvaluator::new(&filter).filter_records(&records)), vec!["m2", "m3"]);
}

#[test]
fn test_evaluate_single_record() {
    let record = Record::from_json(r#"{"createdAt": "2023-06-15"}"#).unwrap();
    let filter = parse(json!(
        {"type": "date", "field": "createdAt", "operation": "after", "value": "2023-01-01"}
    ));
    assert!(evaluate(&record, &filter));
}

#[test]
fn test_null_field_is_no_value() {
    let record = Record::from_json(r#"{"name": "Anna", "read": null, "priority": null}"#).unwrap();

    let read = parse(json!({"type": "boolean", "field": "read", "operation": "eq", "value": false}));
    let priority = parse(json!({"type": "number", "field": "priority", "operation": "lt", "value": 5}));
    let name = parse(json!({"type": "string", "field": "name", "operation": "eq", "value": "Anna"}));

    assert!(!evaluate(&record, &read));
    assert!(!evaluate(&record, &priority));
    assert!(evaluate(&record, &name));
}
