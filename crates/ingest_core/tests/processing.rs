use ingest_core::{
    process_text, AcceptNonEmpty, BatchSettings, Entry, HexAddressValidator, LineClassifier,
    LineValidator, INVALID_REASON,
};
use pretty_assertions::assert_eq;

fn entries(values: &[&str]) -> Vec<Entry> {
    values.iter().map(|v| Entry::normalize(v).unwrap()).collect()
}

#[test]
fn mixed_case_repeats_become_duplicates() {
    let result = process_text("0xAAA\n0xaaa\n0xBBB\n", &AcceptNonEmpty, &BatchSettings::default());

    assert_eq!(result.valid_entries, entries(&["0xaaa", "0xbbb"]));
    assert_eq!(result.duplicates, entries(&["0xaaa"]));
    assert!(result.invalid_entries.is_empty());
    assert_eq!(result.stats.total_lines, 3);
    assert_eq!(result.stats.valid_count, 2);
    assert_eq!(result.stats.duplicate_count, 1);
    assert_eq!(result.stats.invalid_count, 0);
}

#[test]
fn blank_only_input_counts_lines_but_classifies_nothing() {
    let result = process_text("\n\n", &AcceptNonEmpty, &BatchSettings::default());

    assert!(result.valid_entries.is_empty());
    assert!(result.invalid_entries.is_empty());
    assert!(result.duplicates.is_empty());
    assert_eq!(result.stats.total_lines, 2);
    assert_eq!(result.classified_lines(), 0);
}

#[test]
fn whitespace_and_case_are_normalized_before_dedup() {
    let result = process_text("  0xABC  \r\n0xabc", &AcceptNonEmpty, &BatchSettings::default());

    assert_eq!(result.valid_entries, entries(&["0xabc"]));
    assert_eq!(result.duplicates, entries(&["0xabc"]));
}

#[test]
fn processing_is_deterministic() {
    let text = "b\na\nB\nc\n\n a \nd\n";
    let settings = BatchSettings::default();
    let first = process_text(text, &AcceptNonEmpty, &settings);
    let second = process_text(text, &AcceptNonEmpty, &settings);

    assert_eq!(first.valid_entries, second.valid_entries);
    assert_eq!(first.valid_entries, entries(&["b", "a", "c", "d"]));
}

#[test]
fn counts_cover_every_non_blank_line() {
    let validator = |line: &str| !line.starts_with('#');
    let text = "x\n#bad\n\ny\nx\n   \n#worse\nz";
    let result = process_text(text, &validator, &BatchSettings::default());

    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(result.classified_lines(), non_blank);
    assert!(result.classified_lines() <= result.stats.total_lines);
    assert_eq!(result.stats.total_lines, 8);
}

#[test]
fn invalid_lines_keep_original_value_and_line_number() {
    let validator = HexAddressValidator::default();
    let good = "0x52908400098527886E0F7030069857D2E4169EE7";
    let text = format!("{good}\n\nnot-an-address\n0x123\n");
    let result = process_text(&text, &validator, &BatchSettings::default());

    assert_eq!(result.valid_entries.len(), 1);
    assert_eq!(result.valid_entries[0].as_str(), good.to_lowercase());

    let invalid: Vec<_> = result
        .invalid_entries
        .iter()
        .map(|e| (e.original_value.as_str(), e.line_number, e.reason.as_str()))
        .collect();
    assert_eq!(
        invalid,
        vec![
            ("not-an-address", 3, INVALID_REASON),
            ("0x123", 4, INVALID_REASON),
        ]
    );
}

#[test]
fn hex_validator_checks_prefix_length_and_digits() {
    let validator = HexAddressValidator::default();
    let ok = format!("0x{}", "a".repeat(40));
    let short = format!("0x{}", "a".repeat(39));
    let non_hex = format!("0x{}g", "a".repeat(39));
    let no_prefix = "a".repeat(42);

    assert!(validator.is_valid(&ok));
    assert!(!validator.is_valid(&short));
    assert!(!validator.is_valid(&non_hex));
    assert!(!validator.is_valid(&no_prefix));
}

#[test]
fn classifier_estimate_uses_clamped_batch_hint() {
    let settings = BatchSettings::default();
    let mut classifier = LineClassifier::new(&AcceptNonEmpty);
    for i in 0..120 {
        classifier.push_line(&format!("addr-{i}"));
    }
    assert_eq!(classifier.lines_seen(), 120);

    // A hint of 1 is clamped up to the minimum batch size (50): 3 batches, 6 seconds.
    let result = classifier.finish(1, &settings);
    assert_eq!(result.stats.estimated_upload_time, "6 sec");
}

#[test]
fn processing_result_serializes_with_camel_case_keys() {
    let result = process_text("a\na\n", &AcceptNonEmpty, &BatchSettings::default());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["validEntries"], serde_json::json!(["a"]));
    assert_eq!(json["stats"]["duplicateCount"], 1);
}
