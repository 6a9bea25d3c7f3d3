// Unit tests for answer parsing

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_plain_json_array() {
    let answers = parse_answers(r#"["Jane Doe", "jane@example.com", ""]"#, 3);
    assert_eq!(answers.into_inner(), vec!["Jane Doe", "jane@example.com", ""]);
}

#[test]
fn test_array_wrapped_in_prose_and_fences() {
    let raw = "Sure! Here are the answers:\n```json\n[\"Yes\", \"5\"]\n```\nGood luck [really].";
    // first '[' to last ']' spans the trailing bracket too, so JSON fails and lines are used
    let answers = parse_answers(raw, 2);
    assert_eq!(answers.len(), 2);

    let raw = "```json\n[\"Yes\", \"5\"]\n```";
    assert_eq!(parse_answers(raw, 2).into_inner(), vec!["Yes", "5"]);
}

#[test]
fn test_short_array_is_padded() {
    let answers = parse_answers(r#"["only one"]"#, 3);
    assert_eq!(answers.into_inner(), vec!["only one", "", ""]);
}

#[test]
fn test_long_array_is_truncated() {
    let answers = parse_answers(r#"["a", "b", "c", "d"]"#, 2);
    assert_eq!(answers.into_inner(), vec!["a", "b"]);
}

#[test]
fn test_non_string_values() {
    let parsed = parse_json_array(r#"[50000, true, null, "x"]"#).unwrap();
    assert_eq!(parsed, vec!["50000", "true", "", "x"]);
}

#[test]
fn test_parse_failures() {
    assert!(matches!(parse_json_array("no brackets"), Err(ParseFailure::NoArray)));
    assert!(matches!(parse_json_array("] before ["), Err(ParseFailure::NoArray)));
    assert!(matches!(parse_json_array("[not json]"), Err(ParseFailure::Json(_))));
}

#[test]
fn test_line_fallback() {
    let raw = "1. \"Jane Doe\",\n2. 'jane@example.com'\n\n- Yes,\n[\n]";
    assert_eq!(split_lines(raw), vec!["Jane Doe", "jane@example.com", "Yes"]);
}

#[test]
fn test_unparseable_output_uses_lines() {
    let answers = parse_answers("Jane Doe\nLondon", 3);
    assert_eq!(answers.into_inner(), vec!["Jane Doe", "London", ""]);
}

#[test]
fn test_empty_response() {
    let answers = parse_answers("", 2);
    assert_eq!(answers.into_inner(), vec!["", ""]);
}
