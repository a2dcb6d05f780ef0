use utl_json::parser::DEFAULT_MAX_DEPTH;
use utl_json::{parse, parse_bytes, parse_with, ErrorKind, JsonError, ParseOptions, Value};

/// Assert `input` fails to parse and return (message, offset, line, column).
fn parse_err(input: &str) -> (String, usize, usize, usize) {
    match parse(input) {
        Err(JsonError::Parse {
            message,
            offset,
            line,
            column,
        }) => (message, offset, line, column),
        Err(other) => panic!("expected parse error for {input:?}, got {other:?}"),
        Ok(v) => panic!("expected parse error for {input:?}, got {v:?}"),
    }
}

fn number(input: &str) -> f64 {
    parse(input)
        .unwrap_or_else(|e| panic!("{input:?} should parse: {e}"))
        .get_number()
        .unwrap()
}

fn string(input: &str) -> String {
    parse(input)
        .unwrap_or_else(|e| panic!("{input:?} should parse: {e}"))
        .get_string()
        .unwrap()
        .to_string()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn parse_literals() {
    assert_eq!(parse("null").unwrap(), Value::Null);
    assert_eq!(parse("true").unwrap(), true);
    assert_eq!(parse("false").unwrap(), false);
}

#[test]
fn parse_scalars_at_top_level_with_whitespace() {
    assert_eq!(parse(" \t\r\n42 \n").unwrap(), 42);
    assert_eq!(parse("  \"x\"  ").unwrap(), "x");
}

#[test]
fn parse_integers_and_fractions() {
    assert_eq!(number("0"), 0.0);
    assert_eq!(number("-0"), 0.0);
    assert!(number("-0").is_sign_negative());
    assert_eq!(number("123"), 123.0);
    assert_eq!(number("-17"), -17.0);
    assert_eq!(number("3.25"), 3.25);
    assert_eq!(number("0.5"), 0.5);
}

#[test]
fn parse_exponents() {
    assert_eq!(number("1e3"), 1000.0);
    assert_eq!(number("1E3"), 1000.0);
    assert_eq!(number("1e+3"), 1000.0);
    assert_eq!(number("25e-2"), 0.25);
    assert_eq!(number("-1.5e2"), -150.0);
}

#[test]
fn numbers_beyond_f64_range_are_accepted() {
    assert_eq!(number("1e400"), f64::INFINITY);
    assert_eq!(number("-1e400"), f64::NEG_INFINITY);
    assert_eq!(number("1e-400"), 0.0);
    // 2^53 + 1 rounds to the nearest double.
    assert_eq!(number("9007199254740993"), 9_007_199_254_740_992.0);
}

// ============================================================================
// Strings and escapes
// ============================================================================

#[test]
fn parse_simple_escapes() {
    assert_eq!(
        string(r#""\" \\ \/ \b \f \n \r \t""#),
        "\" \\ / \u{8} \u{c} \n \r \t"
    );
}

#[test]
fn parse_unicode_escapes() {
    assert_eq!(string(r#""\u0041\u00e9\u4E2D""#), "Aé中");
    assert_eq!(string(r#""\u0000""#), "\0");
}

#[test]
fn parse_surrogate_pair() {
    assert_eq!(string(r#""\ud83d\ude00""#), "😀");
    assert_eq!(string(r#""\uD834\uDD1E""#), "𝄞");
}

#[test]
fn lone_surrogates_become_replacement_character() {
    assert_eq!(string(r#""\uD800""#), "\u{FFFD}");
    assert_eq!(string(r#""\uDC00x""#), "\u{FFFD}x");
    // High surrogate followed by a non-surrogate escape keeps the second char.
    assert_eq!(string(r#""\uD800\u0041""#), "\u{FFFD}A");
    // Two high surrogates in a row.
    assert_eq!(string(r#""\uD800\uD800""#), "\u{FFFD}\u{FFFD}");
}

#[test]
fn raw_utf8_passes_through() {
    assert_eq!(string("\"héllo wörld 🌍\""), "héllo wörld 🌍");
}

#[test]
fn invalid_escape_is_rejected() {
    let (message, offset, _, _) = parse_err(r#""a\x""#);
    assert!(message.contains("invalid escape"), "{message}");
    assert_eq!(offset, 2);
}

#[test]
fn short_unicode_escape_is_rejected() {
    let (message, _, _, _) = parse_err(r#""\u12G4""#);
    assert!(message.contains("4 hex digits"), "{message}");
}

#[test]
fn control_character_in_string_is_rejected() {
    let (message, offset, _, _) = parse_err("\"a\tb\"");
    assert!(message.contains("control character"), "{message}");
    assert_eq!(offset, 2);
}

#[test]
fn unterminated_string_points_at_opening_quote() {
    let (message, offset, _, _) = parse_err(r#"{"key": "value"#);
    assert_eq!(message, "unterminated string");
    assert_eq!(offset, 8);
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn parse_nested_containers() {
    let v = parse(r#"{"a": [1, {"b": null}], "c": {}}"#).unwrap();
    assert_eq!(v["a"][0], 1);
    assert!(v["a"][1]["b"].is_null());
    assert!(v["c"].get_object().unwrap().is_empty());
}

#[test]
fn parse_empty_containers_with_inner_whitespace() {
    assert_eq!(parse("[ \n ]").unwrap(), Value::array());
    assert_eq!(parse("{ \t }").unwrap(), Value::object());
}

#[test]
fn object_keys_keep_document_order() {
    let v = parse(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
    let keys: Vec<&str> = v.get_object().unwrap().keys().collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn duplicate_keys_keep_first_position_and_last_value() {
    let v = parse(r#"{"a":1,"b":2,"a":3}"#).unwrap();
    let object = v.get_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(v["a"], 3);
}

#[test]
fn from_str_parses() {
    let v: Value = "[1,2]".parse().unwrap();
    assert_eq!(v.len(), 2);
    assert!("[1,".parse::<Value>().is_err());
}

// ============================================================================
// Errors and positions
// ============================================================================

#[test]
fn empty_input_is_an_error() {
    let (message, offset, line, column) = parse_err("");
    assert!(message.contains("unexpected end of input"), "{message}");
    assert_eq!((offset, line, column), (0, 1, 1));
    parse_err("   ");
}

#[test]
fn trailing_comma_in_array() {
    let (message, offset, _, _) = parse_err("[1,2,]");
    assert_eq!(message, "trailing comma in array");
    assert_eq!(offset, 5);
}

#[test]
fn trailing_comma_in_object() {
    let (message, _, _, _) = parse_err(r#"{"a":1,}"#);
    assert_eq!(message, "trailing comma in object");
}

#[test]
fn missing_colon() {
    let (message, offset, _, _) = parse_err(r#"{"a" 1}"#);
    assert!(message.contains("':'"), "{message}");
    assert_eq!(offset, 5);
}

#[test]
fn unquoted_key() {
    let (message, _, _, _) = parse_err("{a:1}");
    assert!(message.contains("string key"), "{message}");
}

#[test]
fn missing_separator_between_elements() {
    let (message, offset, _, _) = parse_err("[1 2]");
    assert!(message.contains("',' or ']'"), "{message}");
    assert_eq!(offset, 3);
}

#[test]
fn trailing_characters_after_value() {
    let (message, offset, _, _) = parse_err("{} x");
    assert_eq!(message, "trailing characters after JSON value");
    assert_eq!(offset, 3);
    parse_err("truex");
    parse_err("[1]]");
}

#[test]
fn malformed_numbers() {
    for input in ["01", "-01", "+1", ".5", "1.", "1e", "1e+", "-", "0x10", "1.e3"] {
        parse_err(input);
    }
    let (message, offset, _, _) = parse_err("[00]");
    assert_eq!(message, "leading zeros are not allowed");
    assert_eq!(offset, 1);
}

#[test]
fn non_json_literals_are_rejected() {
    for input in ["NaN", "Infinity", "-Infinity", "nul", "True", "undefined", "'a'"] {
        parse_err(input);
    }
}

#[test]
fn comments_are_rejected() {
    parse_err("// c\n1");
    parse_err("[1 /* c */]");
}

#[test]
fn byte_order_mark_is_rejected() {
    let (_, offset, _, _) = parse_err("\u{FEFF}{}");
    assert_eq!(offset, 0);
}

#[test]
fn error_reports_line_and_column() {
    let input = "{\n  \"a\": 1,\n  \"b\": tru\n}";
    let (_, offset, line, column) = parse_err(input);
    assert_eq!(line, 3);
    assert_eq!(column, 8);
    assert_eq!(&input[offset..offset + 3], "tru");
}

#[test]
fn column_counts_characters_not_bytes() {
    // "é" is two bytes but one column.
    let (_, offset, line, column) = parse_err(r#"["é" x]"#);
    assert_eq!(offset, 6);
    assert_eq!((line, column), (1, 6));
}

#[test]
fn error_display_includes_position() {
    let err = parse("[1,]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.offset(), Some(3));
    assert_eq!(
        err.to_string(),
        "parse error at line 1, column 4: trailing comma in array"
    );
}

// ============================================================================
// Bytes input
// ============================================================================

#[test]
fn parse_bytes_accepts_utf8() {
    assert_eq!(parse_bytes(br#"{"k":"v"}"#).unwrap()["k"], "v");
}

#[test]
fn parse_bytes_rejects_invalid_utf8() {
    let err = parse_bytes(b"[\"ab\xFF\"]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.offset(), Some(4));
}

// ============================================================================
// Depth limit
// ============================================================================

fn nested_arrays(depth: usize) -> String {
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn nesting_at_the_limit_parses() {
    assert!(parse(&nested_arrays(DEFAULT_MAX_DEPTH)).is_ok());
}

#[test]
fn nesting_past_the_limit_fails() {
    let (message, offset, _, _) = parse_err(&nested_arrays(DEFAULT_MAX_DEPTH + 1));
    assert!(message.contains("nesting depth"), "{message}");
    assert_eq!(offset, DEFAULT_MAX_DEPTH);
}

#[test]
fn deep_hostile_input_does_not_overflow_the_stack() {
    let input = "[".repeat(1_000_000);
    assert_eq!(parse(&input).unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn custom_depth_limit() {
    let options = ParseOptions { max_depth: 2 };
    assert!(parse_with(r#"{"a":[1]}"#, options).is_ok());
    assert!(parse_with(r#"{"a":[[1]]}"#, options).is_err());
    // Scalars have no depth.
    assert!(parse_with("1", ParseOptions { max_depth: 0 }).is_ok());
}

#[test]
fn depth_is_released_between_siblings() {
    let options = ParseOptions { max_depth: 2 };
    assert!(parse_with("[[],[],[],{}]", options).is_ok());
}

// ============================================================================
// Wide documents
// ============================================================================

fn wide_object(keys: usize) -> String {
    let body: Vec<String> = (0..keys).map(|i| format!("\"key{i:08}\":{i}")).collect();
    format!("{{{}}}", body.join(","))
}

#[test]
fn wide_object_parses_in_linear_time() {
    let text = wide_object(50_000);
    let start = std::time::Instant::now();
    let value = parse(&text).unwrap();
    let elapsed = start.elapsed();

    let object = value.get_object().unwrap();
    assert_eq!(object.len(), 50_000);
    assert_eq!(object.keys().next(), Some("key00000000"));
    assert_eq!(object.keys().last(), Some("key00049999"));
    assert_eq!(value["key00031337"], 31337);
    assert!(
        elapsed < std::time::Duration::from_secs(5),
        "50k-key object took {elapsed:?}"
    );
}

#[test]
fn duplicate_key_in_wide_object_keeps_first_position() {
    let mut text = wide_object(10_000);
    text.insert_str(text.len() - 1, r#","key00000005":"last""#);
    let value = parse(&text).unwrap();
    let object = value.get_object().unwrap();
    assert_eq!(object.len(), 10_000);
    assert_eq!(object.keys().nth(5), Some("key00000005"));
    assert_eq!(value["key00000005"], "last");
}
