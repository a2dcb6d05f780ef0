//! Cross-checks against serde_json, used as an independent reference parser.

use utl_json::{parse, Format, Object, Value};

const DOCUMENTS: &[&str] = &[
    "null",
    "true",
    "-12.5e3",
    r#""tab\tquote\"""#,
    r#"[1, 2.5, "three", [false], {}]"#,
    r#"{"b":1,"a":{"nested":[null,{"deep":"x"}]},"c":"😀"}"#,
    r#"{"big":9007199254740992,"neg":-9007199254740992,"frac":0.1}"#,
];

// ============================================================================
// Deserialize via serde_json
// ============================================================================

#[test]
fn serde_json_and_parse_agree() {
    for text in DOCUMENTS {
        let ours = parse(text).unwrap();
        let theirs: Value = serde_json::from_str(text).unwrap();
        assert_eq!(ours, theirs, "{text}");
    }
}

#[test]
fn deserialize_keeps_key_order() {
    let v: Value = serde_json::from_str(r#"{"z":1,"y":2,"x":3}"#).unwrap();
    let keys: Vec<&str> = v.get_object().unwrap().keys().collect();
    assert_eq!(keys, ["z", "y", "x"]);
}

#[test]
fn deserialize_object_directly() {
    let object: Object = serde_json::from_str(r#"{"k":[1]}"#).unwrap();
    assert_eq!(object.get("k").unwrap()[0], 1);
    assert!(serde_json::from_str::<Object>("[1]").is_err());
}

// ============================================================================
// Serialize via serde_json
// ============================================================================

#[test]
fn serde_json_output_matches_minimized() {
    for text in DOCUMENTS {
        let v = parse(text).unwrap();
        let via_serde = serde_json::to_string(&v).unwrap();
        assert_eq!(via_serde, v.to_string_with(Format::Minimized), "{text}");
    }
}

#[test]
fn integral_numbers_serialize_as_integers() {
    let v = parse("[3, 3.5, -0, 1e20]").unwrap();
    let json = serde_json::to_value(&v).unwrap();
    assert!(json[0].is_i64());
    assert!(json[1].is_f64());
    assert!(json[2].is_f64());
    assert!(json[3].is_f64());
}

#[test]
fn negative_zero_keeps_its_sign() {
    let v = Value::Number(-0.0);
    let text = serde_json::to_string(&v).unwrap();
    assert_eq!(text, "-0.0");

    let back: Value = serde_json::from_str(&text).unwrap();
    let n = back.get_number().unwrap();
    assert_eq!(n, 0.0);
    assert!(n.is_sign_negative());

    // Positive zero is still an integer.
    assert!(serde_json::to_value(Value::Number(0.0)).unwrap().is_i64());
}

#[test]
fn serde_json_value_bridge() {
    let original = parse(r#"{"name":"svc","replicas":3,"labels":{"tier":"web"}}"#).unwrap();
    let json = serde_json::to_value(&original).unwrap();
    assert_eq!(json["replicas"], serde_json::json!(3));
    assert_eq!(json["labels"]["tier"], "web");
    let back: Value = serde_json::from_value(json).unwrap();
    assert_eq!(back, original);
}
