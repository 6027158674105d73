use cson::{from_str, CsonError, Value};

fn document() -> Value {
    from_str(
        r#"{
            "name": "widget",
            "count": "12",
            "ratio": 0.25,
            "enabled": true,
            "tags": ["solo"],
            "pair": [1, 2],
            "empty": [],
            "owner": {"id": 7},
            "nothing": null,
            "huge": 123456789012345678901234567890
        }"#,
    )
    .unwrap()
}

#[test]
fn typed_reads_of_a_parsed_document() {
    let doc = document();
    assert_eq!(doc.get_string("name").unwrap(), "widget");
    assert_eq!(doc.get_i32("count").unwrap(), 12);
    assert_eq!(doc.get_f32("ratio").unwrap(), 0.25);
    assert!(doc.get_bool("enabled").unwrap());
    assert_eq!(doc.get_string("tags").unwrap(), "solo");
    assert_eq!(doc.get_object("owner").unwrap().get_i64("id").unwrap(), 7);
    assert_eq!(
        doc.get_big_integer("huge").unwrap().to_string(),
        "123456789012345678901234567890"
    );
    assert_eq!(doc.get_number("ratio").unwrap().as_f64().unwrap(), 0.25);
    assert_eq!(doc.get_char_at("name", 0).unwrap(), 'w');
}

#[test]
fn missing_key_defaults() {
    let doc = document();
    assert_eq!(doc.get_i32_or("absent", 5).unwrap(), 5);
    assert_eq!(doc.get_string_or("absent", "fallback".into()).unwrap(), "fallback");
    assert_eq!(doc.get_bool_or("absent", true).unwrap(), true);
    assert_eq!(doc.get_char_or("absent", '-').unwrap(), '-');
    assert_eq!(doc.get_f64_opt("absent").unwrap(), None);
    assert!(doc.get_array_opt("absent").unwrap().is_none());
    assert!(matches!(
        doc.get_i32("absent"),
        Err(CsonError::MissingKey(key)) if key == "absent"
    ));
    // present keys ignore the default, even when they fail
    assert_eq!(doc.get_i32_or("count", 5).unwrap(), 12);
    assert!(doc.get_i32_or("name", 5).is_err());
}

#[test]
fn arrays_of_other_sizes_do_not_degrade() {
    let doc = document();
    for key in ["pair", "empty"] {
        assert!(
            matches!(doc.get_i32(key), Err(CsonError::InvalidState(_))),
            "{key}"
        );
    }
    let err = doc.get_i32("pair").unwrap_err();
    assert_eq!(
        err.to_string(),
        "array must have exactly one element, but has 2"
    );
}

#[test]
fn wrong_container_kinds() {
    let doc = document();
    assert!(matches!(
        doc.get_string("owner"),
        Err(CsonError::TypeMismatch { expected: "primitive", found: "object" })
    ));
    assert!(matches!(
        doc.get_string("nothing"),
        Err(CsonError::TypeMismatch { found: "null", .. })
    ));
    assert!(matches!(
        doc.get_object("tags"),
        Err(CsonError::TypeMismatch { expected: "object", found: "array" })
    ));
    doc.get_null("nothing").unwrap();
}
