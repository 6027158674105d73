//! Mutates the process-wide configuration, so it lives in its own test
//! binary with a single test.

use cson::config::{self, set_global, set_global_canonicalizer, set_global_formatting};
use cson::{
    from_str, to_string, to_string_pretty, to_string_with, Canonicalizer, CsonConfig, Formatting,
    SortMode,
};

#[test]
fn global_configuration_drives_convenience_entry_points() {
    let value = from_str(r#"{"b": [2, 1], "a": null}"#).unwrap();

    assert_eq!(value.to_string(), r#"{"b":[2,1],"a":null}"#);
    assert_eq!(to_string(&value).unwrap(), r#"{"b":[2,1],"a":null}"#);

    set_global_canonicalizer(Canonicalizer::new(SortMode::ObjectArray));
    assert_eq!(value.to_string(), r#"{"a":null,"b":[1,2]}"#);
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"a":null,"b":[1,2]}"#
    );
    assert_eq!(
        to_string_pretty(&value).unwrap(),
        "{\n  \"a\": null,\n  \"b\": [\n    1,\n    2\n  ]\n}"
    );

    set_global_formatting(Formatting::compact().with_space_after_separators(true));
    assert_eq!(value.to_string(), r#"{"a": null, "b": [1, 2]}"#);

    // explicit configuration ignores the global one
    assert_eq!(
        to_string_with(&value, &CsonConfig::new()).unwrap(),
        r#"{"b":[2,1],"a":null}"#
    );

    set_global(CsonConfig::default());
    assert_eq!(config::global().canonicalizer.mode(), SortMode::None);
    assert_eq!(value.to_string(), r#"{"b":[2,1],"a":null}"#);
}
