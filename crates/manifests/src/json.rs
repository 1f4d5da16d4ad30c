//! Typed lookups over loosely typed JSON objects.

use serde_json::{Map, Value};

use crate::error::{ManifestError, Result};

/// A JSON object as produced by `serde_json`.
pub type JsonObject = Map<String, Value>;

/// A JSON kind that a field can be read as, borrowing from the document.
pub trait JsonField<'a>: Sized {
    /// Name of the kind, used in [`ManifestError::IncorrectFieldType`].
    const EXPECTED: &'static str;

    /// Convert a present, non-null value. `None` means the kind did not match.
    fn from_json(value: &'a Value) -> Option<Self>;
}

impl<'a> JsonField<'a> for &'a str {
    const EXPECTED: &'static str = "string";

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> JsonField<'a> for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_i64()
    }
}

impl<'a> JsonField<'a> for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> JsonField<'a> for &'a JsonObject {
    const EXPECTED: &'static str = "object";

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a> JsonField<'a> for &'a [Value] {
    const EXPECTED: &'static str = "array";

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

impl<'a> JsonField<'a> for &'a Value {
    const EXPECTED: &'static str = "any value";

    fn from_json(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

/// Required/optional field access on a [`JsonObject`].
///
/// `null` is treated the same as an absent key.
pub trait JsonObjectExt {
    /// Read `key`, failing when it is absent or of the wrong kind.
    fn required<'a, T: JsonField<'a>>(&'a self, key: &str) -> Result<T>;

    /// Read `key`, yielding `None` when absent and failing only on a kind mismatch.
    fn optional<'a, T: JsonField<'a>>(&'a self, key: &str) -> Result<Option<T>>;
}

impl JsonObjectExt for JsonObject {
    fn required<'a, T: JsonField<'a>>(&'a self, key: &str) -> Result<T> {
        self.optional(key)?
            .ok_or_else(|| ManifestError::missing(key))
    }

    fn optional<'a, T: JsonField<'a>>(&'a self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_json(value)
                .map(Some)
                .ok_or_else(|| ManifestError::incorrect_type(key, T::EXPECTED)),
        }
    }
}

/// Optional lookup on an object that may itself be absent.
pub(crate) fn optional_in<'a, T: JsonField<'a>>(
    object: Option<&'a JsonObject>,
    key: &str,
) -> Result<Option<T>> {
    match object {
        Some(object) => object.optional(key),
        None => Ok(None),
    }
}

/// Return the first string found by walking `paths` in order.
///
/// Paths that run into a missing key, a non-object intermediate, or a
/// non-string leaf are skipped. An empty path never matches.
pub fn string_at_paths<'a>(root: &'a JsonObject, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|path| string_at_path(root, path))
}

fn string_at_path<'a>(root: &'a JsonObject, path: &[&str]) -> Option<&'a str> {
    let (leaf, parents) = path.split_last()?;
    let mut object = root;
    for key in parents {
        object = object.get(*key)?.as_object()?;
    }
    object.get(*leaf)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn required_distinguishes_missing_from_wrong_type() {
        let doc = object(json!({ "id": 42, "nothing": null }));

        let err = doc.required::<&str>("id").unwrap_err();
        assert!(err.is_incorrect_type());

        let err = doc.required::<&str>("absent").unwrap_err();
        assert!(err.is_missing_field());

        let err = doc.required::<&str>("nothing").unwrap_err();
        assert!(err.is_missing_field());

        assert_eq!(doc.required::<i64>("id").unwrap(), 42);
    }

    #[test]
    fn optional_only_fails_on_wrong_type() {
        let doc = object(json!({ "name": "demo", "extra": [1, 2] }));

        assert_eq!(doc.optional::<&str>("name").unwrap(), Some("demo"));
        assert_eq!(doc.optional::<&str>("missing").unwrap(), None);
        assert!(doc.optional::<&JsonObject>("extra").is_err());
        assert_eq!(doc.optional::<&[Value]>("extra").unwrap().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn string_paths_pick_first_match_and_skip_broken_paths() {
        let doc = object(json!({
            "ios": { "splash": "not-an-object" },
            "splash": { "imageUrl": "https://example.com/splash.png", "resizeMode": 3 }
        }));

        assert_eq!(
            string_at_paths(&doc, &[&["ios", "splash", "imageUrl"], &["splash", "imageUrl"]]),
            Some("https://example.com/splash.png")
        );
        assert_eq!(string_at_paths(&doc, &[&["splash", "resizeMode"]]), None);
        assert_eq!(string_at_paths(&doc, &[&[]]), None);
    }
}
