//! Lenient field access for externally produced JSON. Every lookup yields an `Option` or a
//! display default; nothing here can fail.

use serde_json::Value;

/// Follow `path` through nested objects. A missing step or a `null` leaf yields `None`.
pub fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |v, key| v.get(*key)).filter(|v| !v.is_null())
}

/// First non-null value among `keys` of `doc`.
pub fn first_present<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| lookup(doc, &[*k]))
}

/// Display text: strings verbatim, other values as JSON text, absent as "".
pub fn text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn text_at(doc: &Value, path: &[&str]) -> String {
    text(lookup(doc, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_and_treats_null_as_absent() {
        let doc = json!({"host": {"computerName": "WS01", "osVersion": null}});
        assert_eq!(text_at(&doc, &["host", "computerName"]), "WS01");
        assert_eq!(text_at(&doc, &["host", "osVersion"]), "");
        assert_eq!(text_at(&doc, &["host", "missing", "deeper"]), "");
        assert_eq!(text_at(&json!([1, 2]), &["host"]), "");
    }

    #[test]
    fn non_strings_render_as_json() {
        assert_eq!(text(Some(&json!(443))), "443");
        assert_eq!(text(Some(&json!(true))), "true");
        assert_eq!(text(Some(&json!(["CN", "x"]))), "[\"CN\",\"x\"]");
    }

    #[test]
    fn first_present_skips_nulls() {
        let doc = json!({"not_after": null, "notAfter": "Jun  1 12:00:00 2026 GMT"});
        assert_eq!(text(first_present(&doc, &["not_after", "notAfter"])), "Jun  1 12:00:00 2026 GMT");
        assert!(first_present(&doc, &["other"]).is_none());
    }
}
