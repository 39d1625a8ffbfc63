//! Findings reconciliation for inspection closeout.
//!
//! A closing technician submits three structured fields (categorized
//! findings, product usage, station findings) plus the photos taken during
//! the visit. Photos arrive as anonymous multipart attachments; the client
//! marks which finding is waiting for one by leaving its `photo` field
//! absent or set to a temporary device-side reference. Association is
//! strictly positional: the Nth finding that needs a photo (type groups in
//! the order the client sent them, then station findings) receives the Nth
//! uploaded attachment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Prefixes that mark a photo value as a temporary client-side reference,
/// i.e. "awaiting a server-side attachment".
const TEMP_PHOTO_PREFIXES: &[&str] = &["blob:", "data:", "file://", "content://"];

#[derive(Debug, Error)]
pub enum FindingsError {
    #[error("malformed {field}: {reason}")]
    MalformedPayload { field: &'static str, reason: String },
}

/// One observed condition. Everything beyond `photo` is free-form and
/// passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Finding {
    /// A finding needs a photo when the field is absent, empty, or holds a
    /// temporary reference. Any other value is a persisted reference and is
    /// never overwritten.
    pub fn needs_photo(&self) -> bool {
        match &self.photo {
            None => true,
            Some(value) => {
                value.is_empty() || TEMP_PHOTO_PREFIXES.iter().any(|p| value.starts_with(p))
            }
        }
    }
}

/// The persisted envelope written to `inspections.findings`.
///
/// `findings_by_type` keeps its groups in the order they were received
/// (serde_json is built with `preserve_order`); `products_by_type` is
/// opaque passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingsDocument {
    #[serde(default)]
    pub findings_by_type: Map<String, Value>,
    #[serde(default)]
    pub products_by_type: Value,
    #[serde(default)]
    pub stations_findings: Vec<Finding>,
}

/// Accept a field either as structured JSON or as a JSON-encoded string.
/// Multipart text parts always arrive as strings; JSON bodies may carry
/// either form. Parsing happens here, before any domain logic sees the
/// value.
pub fn normalize_field(field: &'static str, value: Value) -> Result<Value, FindingsError> {
    match value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|e| FindingsError::MalformedPayload {
                field,
                reason: e.to_string(),
            })
        }
        other => Ok(other),
    }
}

/// Build the findings document for an inspection save: normalize the three
/// structured fields and resolve placeholder photos against the attachment
/// pool in traversal order.
///
/// The pool is consumed front to back; attachments beyond the last
/// placeholder are left unconsumed, and placeholders beyond the last
/// attachment stay unresolved. Neither case is an error.
pub fn reconcile(
    findings_by_type: Option<Value>,
    products_by_type: Option<Value>,
    stations_findings: Option<Value>,
    attachments: &[String],
) -> Result<FindingsDocument, FindingsError> {
    let findings_by_type = match normalize_field(
        "findingsByType",
        findings_by_type.unwrap_or_else(|| Value::Object(Map::new())),
    )? {
        Value::Object(map) => map,
        other => {
            return Err(FindingsError::MalformedPayload {
                field: "findingsByType",
                reason: format!("expected an object of finding groups, got {other}"),
            })
        }
    };

    let products_by_type = normalize_field(
        "productsByType",
        products_by_type.unwrap_or_else(|| Value::Object(Map::new())),
    )?;

    let stations_findings = normalize_field(
        "stationsFindings",
        stations_findings.unwrap_or_else(|| Value::Array(Vec::new())),
    )?;
    let stations_findings: Vec<Finding> =
        serde_json::from_value(stations_findings).map_err(|e| FindingsError::MalformedPayload {
            field: "stationsFindings",
            reason: e.to_string(),
        })?;

    let mut document = FindingsDocument {
        findings_by_type,
        products_by_type,
        stations_findings,
    };

    let mut pool = attachments.iter().cloned();
    assign_photos(&mut document, &mut pool)?;
    Ok(document)
}

/// Resolve placeholder photos across the whole document with a single
/// attachment iterator: type groups first (insertion order), then station
/// findings. The iterator is never reset between the two passes.
pub fn assign_photos<I>(document: &mut FindingsDocument, pool: &mut I) -> Result<(), FindingsError>
where
    I: Iterator<Item = String>,
{
    let groups: Vec<String> = document.findings_by_type.keys().cloned().collect();
    for group in groups {
        let raw = document
            .findings_by_type
            .get(&group)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let mut findings: Vec<Finding> =
            serde_json::from_value(raw).map_err(|e| FindingsError::MalformedPayload {
                field: "findingsByType",
                reason: format!("group '{group}': {e}"),
            })?;

        attach_from_pool(&mut findings, pool);

        let value =
            serde_json::to_value(findings).map_err(|e| FindingsError::MalformedPayload {
                field: "findingsByType",
                reason: e.to_string(),
            })?;
        document.findings_by_type.insert(group, value);
    }

    attach_from_pool(&mut document.stations_findings, pool);
    Ok(())
}

/// The single traversal rule, applied uniformly to grouped and station
/// findings: a placeholder takes the next pooled attachment; a persisted
/// photo consumes nothing.
fn attach_from_pool<I>(findings: &mut [Finding], pool: &mut I)
where
    I: Iterator<Item = String>,
{
    for finding in findings.iter_mut() {
        if !finding.needs_photo() {
            continue;
        }
        match pool.next() {
            Some(path) => finding.photo = Some(path),
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("/media/inspections/photo-{i}.jpg"))
            .collect()
    }

    fn photo_of(document: &FindingsDocument, group: &str, idx: usize) -> Value {
        document.findings_by_type[group][idx]["photo"].clone()
    }

    #[test]
    fn fills_placeholders_in_traversal_order() {
        let findings = json!({
            "rodents": [{"photo": null}, {"photo": "blob:abc123"}],
            "insects": [{"photo": null}]
        });
        let stations = json!([{"photo": null, "station": "E-01"}]);

        let document =
            reconcile(Some(findings), None, Some(stations), &paths(4)).unwrap();

        assert_eq!(photo_of(&document, "rodents", 0), json!("/media/inspections/photo-0.jpg"));
        assert_eq!(photo_of(&document, "rodents", 1), json!("/media/inspections/photo-1.jpg"));
        assert_eq!(photo_of(&document, "insects", 0), json!("/media/inspections/photo-2.jpg"));
        assert_eq!(
            document.stations_findings[0].photo.as_deref(),
            Some("/media/inspections/photo-3.jpg")
        );
    }

    #[test]
    fn group_insertion_order_is_preserved() {
        let findings = json!({
            "zeta": [{"photo": null}],
            "alpha": [{"photo": null}]
        });
        let document = reconcile(Some(findings), None, None, &paths(2)).unwrap();

        // "zeta" was declared first, so it takes the first attachment.
        assert_eq!(photo_of(&document, "zeta", 0), json!("/media/inspections/photo-0.jpg"));
        assert_eq!(photo_of(&document, "alpha", 0), json!("/media/inspections/photo-1.jpg"));
        let keys: Vec<&String> = document.findings_by_type.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn persisted_photo_is_never_overwritten() {
        let findings = json!({
            "rodents": [
                {"photo": "/media/inspections/existing.jpg"},
                {"photo": null}
            ]
        });
        let document = reconcile(Some(findings), None, None, &paths(2)).unwrap();

        assert_eq!(photo_of(&document, "rodents", 0), json!("/media/inspections/existing.jpg"));
        // The persisted finding consumed nothing; the placeholder gets pool[0].
        assert_eq!(photo_of(&document, "rodents", 1), json!("/media/inspections/photo-0.jpg"));
    }

    #[test]
    fn fewer_attachments_leaves_excess_placeholders_unresolved() {
        let findings = json!({
            "rodents": [{"photo": null}, {"photo": null}, {"photo": null}]
        });
        let document = reconcile(Some(findings), None, None, &paths(1)).unwrap();

        assert_eq!(photo_of(&document, "rodents", 0), json!("/media/inspections/photo-0.jpg"));
        assert_eq!(photo_of(&document, "rodents", 1), json!(null));
        assert_eq!(photo_of(&document, "rodents", 2), json!(null));
    }

    #[test]
    fn zero_attachments_changes_nothing() {
        let findings = json!({
            "rodents": [{"photo": null}, {"photo": "blob:tmp"}]
        });
        let document = reconcile(Some(findings), None, None, &[]).unwrap();

        assert_eq!(photo_of(&document, "rodents", 0), json!(null));
        assert_eq!(photo_of(&document, "rodents", 1), json!("blob:tmp"));
    }

    #[test]
    fn extra_attachments_are_silently_unconsumed() {
        let findings = json!({"rodents": [{"photo": null}]});
        let pool = paths(3);
        let mut iter = pool.iter().cloned();

        let mut document = FindingsDocument {
            findings_by_type: match findings {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
            products_by_type: json!({}),
            stations_findings: vec![],
        };
        assign_photos(&mut document, &mut iter).unwrap();

        assert_eq!(photo_of(&document, "rodents", 0), json!("/media/inspections/photo-0.jpg"));
        // Two attachments remain in the pool untouched.
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn string_and_structured_inputs_yield_identical_documents() {
        let structured = json!({"rodents": [{"photo": null, "severity": "high"}]});
        let as_text = Value::String(structured.to_string());

        let a = reconcile(Some(structured), None, None, &paths(1)).unwrap();
        let b = reconcile(Some(as_text), None, None, &paths(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_saves_refill_from_pool_start() {
        let findings = json!({"rodents": [{"photo": "blob:x"}, {"photo": "blob:y"}]});
        let first = reconcile(Some(findings.clone()), None, None, &paths(2)).unwrap();
        let second = reconcile(Some(findings), None, None, &paths(2)).unwrap();

        // No dedup across calls: both saves consume from index zero.
        assert_eq!(first, second);
        assert_eq!(photo_of(&second, "rodents", 0), json!("/media/inspections/photo-0.jpg"));
    }

    #[test]
    fn unparseable_text_field_is_malformed_payload() {
        let err = reconcile(Some(Value::String("{not json".into())), None, None, &[]).unwrap_err();
        assert!(matches!(
            err,
            FindingsError::MalformedPayload { field: "findingsByType", .. }
        ));
    }

    #[test]
    fn non_object_findings_by_type_is_malformed() {
        let err = reconcile(Some(json!([1, 2])), None, None, &[]).unwrap_err();
        assert!(matches!(
            err,
            FindingsError::MalformedPayload { field: "findingsByType", .. }
        ));
    }

    #[test]
    fn products_by_type_passes_through_untouched() {
        let products = json!({"rodenticide": [{"product": "Bromatrol", "amount": "30g"}]});
        let document = reconcile(None, Some(products.clone()), None, &[]).unwrap();
        assert_eq!(document.products_by_type, products);
    }

    #[test]
    fn finding_extra_attributes_survive_reserialization() {
        let findings = json!({
            "insects": [{"photo": null, "zone": "kitchen", "count": 12}]
        });
        let document = reconcile(Some(findings), None, None, &paths(1)).unwrap();
        let entry = &document.findings_by_type["insects"][0];
        assert_eq!(entry["zone"], json!("kitchen"));
        assert_eq!(entry["count"], json!(12));
        assert_eq!(entry["photo"], json!("/media/inspections/photo-0.jpg"));
    }

    #[test]
    fn empty_string_photo_is_a_placeholder() {
        let findings = json!({"rodents": [{"photo": ""}]});
        let document = reconcile(Some(findings), None, None, &paths(1)).unwrap();
        assert_eq!(photo_of(&document, "rodents", 0), json!("/media/inspections/photo-0.jpg"));
    }
}
