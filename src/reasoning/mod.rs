//! Shapes raw reasoner output into a structured, navigable report.
//!
//! The reasoner is an external black box; its output arrives as the
//! all-optional [`RawReasonerOutput`] and is converted exactly once, at
//! this boundary, into the strongly-typed [`ReasoningReport`]. The
//! mapping is total and defensive: an error indicator short-circuits into
//! an invalid report, absent lists become empty lists, and malformed
//! entries are dropped with a log line instead of raised.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw reasoner output as received from the inference collaborator.
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawReasonerOutput {
    pub error: Option<String>,
    pub valid: Option<bool>,
    pub issues: Option<Vec<RawIssue>>,
    pub inferred_triples: Option<Vec<RawTriple>>,
    pub subclass_pairs: Option<Vec<RawSubclassPair>>,
    pub hierarchy: Option<RawHierarchy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIssue {
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTriple {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSubclassPair {
    pub subclass: Option<String>,
    pub superclass: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHierarchy {
    pub code: Option<String>,
    pub uri: Option<String>,
    pub inferred_properties: Option<BTreeMap<String, String>>,
    pub components: Option<Vec<RawHierarchyComponent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHierarchyComponent {
    pub code: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
    pub spec: Option<String>,
    pub quantity: Option<f64>,
    pub effective_date: Option<String>,
    pub expiry_date: Option<String>,
    pub inferred_properties: Option<BTreeMap<String, String>>,
}

/// One validation issue reported by the reasoner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub issue_type: String,
    pub description: String,
}

/// One inferred triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// One inferred subclass relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubclassPair {
    pub subclass: String,
    pub superclass: String,
}

/// The master item with its inferred properties and ordered components.
/// Present only on reports covering a full hierarchy request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomHierarchy {
    pub code: String,
    pub uri: String,
    pub inferred_properties: BTreeMap<String, String>,
    pub components: Vec<HierarchyComponent>,
}

/// One component of a [`BomHierarchy`]; everything beyond code/uri is
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyComponent {
    pub code: String,
    pub uri: String,
    pub name: Option<String>,
    pub spec: Option<String>,
    pub quantity: Option<f64>,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub inferred_properties: BTreeMap<String, String>,
}

impl RawReasonerOutput {
    /// Parse a raw JSON payload from the reasoner collaborator. Unknown
    /// keys are ignored; missing keys become absent fields.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

/// Structured reasoning result handed to the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningReport {
    pub master_item_code: String,
    pub reasoner: String,
    pub valid: bool,
    pub error_message: Option<String>,
    pub issues: Vec<ValidationIssue>,
    pub inferred_triples: Vec<InferredTriple>,
    pub inferred_subclasses: Vec<SubclassPair>,
    pub bom_hierarchy: Option<BomHierarchy>,
    pub elapsed_ms: u64,
}

impl ReasoningReport {
    /// Invalid report for a reasoner failure or timeout. All list fields
    /// stay empty and no hierarchy is attached.
    pub fn from_error(
        master_item_code: impl Into<String>,
        reasoner: impl Into<String>,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            master_item_code: master_item_code.into(),
            reasoner: reasoner.into(),
            valid: false,
            error_message: Some(message.into()),
            issues: Vec::new(),
            inferred_triples: Vec::new(),
            inferred_subclasses: Vec::new(),
            bom_hierarchy: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Convert raw reasoner output into a [`ReasoningReport`].
///
/// An error indicator wins over everything else. Otherwise validity
/// defaults to `true` when the reasoner did not say, and each list is
/// populated from whatever entries are complete enough to keep.
pub fn extract(
    raw: RawReasonerOutput,
    master_item_code: &str,
    reasoner: &str,
    elapsed: Duration,
) -> ReasoningReport {
    if let Some(error) = raw.error {
        return ReasoningReport::from_error(master_item_code, reasoner, error, elapsed);
    }

    let issues = raw
        .issues
        .unwrap_or_default()
        .into_iter()
        .filter_map(|issue| {
            let description = issue.description?;
            Some(ValidationIssue {
                issue_type: issue.issue_type.unwrap_or_else(|| "Unknown".to_string()),
                description,
            })
        })
        .collect();

    let inferred_triples = raw
        .inferred_triples
        .unwrap_or_default()
        .into_iter()
        .filter_map(|triple| match (triple.subject, triple.predicate, triple.object) {
            (Some(subject), Some(predicate), Some(object)) => Some(InferredTriple {
                subject,
                predicate,
                object,
            }),
            _ => {
                tracing::debug!("dropping incomplete inferred triple");
                None
            }
        })
        .collect();

    let inferred_subclasses = raw
        .subclass_pairs
        .unwrap_or_default()
        .into_iter()
        .filter_map(|pair| match (pair.subclass, pair.superclass) {
            (Some(subclass), Some(superclass)) => Some(SubclassPair {
                subclass,
                superclass,
            }),
            _ => {
                tracing::debug!("dropping incomplete subclass pair");
                None
            }
        })
        .collect();

    let bom_hierarchy = raw.hierarchy.and_then(extract_hierarchy);

    ReasoningReport {
        master_item_code: master_item_code.to_string(),
        reasoner: reasoner.to_string(),
        valid: raw.valid.unwrap_or(true),
        error_message: None,
        issues,
        inferred_triples,
        inferred_subclasses,
        bom_hierarchy,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}

fn extract_hierarchy(raw: RawHierarchy) -> Option<BomHierarchy> {
    // The hierarchy needs at least one identifier; whichever of code/uri
    // is missing falls back to the other.
    let (code, uri) = identifiers(raw.code, raw.uri)?;
    let components = raw
        .components
        .unwrap_or_default()
        .into_iter()
        .filter_map(extract_component)
        .collect();
    Some(BomHierarchy {
        code,
        uri,
        inferred_properties: raw.inferred_properties.unwrap_or_default(),
        components,
    })
}

fn extract_component(raw: RawHierarchyComponent) -> Option<HierarchyComponent> {
    let (code, uri) = match identifiers(raw.code, raw.uri) {
        Some(pair) => pair,
        None => {
            tracing::debug!("dropping hierarchy component without code or uri");
            return None;
        }
    };
    Some(HierarchyComponent {
        code,
        uri,
        name: raw.name,
        spec: raw.spec,
        quantity: raw.quantity,
        effective_date: raw.effective_date.as_deref().and_then(parse_date),
        expiry_date: raw.expiry_date.as_deref().and_then(parse_date),
        inferred_properties: raw.inferred_properties.unwrap_or_default(),
    })
}

fn identifiers(code: Option<String>, uri: Option<String>) -> Option<(String, String)> {
    match (code, uri) {
        (Some(code), Some(uri)) => Some((code, uri)),
        (Some(code), None) => Some((code.clone(), code)),
        (None, Some(uri)) => Some((uri.clone(), uri)),
        (None, None) => None,
    }
}

/// ISO-8601 date literal; anything else is treated as absent.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(value = raw, "unparseable date in reasoner output");
            None
        }
    }
}
