//! Hydraulic-cylinder taxonomy classification, specification validation,
//! and derived-component suggestion generation.
//!
//! Each taxonomy dimension (bore, stroke, series, rod end, installation)
//! is evaluated independently against its own ordered rule table, so a
//! record receives at most one tag per dimension and disjointness holds by
//! construction. The thresholds and lookup values are business constants;
//! they must not drift between implementations.

use crate::graph::{GraphNode, KnowledgeGraph, NodeId};
use crate::schema::{classes, properties};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use strum::Display;

/// Specification-map keys consumed by this engine.
pub mod spec_keys {
    pub const BORE: &str = "bore";
    pub const STROKE: &str = "stroke";
    pub const SERIES: &str = "series";
    pub const ROD_END_TYPE: &str = "rodEndType";
    pub const INSTALLATION_TYPE: &str = "installationType";
}

/// Specification map as received from callers: raw string values keyed by
/// [`spec_keys`].
pub type SpecMap = HashMap<String, String>;

/// Taxonomy membership tags produced by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
pub enum ClassTag {
    HydraulicCylinder,
    SmallBore,
    MediumBore,
    LargeBore,
    ShortStroke,
    MediumStroke,
    LongStroke,
    Standard,
    HeavyDuty,
    Compact,
    LightDuty,
    YokeRodEnd,
    ThreadedRodEnd,
    PinRodEnd,
    FrontAttachment,
    RearAttachment,
    TrunnionMounted,
}

impl ClassTag {
    /// The schema class this tag corresponds to, so engine output is
    /// directly comparable with reasoner-derived memberships.
    pub fn class_name(self) -> &'static str {
        match self {
            ClassTag::HydraulicCylinder => classes::HYDRAULIC_CYLINDER,
            ClassTag::SmallBore => classes::SMALL_BORE,
            ClassTag::MediumBore => classes::MEDIUM_BORE,
            ClassTag::LargeBore => classes::LARGE_BORE,
            ClassTag::ShortStroke => classes::SHORT_STROKE,
            ClassTag::MediumStroke => classes::MEDIUM_STROKE,
            ClassTag::LongStroke => classes::LONG_STROKE,
            ClassTag::Standard => classes::STANDARD_CYLINDER,
            ClassTag::HeavyDuty => classes::HEAVY_DUTY_CYLINDER,
            ClassTag::Compact => classes::COMPACT_CYLINDER,
            ClassTag::LightDuty => classes::LIGHT_DUTY_CYLINDER,
            ClassTag::YokeRodEnd => classes::YOKE_ROD_END,
            ClassTag::ThreadedRodEnd => classes::THREADED_ROD_END,
            ClassTag::PinRodEnd => classes::PIN_ROD_END,
            ClassTag::FrontAttachment => classes::FRONT_ATTACHMENT,
            ClassTag::RearAttachment => classes::REAR_ATTACHMENT,
            ClassTag::TrunnionMounted => classes::TRUNNION_MOUNTED,
        }
    }
}

/// Ordered upper-bound thresholds: the first rule whose bound is not
/// exceeded wins.
const BORE_RULES: &[(f64, ClassTag)] = &[
    (50.0, ClassTag::SmallBore),
    (100.0, ClassTag::MediumBore),
    (f64::INFINITY, ClassTag::LargeBore),
];

const STROKE_RULES: &[(f64, ClassTag)] = &[
    (100.0, ClassTag::ShortStroke),
    (300.0, ClassTag::MediumStroke),
    (f64::INFINITY, ClassTag::LongStroke),
];

const SERIES_RULES: &[(&str, ClassTag)] = &[
    ("10", ClassTag::Standard),
    ("11", ClassTag::HeavyDuty),
    ("12", ClassTag::Compact),
    ("13", ClassTag::LightDuty),
];

const ROD_END_RULES: &[(&str, ClassTag)] = &[
    ("Y", ClassTag::YokeRodEnd),
    ("I", ClassTag::ThreadedRodEnd),
    ("E", ClassTag::ThreadedRodEnd),
    ("P", ClassTag::PinRodEnd),
];

const INSTALLATION_RULES: &[(&str, ClassTag)] = &[
    ("FA", ClassTag::FrontAttachment),
    ("RA", ClassTag::RearAttachment),
    ("TM", ClassTag::TrunnionMounted),
];

/// Validation bounds. Values outside produce warnings, not errors.
const BORE_RANGE: (f64, f64) = (10.0, 500.0);
const STROKE_RANGE: (f64, f64) = (10.0, 10_000.0);

/// Tie-rod set quantity by bore, ordered upper bounds.
const TIE_ROD_QUANTITY: &[(f64, u32)] =
    &[(50.0, 4), (100.0, 6), (150.0, 8), (f64::INFINITY, 12)];

/// Assign taxonomy tags from a specification map. Dimensions are
/// independent; a malformed numeric value skips only its own dimension.
/// The base tag is included whenever at least one dimension matched.
pub fn classify(specs: &SpecMap) -> BTreeSet<ClassTag> {
    let mut tags = BTreeSet::new();

    if let Some(tag) = numeric_dimension(specs, spec_keys::BORE, BORE_RULES) {
        tags.insert(tag);
    }
    if let Some(tag) = numeric_dimension(specs, spec_keys::STROKE, STROKE_RULES) {
        tags.insert(tag);
    }
    if let Some(tag) = table_dimension(specs, spec_keys::SERIES, SERIES_RULES) {
        tags.insert(tag);
    }
    if let Some(tag) = table_dimension(specs, spec_keys::ROD_END_TYPE, ROD_END_RULES) {
        tags.insert(tag);
    }
    if let Some(tag) = table_dimension(specs, spec_keys::INSTALLATION_TYPE, INSTALLATION_RULES) {
        tags.insert(tag);
    }

    if !tags.is_empty() {
        tags.insert(ClassTag::HydraulicCylinder);
    }
    tags
}

/// Read a specification map off a converted individual, bridging graph
/// property names to the [`spec_keys`] this engine consumes.
pub fn specs_from_node(node: &GraphNode) -> SpecMap {
    let mut specs = SpecMap::new();
    let mappings = [
        (properties::BORE_DIAMETER, spec_keys::BORE),
        (properties::STROKE_LENGTH, spec_keys::STROKE),
        (properties::SERIES, spec_keys::SERIES),
        (properties::ROD_END_TYPE, spec_keys::ROD_END_TYPE),
        (properties::INSTALLATION_TYPE, spec_keys::INSTALLATION_TYPE),
    ];
    for (property, key) in mappings {
        if let Some(value) = node.first_literal(property) {
            specs.insert(key.to_string(), value.to_string());
        }
    }
    specs
}

/// Attach classification tags to a node as type memberships.
pub fn apply_classification(graph: &mut KnowledgeGraph, node: &NodeId, tags: &BTreeSet<ClassTag>) {
    let node = graph.ensure_node(node.clone());
    for tag in tags {
        node.add_type(tag.class_name());
    }
}

fn numeric_dimension(
    specs: &SpecMap,
    key: &str,
    rules: &[(f64, ClassTag)],
) -> Option<ClassTag> {
    let raw = specs.get(key)?;
    let value = match parse_numeric(raw) {
        Some(value) => value,
        None => {
            tracing::warn!(key, value = raw.as_str(), "non-numeric specification, skipping dimension");
            return None;
        }
    };
    rules
        .iter()
        .find(|(upper_bound, _)| value <= *upper_bound)
        .map(|(_, tag)| *tag)
}

fn table_dimension(specs: &SpecMap, key: &str, rules: &[(&str, ClassTag)]) -> Option<ClassTag> {
    let raw = specs.get(key)?.trim();
    rules
        .iter()
        .find(|(value, _)| *value == raw)
        .map(|(_, tag)| *tag)
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Result of [`validate_specs`]. `valid` is true iff `errors` is empty;
/// warnings are informational and never block downstream classification.
#[derive(Debug, Clone, Serialize)]
pub struct SpecValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a specification map for completeness and plausibility. Missing or
/// non-numeric required values are errors; out-of-range or unrecognized
/// values are warnings.
pub fn validate_specs(specs: &SpecMap) -> SpecValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (key, range) in [
        (spec_keys::BORE, BORE_RANGE),
        (spec_keys::STROKE, STROKE_RANGE),
    ] {
        match specs.get(key) {
            None => errors.push(format!("Missing required specification: {key}")),
            Some(raw) => match parse_numeric(raw) {
                None => errors.push(format!("Specification '{key}' is not numeric: {raw}")),
                Some(value) => {
                    if value < range.0 || value > range.1 {
                        warnings.push(format!(
                            "Specification '{key}' value {value} outside expected range [{}, {}]",
                            range.0, range.1
                        ));
                    }
                }
            },
        }
    }

    match specs.get(spec_keys::SERIES) {
        None => errors.push(format!(
            "Missing required specification: {}",
            spec_keys::SERIES
        )),
        Some(series) => {
            let known = SERIES_RULES.iter().any(|(value, _)| value == &series.trim());
            if !known {
                warnings.push(format!("Unknown series: {series} (expected 10, 11, 12 or 13)"));
            }
        }
    }

    if let Some(rod_end) = specs.get(spec_keys::ROD_END_TYPE) {
        let known = ROD_END_RULES.iter().any(|(value, _)| value == &rod_end.trim());
        if !known {
            warnings.push(format!("Unknown rod end type: {rod_end} (expected Y, I, E or P)"));
        }
    }

    SpecValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Derived-component categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum SuggestionCategory {
    Barrel,
    Piston,
    PistonRod,
    Sealing,
    EndCap,
    Bushing,
    Fastener,
}

/// One derived-component candidate with its compatibility score in [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSuggestion {
    pub category: SuggestionCategory,
    pub code: String,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub compatibility: f64,
}

/// Generate candidate components for a cylinder specification.
///
/// Codes follow `<categoryPrefix><series><size>-<suffix>`; the mapping is
/// stable across releases:
///
/// | prefix | suffix | component                          |
/// |--------|--------|------------------------------------|
/// | BRL    | STD    | barrel                             |
/// | BRL    | CRS    | corrosion-resistant barrel         |
/// | PST    | STD    | piston                             |
/// | PST    | RF     | reinforced piston                  |
/// | ROD    | STD    | piston rod (size = rod diameter)   |
/// | ROD    | CHR    | chrome-plated rod (rod diameter)   |
/// | SLP    | KIT    | piston seal set                    |
/// | SLR    | STD    | rod seal                           |
/// | SLW    | STD    | wiper seal                         |
/// | SLB    | STD    | buffer seal                        |
/// | ECH    | STD    | head end cap                       |
/// | ECR    | STD    | rod end cap                        |
/// | BSH    | ROD    | rod bushing                        |
/// | BSH    | GDE    | guide bushing                      |
/// | TRD    | SET    | tie-rod set                        |
/// | BLT    | SET    | end-cap bolt set                   |
///
/// Requires bore (numeric) and series; otherwise returns no suggestions.
pub fn generate_suggestions(specs: &SpecMap) -> Vec<ComponentSuggestion> {
    let bore = match specs.get(spec_keys::BORE).and_then(|raw| parse_numeric(raw)) {
        Some(bore) => bore,
        None => {
            tracing::debug!("suggestion generation requires a numeric bore");
            return Vec::new();
        }
    };
    let series = match specs.get(spec_keys::SERIES) {
        Some(series) => series.trim().to_string(),
        None => {
            tracing::debug!("suggestion generation requires a series");
            return Vec::new();
        }
    };

    let size = bore.round() as u64;
    let rod_diameter = (bore * 0.6).floor() as u64;
    let mut suggestions = Vec::new();

    let mut push = |category: SuggestionCategory,
                    prefix: &str,
                    size: u64,
                    suffix: &str,
                    name: &str,
                    description: String,
                    quantity: u32,
                    compatibility: f64| {
        suggestions.push(ComponentSuggestion {
            category,
            code: format!("{prefix}{series}{size}-{suffix}"),
            name: name.to_string(),
            description,
            quantity,
            compatibility,
        });
    };

    push(
        SuggestionCategory::Barrel,
        "BRL",
        size,
        "STD",
        "Cylinder barrel",
        format!("Standard barrel for bore {size} mm"),
        1,
        1.0,
    );
    if bore > 80.0 {
        push(
            SuggestionCategory::Barrel,
            "BRL",
            size,
            "CRS",
            "Corrosion-resistant barrel",
            format!("Corrosion-resistant barrel for bore {size} mm"),
            1,
            0.9,
        );
    }

    push(
        SuggestionCategory::Piston,
        "PST",
        size,
        "STD",
        "Piston",
        format!("Standard piston for bore {size} mm"),
        1,
        1.0,
    );
    if series == "11" {
        push(
            SuggestionCategory::Piston,
            "PST",
            size,
            "RF",
            "Reinforced piston",
            format!("Reinforced piston for heavy-duty series, bore {size} mm"),
            1,
            0.95,
        );
    }

    push(
        SuggestionCategory::PistonRod,
        "ROD",
        rod_diameter,
        "STD",
        "Piston rod",
        format!("Standard rod, diameter {rod_diameter} mm"),
        1,
        1.0,
    );
    push(
        SuggestionCategory::PistonRod,
        "ROD",
        rod_diameter,
        "CHR",
        "Chrome-plated piston rod",
        format!("Chrome-plated rod, diameter {rod_diameter} mm"),
        1,
        0.95,
    );

    push(
        SuggestionCategory::Sealing,
        "SLP",
        size,
        "KIT",
        "Piston seal set",
        format!("Piston seal set for bore {size} mm"),
        1,
        1.0,
    );
    push(
        SuggestionCategory::Sealing,
        "SLR",
        size,
        "STD",
        "Rod seal",
        format!("Rod seal for bore {size} mm"),
        1,
        1.0,
    );
    push(
        SuggestionCategory::Sealing,
        "SLW",
        size,
        "STD",
        "Wiper seal",
        format!("Wiper seal for bore {size} mm"),
        1,
        1.0,
    );
    if bore > 100.0 {
        push(
            SuggestionCategory::Sealing,
            "SLB",
            size,
            "STD",
            "Buffer seal",
            format!("Buffer seal for large bore {size} mm"),
            1,
            0.8,
        );
    }

    push(
        SuggestionCategory::EndCap,
        "ECH",
        size,
        "STD",
        "Head end cap",
        format!("Head end cap for bore {size} mm"),
        1,
        1.0,
    );
    push(
        SuggestionCategory::EndCap,
        "ECR",
        size,
        "STD",
        "Rod end cap",
        format!("Rod end cap for bore {size} mm"),
        1,
        1.0,
    );

    push(
        SuggestionCategory::Bushing,
        "BSH",
        size,
        "ROD",
        "Rod bushing",
        format!("Rod bushing for bore {size} mm"),
        1,
        1.0,
    );
    if bore > 80.0 {
        push(
            SuggestionCategory::Bushing,
            "BSH",
            size,
            "GDE",
            "Guide bushing",
            format!("Guide bushing for bore {size} mm"),
            1,
            0.8,
        );
    }

    let tie_rods = TIE_ROD_QUANTITY
        .iter()
        .find(|(upper_bound, _)| bore <= *upper_bound)
        .map(|(_, quantity)| *quantity)
        .unwrap_or(12);
    push(
        SuggestionCategory::Fastener,
        "TRD",
        size,
        "SET",
        "Tie-rod set",
        format!("Tie-rod set, {tie_rods} rods"),
        tie_rods,
        1.0,
    );
    push(
        SuggestionCategory::Fastener,
        "BLT",
        size,
        "SET",
        "End-cap bolt set",
        format!("End-cap bolt set for bore {size} mm"),
        1,
        1.0,
    );

    suggestions
}
