//! Ontology schema model: class definitions, property definitions, and the
//! axioms (disjointness, equivalence, cardinality, functionality) layered
//! over them.
//!
//! The schema is data, not dispatch: runtime classification happens in
//! [`crate::classify`]; these tables exist so a reasoner can re-derive the
//! same memberships from raw triples as a consistency cross-check, and so
//! structural-completeness checks have declared cardinalities to compare
//! against.

mod builder;

pub use builder::{SchemaBuilder, default_taxonomy};

use indexmap::IndexMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Well-known class names. The converter and classifier attach these as
/// node type tags; the builder declares one [`ClassDef`] per constant.
pub mod classes {
    pub const MATERIAL: &str = "Material";
    pub const MASTER_ITEM: &str = "MasterItem";
    pub const COMPONENT_ITEM: &str = "ComponentItem";
    pub const BOM_RELATION: &str = "BomRelation";

    pub const HYDRAULIC_CYLINDER: &str = "HydraulicCylinder";

    pub const SMALL_BORE: &str = "SmallBoreCylinder";
    pub const MEDIUM_BORE: &str = "MediumBoreCylinder";
    pub const LARGE_BORE: &str = "LargeBoreCylinder";

    pub const SHORT_STROKE: &str = "ShortStrokeCylinder";
    pub const MEDIUM_STROKE: &str = "MediumStrokeCylinder";
    pub const LONG_STROKE: &str = "LongStrokeCylinder";

    pub const STANDARD_CYLINDER: &str = "StandardCylinder";
    pub const HEAVY_DUTY_CYLINDER: &str = "HeavyDutyCylinder";
    pub const COMPACT_CYLINDER: &str = "CompactCylinder";
    pub const LIGHT_DUTY_CYLINDER: &str = "LightDutyCylinder";

    pub const YOKE_ROD_END: &str = "YokeRodEndCylinder";
    pub const THREADED_ROD_END: &str = "ThreadedRodEndCylinder";
    pub const PIN_ROD_END: &str = "PinRodEndCylinder";

    pub const FRONT_ATTACHMENT: &str = "FrontAttachmentCylinder";
    pub const REAR_ATTACHMENT: &str = "RearAttachmentCylinder";
    pub const TRUNNION_MOUNTED: &str = "TrunnionMountedCylinder";

    pub const CYLINDER_COMPONENT: &str = "CylinderComponent";
    pub const BARREL: &str = "Barrel";
    pub const PISTON: &str = "Piston";
    pub const PISTON_ROD: &str = "PistonRod";
    pub const SEALING_COMPONENT: &str = "SealingComponent";
    pub const PISTON_SEAL: &str = "PistonSeal";
    pub const ROD_SEAL: &str = "RodSeal";
    pub const WIPER_SEAL: &str = "WiperSeal";
    pub const BUFFER_SEAL: &str = "BufferSeal";
    pub const END_CAP: &str = "EndCap";
    pub const BUSHING: &str = "Bushing";
    pub const FASTENER: &str = "Fastener";
    pub const TIE_ROD: &str = "TieRod";
    pub const END_CAP_BOLT: &str = "EndCapBolt";
}

/// Well-known property names.
pub mod properties {
    pub const MATERIAL_CODE: &str = "materialCode";
    pub const MATERIAL_NAME: &str = "materialName";
    pub const MATERIAL_SPEC: &str = "materialSpec";
    pub const CHARACTERISTIC_CODE: &str = "characteristicCode";

    pub const BORE_DIAMETER: &str = "boreDiameter";
    pub const STROKE_LENGTH: &str = "strokeLength";
    pub const SERIES: &str = "series";
    pub const ROD_END_TYPE: &str = "rodEndType";
    pub const CYLINDER_TYPE: &str = "cylinderType";
    pub const INSTALLATION_TYPE: &str = "installationType";
    pub const SHAFT_END_JOIN: &str = "shaftEndJoin";

    pub const HAS_BOM: &str = "hasBom";
    pub const HAS_COMPONENT_ITEM: &str = "hasComponentItem";
    pub const USES: &str = "uses";
    pub const IS_USED_IN: &str = "isUsedIn";
    pub const EFFECTIVE_DATE: &str = "effectiveDate";
    pub const EXPIRY_DATE: &str = "expiryDate";
    pub const QUANTITY: &str = "quantity";
    pub const SEQUENCE: &str = "sequence";

    pub const HAS_BARREL: &str = "hasBarrel";
    pub const HAS_PISTON: &str = "hasPiston";
    pub const HAS_PISTON_ROD: &str = "hasPistonRod";
    pub const HAS_SEALING: &str = "hasSealing";
    pub const HAS_END_CAP: &str = "hasEndCap";
    pub const HAS_BUSHING: &str = "hasBushing";
}

/// An equivalence axiom: the owning class is equivalent to
/// `base_class ∩ (property = value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceExpr {
    pub base_class: String,
    pub property: String,
    pub value: String,
}

/// Cardinality kinds supported by the structural-completeness axioms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityKind {
    Exactly(u32),
    AtLeast(u32),
}

/// A cardinality axiom: instances of the owning class hold `kind` values of
/// `property`, each an instance of `on_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityRestriction {
    pub property: String,
    pub on_class: String,
    pub kind: CardinalityKind,
}

/// A class declaration with its axioms. Multiple inheritance is allowed.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub superclasses: Vec<String>,
    pub equivalences: Vec<EquivalenceExpr>,
    pub disjoint_with: Vec<String>,
    pub cardinalities: Vec<CardinalityRestriction>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclasses: Vec::new(),
            equivalences: Vec::new(),
            disjoint_with: Vec::new(),
            cardinalities: Vec::new(),
        }
    }

    pub fn subclass_of(mut self, superclass: impl Into<String>) -> Self {
        self.superclasses.push(superclass.into());
        self
    }

    pub fn equivalent_to(
        mut self,
        base_class: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.equivalences.push(EquivalenceExpr {
            base_class: base_class.into(),
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn disjoint_with(mut self, partner: impl Into<String>) -> Self {
        self.disjoint_with.push(partner.into());
        self
    }

    pub fn exactly(
        mut self,
        count: u32,
        property: impl Into<String>,
        on_class: impl Into<String>,
    ) -> Self {
        self.cardinalities.push(CardinalityRestriction {
            property: property.into(),
            on_class: on_class.into(),
            kind: CardinalityKind::Exactly(count),
        });
        self
    }

    pub fn at_least(
        mut self,
        count: u32,
        property: impl Into<String>,
        on_class: impl Into<String>,
    ) -> Self {
        self.cardinalities.push(CardinalityRestriction {
            property: property.into(),
            on_class: on_class.into(),
            kind: CardinalityKind::AtLeast(count),
        });
        self
    }
}

/// Object properties link two nodes; datatype properties link a node to a
/// literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Object,
    Datatype,
}

/// Literal value types for datatype property ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralType {
    Str,
    Integer,
    Decimal,
    Date,
    Boolean,
}

/// Range of a property: a class for object properties, a literal type for
/// datatype properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    Class(String),
    Literal(LiteralType),
}

/// Logical characteristics of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    pub functional: bool,
    pub inverse_functional: bool,
    pub transitive: bool,
    pub symmetric: bool,
    pub asymmetric: bool,
    pub reflexive: bool,
    pub irreflexive: bool,
}

/// A property declaration.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub domain: String,
    pub range: Range,
    pub flags: PropertyFlags,
    pub inverse_of: Option<String>,
}

impl PropertyDef {
    pub fn object(
        name: impl Into<String>,
        domain: impl Into<String>,
        range_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Object,
            domain: domain.into(),
            range: Range::Class(range_class.into()),
            flags: PropertyFlags::default(),
            inverse_of: None,
        }
    }

    pub fn datatype(
        name: impl Into<String>,
        domain: impl Into<String>,
        literal: LiteralType,
    ) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Datatype,
            domain: domain.into(),
            range: Range::Literal(literal),
            flags: PropertyFlags::default(),
            inverse_of: None,
        }
    }

    pub fn functional(mut self) -> Self {
        self.flags.functional = true;
        self
    }

    pub fn inverse_functional(mut self) -> Self {
        self.flags.inverse_functional = true;
        self
    }

    pub fn inverse_of(mut self, inverse: impl Into<String>) -> Self {
        self.inverse_of = Some(inverse.into());
        self
    }
}

/// Fatal schema-construction failures. Construction is all-or-nothing: any
/// dangling reference aborts the build.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("class '{0}' declared twice")]
    DuplicateClass(String),

    #[error("property '{0}' declared twice")]
    DuplicateProperty(String),

    #[error("class '{class}' references unknown superclass '{superclass}'")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("class '{class}' declared disjoint with unknown class '{partner}'")]
    UnknownDisjointClass { class: String, partner: String },

    #[error("class '{class}' equivalence references unknown base class '{base}'")]
    UnknownEquivalenceBase { class: String, base: String },

    #[error("class '{class}' equivalence references unknown property '{property}'")]
    UnknownEquivalenceProperty { class: String, property: String },

    #[error("class '{class}' cardinality references unknown property '{property}'")]
    UnknownRestrictionProperty { class: String, property: String },

    #[error("class '{class}' cardinality references unknown class '{on_class}'")]
    UnknownRestrictionClass { class: String, on_class: String },

    #[error("property '{property}' references unknown domain class '{domain}'")]
    UnknownDomain { property: String, domain: String },

    #[error("property '{property}' references unknown range class '{range}'")]
    UnknownRangeClass { property: String, range: String },

    #[error("property '{property}' references unknown inverse property '{inverse}'")]
    UnknownInverse { property: String, inverse: String },
}

/// Immutable, fully-linked schema. Built once per process via
/// [`Schema::shared`], or ad hoc via [`SchemaBuilder::build`] in tests.
#[derive(Debug)]
pub struct Schema {
    classes: IndexMap<String, ClassDef>,
    properties: IndexMap<String, PropertyDef>,
}

impl Schema {
    pub(crate) fn from_parts(
        classes: IndexMap<String, ClassDef>,
        properties: IndexMap<String, PropertyDef>,
    ) -> Self {
        Self { classes, properties }
    }

    /// Process-wide shared instance of the default taxonomy. The first
    /// caller builds it; concurrent first callers block until the one
    /// build completes; every caller thereafter gets the same `Arc`.
    pub fn shared() -> Result<std::sync::Arc<Schema>, SchemaError> {
        use once_cell::sync::OnceCell;
        use std::sync::Arc;

        static SHARED: OnceCell<Arc<Schema>> = OnceCell::new();
        SHARED
            .get_or_try_init(|| {
                let schema = default_taxonomy().build()?;
                tracing::debug!(
                    classes = schema.class_count(),
                    properties = schema.property_count(),
                    "built shared taxonomy schema"
                );
                Ok(Arc::new(schema))
            })
            .cloned()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.values()
    }

    /// True when the property is declared functional (at most one value).
    pub fn is_functional(&self, property: &str) -> bool {
        self.properties
            .get(property)
            .map(|p| p.flags.functional)
            .unwrap_or(false)
    }

    /// Declared disjointness, symmetric in its arguments.
    pub fn are_disjoint(&self, a: &str, b: &str) -> bool {
        let declared = |x: &str, y: &str| {
            self.classes
                .get(x)
                .map(|c| c.disjoint_with.iter().any(|d| d == y))
                .unwrap_or(false)
        };
        declared(a, b) || declared(b, a)
    }

    /// Transitive superclass closure of a class, excluding the class
    /// itself. Cycles cannot occur: the builder only links classes that
    /// were all declared up front, and the default taxonomy is acyclic.
    pub fn superclasses_of(&self, name: &str) -> BTreeSet<String> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(class) = self.classes.get(&current) {
                for superclass in &class.superclasses {
                    if closure.insert(superclass.clone()) {
                        stack.push(superclass.clone());
                    }
                }
            }
        }
        closure
    }

    /// Counts of classes, properties, and axioms, for diagnostics.
    pub fn summary(&self) -> SchemaSummary {
        let equivalences = self.classes.values().map(|c| c.equivalences.len()).sum();
        let disjoint_declarations = self.classes.values().map(|c| c.disjoint_with.len()).sum();
        let cardinalities = self.classes.values().map(|c| c.cardinalities.len()).sum();
        let functional_properties = self
            .properties
            .values()
            .filter(|p| p.flags.functional)
            .count();
        SchemaSummary {
            classes: self.classes.len(),
            properties: self.properties.len(),
            equivalences,
            disjoint_declarations,
            cardinalities,
            functional_properties,
        }
    }
}

/// Axiom counts reported by [`Schema::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSummary {
    pub classes: usize,
    pub properties: usize,
    pub equivalences: usize,
    pub disjoint_declarations: usize,
    pub cardinalities: usize,
    pub functional_properties: usize,
}
