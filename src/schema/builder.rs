//! Two-pass schema construction: declare everything, then link and verify
//! every cross-reference. Declaration order inside [`default_taxonomy`]
//! therefore cannot introduce ordering bugs; a genuinely missing dependency
//! fails the build with a named [`SchemaError`].

use super::{
    classes as c, properties as p, ClassDef, LiteralType, PropertyDef, Range, Schema, SchemaError,
};
use indexmap::IndexMap;

/// Accumulates declarations for the linking pass.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    classes: Vec<ClassDef>,
    properties: Vec<PropertyDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_class(mut self, class: ClassDef) -> Self {
        self.classes.push(class);
        self
    }

    pub fn declare_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Pass 2: index declarations, then verify that every superclass,
    /// disjoint partner, equivalence base/property, cardinality
    /// property/class, domain, range class, and inverse resolves.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut classes: IndexMap<String, ClassDef> = IndexMap::new();
        for class in self.classes {
            if classes.contains_key(&class.name) {
                return Err(SchemaError::DuplicateClass(class.name));
            }
            classes.insert(class.name.clone(), class);
        }

        let mut properties: IndexMap<String, PropertyDef> = IndexMap::new();
        for property in self.properties {
            if properties.contains_key(&property.name) {
                return Err(SchemaError::DuplicateProperty(property.name));
            }
            properties.insert(property.name.clone(), property);
        }

        for class in classes.values() {
            for superclass in &class.superclasses {
                if !classes.contains_key(superclass) {
                    return Err(SchemaError::UnknownSuperclass {
                        class: class.name.clone(),
                        superclass: superclass.clone(),
                    });
                }
            }
            for partner in &class.disjoint_with {
                if !classes.contains_key(partner) {
                    return Err(SchemaError::UnknownDisjointClass {
                        class: class.name.clone(),
                        partner: partner.clone(),
                    });
                }
            }
            for equivalence in &class.equivalences {
                if !classes.contains_key(&equivalence.base_class) {
                    return Err(SchemaError::UnknownEquivalenceBase {
                        class: class.name.clone(),
                        base: equivalence.base_class.clone(),
                    });
                }
                if !properties.contains_key(&equivalence.property) {
                    return Err(SchemaError::UnknownEquivalenceProperty {
                        class: class.name.clone(),
                        property: equivalence.property.clone(),
                    });
                }
            }
            for restriction in &class.cardinalities {
                if !properties.contains_key(&restriction.property) {
                    return Err(SchemaError::UnknownRestrictionProperty {
                        class: class.name.clone(),
                        property: restriction.property.clone(),
                    });
                }
                if !classes.contains_key(&restriction.on_class) {
                    return Err(SchemaError::UnknownRestrictionClass {
                        class: class.name.clone(),
                        on_class: restriction.on_class.clone(),
                    });
                }
            }
        }

        for property in properties.values() {
            if !classes.contains_key(&property.domain) {
                return Err(SchemaError::UnknownDomain {
                    property: property.name.clone(),
                    domain: property.domain.clone(),
                });
            }
            if let Range::Class(range) = &property.range {
                if !classes.contains_key(range) {
                    return Err(SchemaError::UnknownRangeClass {
                        property: property.name.clone(),
                        range: range.clone(),
                    });
                }
            }
            if let Some(inverse) = &property.inverse_of {
                if !properties.contains_key(inverse) {
                    return Err(SchemaError::UnknownInverse {
                        property: property.name.clone(),
                        inverse: inverse.clone(),
                    });
                }
            }
        }

        Ok(Schema::from_parts(classes, properties))
    }
}

/// Pass 1: the full domain taxonomy. Generic material/BOM classes plus the
/// hydraulic-cylinder dimensions (series, bore, stroke, rod end,
/// installation) and component categories.
pub fn default_taxonomy() -> SchemaBuilder {
    SchemaBuilder::new()
        // Generic material/BOM layer.
        .declare_class(ClassDef::new(c::MATERIAL))
        .declare_class(ClassDef::new(c::MASTER_ITEM).subclass_of(c::MATERIAL))
        .declare_class(ClassDef::new(c::COMPONENT_ITEM).subclass_of(c::MATERIAL))
        .declare_class(ClassDef::new(c::BOM_RELATION))
        // Domain root, carrying the structural-completeness cardinalities:
        // exactly one barrel, piston, and piston rod; at least one sealing
        // component; exactly two end caps.
        .declare_class(
            ClassDef::new(c::HYDRAULIC_CYLINDER)
                .subclass_of(c::MATERIAL)
                .exactly(1, p::HAS_BARREL, c::BARREL)
                .exactly(1, p::HAS_PISTON, c::PISTON)
                .exactly(1, p::HAS_PISTON_ROD, c::PISTON_ROD)
                .at_least(1, p::HAS_SEALING, c::SEALING_COMPONENT)
                .exactly(2, p::HAS_END_CAP, c::END_CAP),
        )
        // Bore dimension.
        .declare_class(
            ClassDef::new(c::SMALL_BORE)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .disjoint_with(c::MEDIUM_BORE)
                .disjoint_with(c::LARGE_BORE),
        )
        .declare_class(
            ClassDef::new(c::MEDIUM_BORE)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .disjoint_with(c::LARGE_BORE),
        )
        .declare_class(ClassDef::new(c::LARGE_BORE).subclass_of(c::HYDRAULIC_CYLINDER))
        // Stroke dimension.
        .declare_class(
            ClassDef::new(c::SHORT_STROKE)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .disjoint_with(c::MEDIUM_STROKE)
                .disjoint_with(c::LONG_STROKE),
        )
        .declare_class(
            ClassDef::new(c::MEDIUM_STROKE)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .disjoint_with(c::LONG_STROKE),
        )
        .declare_class(ClassDef::new(c::LONG_STROKE).subclass_of(c::HYDRAULIC_CYLINDER))
        // Series dimension, with equivalences a reasoner can re-derive
        // from the raw series literal.
        .declare_class(
            ClassDef::new(c::STANDARD_CYLINDER)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::SERIES, "10")
                .disjoint_with(c::HEAVY_DUTY_CYLINDER)
                .disjoint_with(c::COMPACT_CYLINDER)
                .disjoint_with(c::LIGHT_DUTY_CYLINDER),
        )
        .declare_class(
            ClassDef::new(c::HEAVY_DUTY_CYLINDER)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::SERIES, "11")
                .disjoint_with(c::COMPACT_CYLINDER)
                .disjoint_with(c::LIGHT_DUTY_CYLINDER),
        )
        .declare_class(
            ClassDef::new(c::COMPACT_CYLINDER)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::SERIES, "12")
                .disjoint_with(c::LIGHT_DUTY_CYLINDER),
        )
        .declare_class(
            ClassDef::new(c::LIGHT_DUTY_CYLINDER)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::SERIES, "13"),
        )
        // Rod-end dimension. Threaded covers two raw codes, so it carries
        // two equivalence expressions.
        .declare_class(
            ClassDef::new(c::YOKE_ROD_END)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::ROD_END_TYPE, "Y")
                .disjoint_with(c::THREADED_ROD_END)
                .disjoint_with(c::PIN_ROD_END),
        )
        .declare_class(
            ClassDef::new(c::THREADED_ROD_END)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::ROD_END_TYPE, "I")
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::ROD_END_TYPE, "E")
                .disjoint_with(c::PIN_ROD_END),
        )
        .declare_class(
            ClassDef::new(c::PIN_ROD_END)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::ROD_END_TYPE, "P"),
        )
        // Installation dimension.
        .declare_class(
            ClassDef::new(c::FRONT_ATTACHMENT)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::INSTALLATION_TYPE, "FA")
                .disjoint_with(c::REAR_ATTACHMENT)
                .disjoint_with(c::TRUNNION_MOUNTED),
        )
        .declare_class(
            ClassDef::new(c::REAR_ATTACHMENT)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::INSTALLATION_TYPE, "RA")
                .disjoint_with(c::TRUNNION_MOUNTED),
        )
        .declare_class(
            ClassDef::new(c::TRUNNION_MOUNTED)
                .subclass_of(c::HYDRAULIC_CYLINDER)
                .equivalent_to(c::HYDRAULIC_CYLINDER, p::INSTALLATION_TYPE, "TM"),
        )
        // Component categories.
        .declare_class(ClassDef::new(c::CYLINDER_COMPONENT).subclass_of(c::COMPONENT_ITEM))
        .declare_class(ClassDef::new(c::BARREL).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::PISTON).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::PISTON_ROD).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::SEALING_COMPONENT).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::PISTON_SEAL).subclass_of(c::SEALING_COMPONENT))
        .declare_class(ClassDef::new(c::ROD_SEAL).subclass_of(c::SEALING_COMPONENT))
        .declare_class(ClassDef::new(c::WIPER_SEAL).subclass_of(c::SEALING_COMPONENT))
        .declare_class(ClassDef::new(c::BUFFER_SEAL).subclass_of(c::SEALING_COMPONENT))
        .declare_class(ClassDef::new(c::END_CAP).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::BUSHING).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::FASTENER).subclass_of(c::CYLINDER_COMPONENT))
        .declare_class(ClassDef::new(c::TIE_ROD).subclass_of(c::FASTENER))
        .declare_class(ClassDef::new(c::END_CAP_BOLT).subclass_of(c::FASTENER))
        // Datatype properties.
        .declare_property(
            PropertyDef::datatype(p::MATERIAL_CODE, c::MATERIAL, LiteralType::Str)
                .functional()
                .inverse_functional(),
        )
        .declare_property(PropertyDef::datatype(
            p::MATERIAL_NAME,
            c::MATERIAL,
            LiteralType::Str,
        ))
        .declare_property(PropertyDef::datatype(
            p::MATERIAL_SPEC,
            c::MATERIAL,
            LiteralType::Str,
        ))
        .declare_property(PropertyDef::datatype(
            p::CHARACTERISTIC_CODE,
            c::MATERIAL,
            LiteralType::Str,
        ))
        .declare_property(
            PropertyDef::datatype(p::BORE_DIAMETER, c::HYDRAULIC_CYLINDER, LiteralType::Str)
                .functional(),
        )
        .declare_property(
            PropertyDef::datatype(p::STROKE_LENGTH, c::HYDRAULIC_CYLINDER, LiteralType::Str)
                .functional(),
        )
        .declare_property(
            PropertyDef::datatype(p::SERIES, c::HYDRAULIC_CYLINDER, LiteralType::Str).functional(),
        )
        .declare_property(
            PropertyDef::datatype(p::ROD_END_TYPE, c::HYDRAULIC_CYLINDER, LiteralType::Str)
                .functional(),
        )
        .declare_property(
            PropertyDef::datatype(p::CYLINDER_TYPE, c::HYDRAULIC_CYLINDER, LiteralType::Str)
                .functional(),
        )
        .declare_property(PropertyDef::datatype(
            p::INSTALLATION_TYPE,
            c::HYDRAULIC_CYLINDER,
            LiteralType::Str,
        ))
        .declare_property(PropertyDef::datatype(
            p::SHAFT_END_JOIN,
            c::HYDRAULIC_CYLINDER,
            LiteralType::Str,
        ))
        .declare_property(PropertyDef::datatype(
            p::EFFECTIVE_DATE,
            c::BOM_RELATION,
            LiteralType::Date,
        ))
        .declare_property(PropertyDef::datatype(
            p::EXPIRY_DATE,
            c::BOM_RELATION,
            LiteralType::Date,
        ))
        .declare_property(PropertyDef::datatype(
            p::QUANTITY,
            c::BOM_RELATION,
            LiteralType::Decimal,
        ))
        .declare_property(PropertyDef::datatype(
            p::SEQUENCE,
            c::BOM_RELATION,
            LiteralType::Integer,
        ))
        // Object properties.
        .declare_property(PropertyDef::object(p::HAS_BOM, c::MASTER_ITEM, c::BOM_RELATION))
        .declare_property(PropertyDef::object(
            p::HAS_COMPONENT_ITEM,
            c::BOM_RELATION,
            c::COMPONENT_ITEM,
        ))
        .declare_property(
            PropertyDef::object(p::USES, c::MASTER_ITEM, c::COMPONENT_ITEM)
                .inverse_of(p::IS_USED_IN),
        )
        .declare_property(
            PropertyDef::object(p::IS_USED_IN, c::COMPONENT_ITEM, c::MASTER_ITEM)
                .inverse_of(p::USES),
        )
        .declare_property(PropertyDef::object(
            p::HAS_BARREL,
            c::HYDRAULIC_CYLINDER,
            c::BARREL,
        ))
        .declare_property(PropertyDef::object(
            p::HAS_PISTON,
            c::HYDRAULIC_CYLINDER,
            c::PISTON,
        ))
        .declare_property(PropertyDef::object(
            p::HAS_PISTON_ROD,
            c::HYDRAULIC_CYLINDER,
            c::PISTON_ROD,
        ))
        .declare_property(PropertyDef::object(
            p::HAS_SEALING,
            c::HYDRAULIC_CYLINDER,
            c::SEALING_COMPONENT,
        ))
        .declare_property(PropertyDef::object(
            p::HAS_END_CAP,
            c::HYDRAULIC_CYLINDER,
            c::END_CAP,
        ))
        .declare_property(PropertyDef::object(
            p::HAS_BUSHING,
            c::HYDRAULIC_CYLINDER,
            c::BUSHING,
        ))
}
