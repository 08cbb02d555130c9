//! Resolved model elements.
//!
//! The closed element union stored in the object map. Cross-references
//! (`entity_type`, `source_type`, `target_type`, parameter and property
//! lists) are FQN strings into the same map, filled in by the
//! cross-reference linker.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::annotations::AnnotationIndex;
use super::value::AnnotationValue;

/// A named element in the resolved model.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelElement {
    EntityContainer(EntityContainer),
    EntityType(EntityType),
    EntitySet(EntitySet),
    Singleton(Singleton),
    Property(Property),
    NavigationProperty(NavigationProperty),
    Action(Action),
    ActionParameter(ActionParameter),
    ActionImport(ActionImport),
    ComplexType(ComplexType),
    TypeDefinition(TypeDefinition),
    Annotation(Annotation),
    UnboundActionGroup(UnboundActionGroup),
}

impl ModelElement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelElement::EntityContainer(_) => "EntityContainer",
            ModelElement::EntityType(_) => "EntityType",
            ModelElement::EntitySet(_) => "EntitySet",
            ModelElement::Singleton(_) => "Singleton",
            ModelElement::Property(_) => "Property",
            ModelElement::NavigationProperty(_) => "NavigationProperty",
            ModelElement::Action(_) => "Action",
            ModelElement::ActionParameter(_) => "ActionParameter",
            ModelElement::ActionImport(_) => "ActionImport",
            ModelElement::ComplexType(_) => "ComplexType",
            ModelElement::TypeDefinition(_) => "TypeDefinition",
            ModelElement::Annotation(_) => "Annotation",
            ModelElement::UnboundActionGroup(_) => "UnboundActionGroup",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ModelElement::EntityContainer(e) => &e.name,
            ModelElement::EntityType(e) => &e.name,
            ModelElement::EntitySet(e) => &e.name,
            ModelElement::Singleton(e) => &e.name,
            ModelElement::Property(e) => &e.name,
            ModelElement::NavigationProperty(e) => &e.name,
            ModelElement::Action(e) => &e.name,
            ModelElement::ActionParameter(e) => &e.name,
            ModelElement::ActionImport(e) => &e.name,
            ModelElement::ComplexType(e) => &e.name,
            ModelElement::TypeDefinition(e) => &e.name,
            ModelElement::Annotation(e) => &e.term,
            ModelElement::UnboundActionGroup(e) => &e.name,
        }
    }

    pub fn fully_qualified_name(&self) -> &str {
        match self {
            ModelElement::EntityContainer(e) => &e.fully_qualified_name,
            ModelElement::EntityType(e) => &e.fully_qualified_name,
            ModelElement::EntitySet(e) => &e.fully_qualified_name,
            ModelElement::Singleton(e) => &e.fully_qualified_name,
            ModelElement::Property(e) => &e.fully_qualified_name,
            ModelElement::NavigationProperty(e) => &e.fully_qualified_name,
            ModelElement::Action(e) => &e.fully_qualified_name,
            ModelElement::ActionParameter(e) => &e.fully_qualified_name,
            ModelElement::ActionImport(e) => &e.fully_qualified_name,
            ModelElement::ComplexType(e) => &e.fully_qualified_name,
            ModelElement::TypeDefinition(e) => &e.fully_qualified_name,
            ModelElement::Annotation(e) => &e.fully_qualified_name,
            ModelElement::UnboundActionGroup(e) => &e.fully_qualified_name,
        }
    }

    /// Every element can be an annotation target.
    pub fn annotations(&self) -> &AnnotationIndex {
        match self {
            ModelElement::EntityContainer(e) => &e.annotations,
            ModelElement::EntityType(e) => &e.annotations,
            ModelElement::EntitySet(e) => &e.annotations,
            ModelElement::Singleton(e) => &e.annotations,
            ModelElement::Property(e) => &e.annotations,
            ModelElement::NavigationProperty(e) => &e.annotations,
            ModelElement::Action(e) => &e.annotations,
            ModelElement::ActionParameter(e) => &e.annotations,
            ModelElement::ActionImport(e) => &e.annotations,
            ModelElement::ComplexType(e) => &e.annotations,
            ModelElement::TypeDefinition(e) => &e.annotations,
            ModelElement::Annotation(e) => &e.annotations,
            ModelElement::UnboundActionGroup(e) => &e.annotations,
        }
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationIndex {
        match self {
            ModelElement::EntityContainer(e) => &mut e.annotations,
            ModelElement::EntityType(e) => &mut e.annotations,
            ModelElement::EntitySet(e) => &mut e.annotations,
            ModelElement::Singleton(e) => &mut e.annotations,
            ModelElement::Property(e) => &mut e.annotations,
            ModelElement::NavigationProperty(e) => &mut e.annotations,
            ModelElement::Action(e) => &mut e.annotations,
            ModelElement::ActionParameter(e) => &mut e.annotations,
            ModelElement::ActionImport(e) => &mut e.annotations,
            ModelElement::ComplexType(e) => &mut e.annotations,
            ModelElement::TypeDefinition(e) => &mut e.annotations,
            ModelElement::Annotation(e) => &mut e.annotations,
            ModelElement::UnboundActionGroup(e) => &mut e.annotations,
        }
    }

    pub fn as_entity_type(&self) -> Option<&EntityType> {
        match self {
            ModelElement::EntityType(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            ModelElement::Annotation(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityContainer {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub entity_sets: Vec<String>,
    pub singletons: Vec<String>,
    pub action_imports: Vec<String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityType {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    /// Names of the key properties.
    pub keys: Vec<SmolStr>,
    pub properties: Vec<String>,
    pub navigation_properties: Vec<String>,
    /// Bound actions on this type: action name → action FQN. Filled by the
    /// linker.
    pub actions: IndexMap<SmolStr, String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntitySet {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    /// Raw type name as written, possibly alias-qualified.
    pub entity_type_name: String,
    /// Resolved entity type FQN.
    pub entity_type: Option<String>,
    /// Navigation path → target set/singleton; values are rewritten to
    /// FQNs by the linker where resolvable.
    pub navigation_property_binding: IndexMap<String, String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Singleton {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub entity_type_name: String,
    pub entity_type: Option<String>,
    pub nullable: bool,
    pub navigation_property_binding: IndexMap<String, String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    /// Unaliased type name (`Edm.String`, a complex type, a type definition).
    pub type_name: String,
    pub is_collection: bool,
    pub nullable: bool,
    /// Set retroactively when the owning type is linked to a set.
    pub is_key: bool,
    /// Resolved complex-type/type-definition FQN; None for Edm primitives.
    pub target_type: Option<String>,
    pub annotations: AnnotationIndex,
}

/// V2 association backing of a navigation property, kept until the linker
/// has normalized it.
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationLink {
    pub relationship: String,
    pub from_role: SmolStr,
    pub to_role: SmolStr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationProperty {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    /// Raw target type for V4 navigation properties.
    pub target_type_name: Option<String>,
    /// V2 association/role form, normalized away by the linker.
    pub v2_association: Option<AssociationLink>,
    pub is_collection: bool,
    pub partner: Option<SmolStr>,
    pub contains_target: bool,
    pub referential_constraint: Vec<ReferentialConstraint>,
    /// Resolved target entity type FQN.
    pub target_type: Option<String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferentialConstraint {
    pub source_property: SmolStr,
    pub target_property: SmolStr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub name: SmolStr,
    /// `ns.name(ns.BindingType)` for bound overloads, `ns.name()` unbound.
    pub fully_qualified_name: String,
    pub is_bound: bool,
    /// Unaliased binding-parameter type name.
    pub source_type_name: Option<String>,
    /// Resolved binding type FQN.
    pub source_type: Option<String>,
    pub return_type: Option<String>,
    pub parameters: Vec<String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionParameter {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub type_name: String,
    pub is_collection: bool,
    pub nullable: bool,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionImport {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub action_name: String,
    /// Resolved action FQN.
    pub action: Option<String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComplexType {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub properties: Vec<String>,
    pub navigation_properties: Vec<String>,
    pub annotations: AnnotationIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDefinition {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub underlying_type: String,
    pub annotations: AnnotationIndex,
}

/// One applied annotation. Registered in the object map under
/// `target@term#qualifier`, so annotations are themselves annotation
/// targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    /// Unaliased dotted term, without qualifier.
    pub term: String,
    pub qualifier: Option<SmolStr>,
    pub fully_qualified_name: String,
    /// None between object-map construction and the apply pass.
    pub value: Option<AnnotationValue>,
    /// Originating source of the winning merge entry.
    pub source: Option<SmolStr>,
    pub annotations: AnnotationIndex,
}

/// Synthesized aggregate of all overloads of one unbound action name.
/// Annotations applied to it fan out to every overload.
#[derive(Clone, Debug, PartialEq)]
pub struct UnboundActionGroup {
    pub name: SmolStr,
    pub fully_qualified_name: String,
    pub overloads: Vec<String>,
    pub annotations: AnnotationIndex,
}
