//! Raw schema artifacts: entity types, sets, actions, associations.
//!
//! One `RawMetadata` instance is produced per service version by the
//! external loader. V2 and V4 shapes are both representable; the
//! cross-reference linker normalizes them into one resolved form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::expression::RawAnnotationList;

/// Root of one raw metadata document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    /// OData version tag ("2.0", "4.0").
    pub version: SmolStr,
    /// Project-specific vocabulary references, in document order.
    pub references: Vec<RawReference>,
    pub schema: RawSchema,
}

/// One alias ↔ namespace pair from an `edmx:Reference` include.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReference {
    pub alias: SmolStr,
    pub namespace: String,
    pub uri: Option<String>,
}

impl RawReference {
    pub fn new(alias: impl Into<SmolStr>, namespace: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            namespace: namespace.into(),
            uri: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSchema {
    pub namespace: String,
    /// Schema alias, when declared (`Alias="SAP__self"`).
    pub alias: Option<SmolStr>,
    pub entity_container: RawEntityContainer,
    pub entity_types: Vec<RawEntityType>,
    pub complex_types: Vec<RawComplexType>,
    pub type_definitions: Vec<RawTypeDefinition>,
    pub entity_sets: Vec<RawEntitySet>,
    pub singletons: Vec<RawSingleton>,
    pub actions: Vec<RawAction>,
    pub action_imports: Vec<RawActionImport>,
    /// V2 associations backing role-style navigation properties.
    pub associations: Vec<RawAssociation>,
    /// Annotation lists grouped by originating source, in source order.
    /// Source order is the merge order: later sources win per key.
    pub annotations: IndexMap<SmolStr, Vec<RawAnnotationList>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawEntityContainer {
    pub name: SmolStr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEntityType {
    pub name: SmolStr,
    /// Names of the key properties.
    pub keys: Vec<SmolStr>,
    pub properties: Vec<RawProperty>,
    pub navigation_properties: Vec<RawNavigationProperty>,
}

/// A structural property. `type_name` is the plain type FQN, possibly
/// alias-qualified; collections are flagged, not `Collection(...)`-wrapped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawProperty {
    pub name: SmolStr,
    pub type_name: String,
    pub is_collection: bool,
    pub nullable: bool,
}

impl RawProperty {
    pub fn new(name: impl Into<SmolStr>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_collection: false,
            nullable: true,
        }
    }
}

/// Navigation property in either V4 direct-FQN or V2 association/role form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RawNavigationProperty {
    V4(RawNavigationPropertyV4),
    V2(RawNavigationPropertyV2),
}

impl RawNavigationProperty {
    pub fn name(&self) -> &SmolStr {
        match self {
            RawNavigationProperty::V4(nav) => &nav.name,
            RawNavigationProperty::V2(nav) => &nav.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawNavigationPropertyV4 {
    pub name: SmolStr,
    pub target_type_name: String,
    pub is_collection: bool,
    pub partner: Option<SmolStr>,
    pub contains_target: bool,
    pub referential_constraint: Vec<RawReferentialConstraint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawNavigationPropertyV2 {
    pub name: SmolStr,
    /// Association FQN, possibly alias-qualified.
    pub relationship: String,
    pub from_role: SmolStr,
    pub to_role: SmolStr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReferentialConstraint {
    pub source_property: SmolStr,
    pub target_property: SmolStr,
}

/// V2 `<Association>`: two typed ends plus an optional constraint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawAssociation {
    pub name: SmolStr,
    pub ends: Vec<RawAssociationEnd>,
    pub referential_constraint: Option<RawAssociationConstraint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawAssociationEnd {
    pub end_type: String,
    pub role: SmolStr,
    /// "1", "0..1" or "*".
    pub multiplicity: SmolStr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawAssociationConstraint {
    pub principal_role: SmolStr,
    pub principal_properties: Vec<SmolStr>,
    pub dependent_role: SmolStr,
    pub dependent_properties: Vec<SmolStr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEntitySet {
    pub name: SmolStr,
    pub entity_type_name: String,
    /// Navigation path → target set/singleton name.
    pub navigation_property_binding: IndexMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSingleton {
    pub name: SmolStr,
    pub entity_type_name: String,
    pub nullable: bool,
    pub navigation_property_binding: IndexMap<String, String>,
}

/// An action; bound actions carry the binding-parameter type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawAction {
    pub name: SmolStr,
    pub is_bound: bool,
    /// Binding-parameter type FQN for bound actions.
    pub source_type: Option<String>,
    pub return_type: Option<String>,
    pub parameters: Vec<RawActionParameter>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawActionParameter {
    pub name: SmolStr,
    pub type_name: String,
    pub is_collection: bool,
    pub nullable: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawActionImport {
    pub name: SmolStr,
    /// FQN of the unbound action this import exposes.
    pub action_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawComplexType {
    pub name: SmolStr,
    pub properties: Vec<RawProperty>,
    pub navigation_properties: Vec<RawNavigationProperty>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawTypeDefinition {
    pub name: SmolStr,
    pub underlying_type: String,
}
