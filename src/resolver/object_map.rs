//! Object map — the FQN-keyed element arena and its builder.
//!
//! The builder flattens a raw metadata document into one map from
//! fully-qualified name to model element. Later writes intentionally shadow
//! earlier ones; registration order follows the raw document so the most
//! specific element wins.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::model::{
    Action, ActionImport, ActionParameter, Annotation, AssociationLink, ComplexType,
    EntityContainer, EntitySet, EntityType, ModelElement, NavigationProperty, Property,
    ReferentialConstraint, Singleton, TypeDefinition, UnboundActionGroup,
};
use crate::raw::{
    RawAnnotation, RawComplexType, RawMetadata, RawNavigationProperty, RawProperty,
};
use crate::vocabulary::{VocabularyReferences, split_term_and_qualifier};

/// FQN → element table. All cross-references in the model are keys into
/// this map.
#[derive(Debug, Default)]
pub struct ObjectMap {
    elements: FxHashMap<String, ModelElement>,
    /// Alternate keys: `<bindingType>/<actionName>` → bound action FQN.
    redirects: FxHashMap<String, String>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; an existing entry under the same FQN is
    /// shadowed.
    pub fn insert(&mut self, fqn: impl Into<String>, element: ModelElement) {
        let fqn = fqn.into();
        trace!("[OBJECT_MAP] insert {} ({})", fqn, element.kind_name());
        self.elements.insert(fqn, element);
    }

    pub fn insert_redirect(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.redirects.insert(from.into(), to.into());
    }

    /// Look up an element, following one redirect.
    pub fn get(&self, fqn: &str) -> Option<&ModelElement> {
        if let Some(element) = self.elements.get(fqn) {
            return Some(element);
        }
        let target = self.redirects.get(fqn)?;
        self.elements.get(target)
    }

    pub fn get_mut(&mut self, fqn: &str) -> Option<&mut ModelElement> {
        if self.elements.contains_key(fqn) {
            return self.elements.get_mut(fqn);
        }
        let target = self.redirects.get(fqn)?.clone();
        self.elements.get_mut(&target)
    }

    /// The canonical map key for an FQN, following one redirect.
    pub fn canonical_key(&self, fqn: &str) -> Option<&str> {
        if let Some((key, _)) = self.elements.get_key_value(fqn) {
            return Some(key.as_str());
        }
        let target = self.redirects.get(fqn)?;
        self.elements.get_key_value(target).map(|(key, _)| key.as_str())
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.elements.contains_key(fqn) || self.redirects.contains_key(fqn)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelElement)> {
        self.elements.iter()
    }

    /// Keys of elements matching a predicate, for the linker passes that
    /// need to mutate while iterating.
    pub fn keys_where(&self, predicate: impl Fn(&ModelElement) -> bool) -> Vec<String> {
        self.elements
            .iter()
            .filter(|(_, element)| predicate(element))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Flatten a raw metadata document into an object map.
pub fn build_object_map(raw: &RawMetadata, refs: &VocabularyReferences) -> ObjectMap {
    let mut map = ObjectMap::new();
    let schema = &raw.schema;
    let namespace = schema.namespace.as_str();
    let container_fqn = format!("{namespace}.{}", schema.entity_container.name);

    // Index of schema-local complex types for structural detection and
    // nested sub-FQN expansion.
    let complex_index: FxHashMap<String, &RawComplexType> = schema
        .complex_types
        .iter()
        .map(|ct| (format!("{namespace}.{}", ct.name), ct))
        .collect();

    // Container
    map.insert(
        container_fqn.clone(),
        ModelElement::EntityContainer(EntityContainer {
            name: schema.entity_container.name.clone(),
            fully_qualified_name: container_fqn.clone(),
            entity_sets: schema
                .entity_sets
                .iter()
                .map(|set| format!("{container_fqn}/{}", set.name))
                .collect(),
            singletons: schema
                .singletons
                .iter()
                .map(|singleton| format!("{container_fqn}/{}", singleton.name))
                .collect(),
            action_imports: schema
                .action_imports
                .iter()
                .map(|import| format!("{container_fqn}/{}", import.name))
                .collect(),
            annotations: Default::default(),
        }),
    );

    // Entity sets and singletons
    for set in &schema.entity_sets {
        let fqn = format!("{container_fqn}/{}", set.name);
        map.insert(
            fqn.clone(),
            ModelElement::EntitySet(EntitySet {
                name: set.name.clone(),
                fully_qualified_name: fqn,
                entity_type_name: refs.unalias(&set.entity_type_name),
                entity_type: None,
                navigation_property_binding: set.navigation_property_binding.clone(),
                annotations: Default::default(),
            }),
        );
    }
    for singleton in &schema.singletons {
        let fqn = format!("{container_fqn}/{}", singleton.name);
        map.insert(
            fqn.clone(),
            ModelElement::Singleton(Singleton {
                name: singleton.name.clone(),
                fully_qualified_name: fqn,
                entity_type_name: refs.unalias(&singleton.entity_type_name),
                entity_type: None,
                nullable: singleton.nullable,
                navigation_property_binding: singleton.navigation_property_binding.clone(),
                annotations: Default::default(),
            }),
        );
    }

    // Actions: each overload, a group entry per action name, and a reverse
    // `<bindingType>/<actionName>` key for bound overloads.
    let mut groups: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for action in &schema.actions {
        let source_type_name = action
            .source_type
            .as_deref()
            .map(|source_type| refs.unalias(source_type));
        let fqn = match &source_type_name {
            Some(source_type) if action.is_bound => {
                format!("{namespace}.{}({source_type})", action.name)
            }
            _ => format!("{namespace}.{}()", action.name),
        };

        let mut parameters = Vec::new();
        for parameter in &action.parameters {
            let parameter_fqn = format!("{fqn}/{}", parameter.name);
            parameters.push(parameter_fqn.clone());
            map.insert(
                parameter_fqn.clone(),
                ModelElement::ActionParameter(ActionParameter {
                    name: parameter.name.clone(),
                    fully_qualified_name: parameter_fqn,
                    type_name: refs.unalias(&parameter.type_name),
                    is_collection: parameter.is_collection,
                    nullable: parameter.nullable,
                    annotations: Default::default(),
                }),
            );
        }

        if let Some(source_type) = &source_type_name {
            map.insert_redirect(format!("{source_type}/{}", action.name), fqn.clone());
        }
        groups
            .entry(format!("{namespace}.{}", action.name))
            .or_default()
            .push(fqn.clone());

        map.insert(
            fqn.clone(),
            ModelElement::Action(Action {
                name: action.name.clone(),
                fully_qualified_name: fqn,
                is_bound: action.is_bound,
                source_type_name,
                source_type: None,
                return_type: action
                    .return_type
                    .as_deref()
                    .map(|return_type| refs.unalias(return_type)),
                parameters,
                annotations: Default::default(),
            }),
        );
    }
    for (group_fqn, overloads) in groups {
        let name = group_fqn
            .rsplit_once('.')
            .map(|(_, name)| SmolStr::new(name))
            .unwrap_or_else(|| SmolStr::new(&group_fqn));
        map.insert(
            group_fqn.clone(),
            ModelElement::UnboundActionGroup(UnboundActionGroup {
                name,
                fully_qualified_name: group_fqn,
                overloads,
                annotations: Default::default(),
            }),
        );
    }

    // Action imports
    for import in &schema.action_imports {
        let fqn = format!("{container_fqn}/{}", import.name);
        map.insert(
            fqn.clone(),
            ModelElement::ActionImport(ActionImport {
                name: import.name.clone(),
                fully_qualified_name: fqn,
                action_name: refs.unalias(&import.action_name),
                action: None,
                annotations: Default::default(),
            }),
        );
    }

    // Complex types and their properties, expanding nested complex-type
    // properties into synthesized sub-FQNs.
    for complex_type in &schema.complex_types {
        let fqn = format!("{namespace}.{}", complex_type.name);
        let mut properties = Vec::new();
        for property in &complex_type.properties {
            properties.push(format!("{fqn}/{}", property.name));
            register_property(&mut map, refs, &fqn, property, &complex_index, &mut Vec::new());
        }
        let mut navigation_properties = Vec::new();
        for navigation in &complex_type.navigation_properties {
            let nav_fqn = format!("{fqn}/{}", navigation.name());
            navigation_properties.push(nav_fqn.clone());
            register_navigation_property(&mut map, refs, nav_fqn, navigation);
        }
        map.insert(
            fqn.clone(),
            ModelElement::ComplexType(ComplexType {
                name: complex_type.name.clone(),
                fully_qualified_name: fqn,
                properties,
                navigation_properties,
                annotations: Default::default(),
            }),
        );
    }

    // Type definitions
    for definition in &schema.type_definitions {
        let fqn = format!("{namespace}.{}", definition.name);
        map.insert(
            fqn.clone(),
            ModelElement::TypeDefinition(TypeDefinition {
                name: definition.name.clone(),
                fully_qualified_name: fqn,
                underlying_type: refs.unalias(&definition.underlying_type),
                annotations: Default::default(),
            }),
        );
    }

    // Entity types, their properties and navigation properties
    for entity_type in &schema.entity_types {
        let fqn = format!("{namespace}.{}", entity_type.name);
        let mut properties = Vec::new();
        for property in &entity_type.properties {
            properties.push(format!("{fqn}/{}", property.name));
            register_property(&mut map, refs, &fqn, property, &complex_index, &mut Vec::new());
        }
        let mut navigation_properties = Vec::new();
        for navigation in &entity_type.navigation_properties {
            let nav_fqn = format!("{fqn}/{}", navigation.name());
            navigation_properties.push(nav_fqn.clone());
            register_navigation_property(&mut map, refs, nav_fqn, navigation);
        }
        map.insert(
            fqn.clone(),
            ModelElement::EntityType(EntityType {
                name: entity_type.name.clone(),
                fully_qualified_name: fqn,
                keys: entity_type.keys.clone(),
                properties,
                navigation_properties,
                actions: Default::default(),
                annotations: Default::default(),
            }),
        );
    }

    // Raw annotations become resolvable targets themselves.
    for lists in schema.annotations.values() {
        for list in lists {
            let target = refs.unalias_target(&list.target);
            for annotation in &list.annotations {
                register_raw_annotation(&mut map, refs, &target, annotation);
            }
        }
    }

    map
}

/// Register one raw annotation (and, recursively, its nested annotations)
/// as an unapplied Annotation element.
fn register_raw_annotation(
    map: &mut ObjectMap,
    refs: &VocabularyReferences,
    target: &str,
    annotation: &RawAnnotation,
) {
    let (fqn, term, qualifier) = annotation_fqn(refs, target, annotation);
    for nested in &annotation.annotations {
        register_raw_annotation(map, refs, &fqn, nested);
    }
    map.insert(
        fqn.clone(),
        ModelElement::Annotation(Annotation {
            term,
            qualifier,
            fully_qualified_name: fqn,
            value: None,
            source: None,
            annotations: Default::default(),
        }),
    );
}

/// Compute `<targetFQN>@<unaliasedTerm>[#qualifier]` plus the split term
/// and qualifier. An explicit qualifier field wins over one embedded in
/// the term string.
pub fn annotation_fqn(
    refs: &VocabularyReferences,
    target: &str,
    annotation: &RawAnnotation,
) -> (String, String, Option<SmolStr>) {
    let unaliased = refs.unalias(&annotation.term);
    let (term, embedded) = split_term_and_qualifier(&unaliased);
    let qualifier = annotation
        .qualifier
        .clone()
        .or_else(|| embedded.map(SmolStr::new));
    let fqn = match &qualifier {
        Some(qualifier) => format!("{target}@{term}#{qualifier}"),
        None => format!("{target}@{term}"),
    };
    (fqn, term.to_string(), qualifier)
}

fn register_property(
    map: &mut ObjectMap,
    refs: &VocabularyReferences,
    owner_fqn: &str,
    property: &RawProperty,
    complex_index: &FxHashMap<String, &RawComplexType>,
    expanding: &mut Vec<String>,
) {
    let fqn = format!("{owner_fqn}/{}", property.name);
    let type_name = refs.unalias(&property.type_name);

    // Structural complex-type detection: the referenced type carries a
    // properties collection. Recursion is cycle-guarded by the expansion
    // stack.
    if let Some(complex_type) = complex_index.get(&type_name) {
        if !expanding.contains(&type_name) {
            expanding.push(type_name.clone());
            for nested in &complex_type.properties {
                register_property(map, refs, &fqn, nested, complex_index, expanding);
            }
            expanding.pop();
        }
    }

    map.insert(
        fqn.clone(),
        ModelElement::Property(Property {
            name: property.name.clone(),
            fully_qualified_name: fqn,
            type_name,
            is_collection: property.is_collection,
            nullable: property.nullable,
            is_key: false,
            target_type: None,
            annotations: Default::default(),
        }),
    );
}

fn register_navigation_property(
    map: &mut ObjectMap,
    refs: &VocabularyReferences,
    fqn: String,
    navigation: &RawNavigationProperty,
) {
    let element = match navigation {
        RawNavigationProperty::V4(nav) => NavigationProperty {
            name: nav.name.clone(),
            fully_qualified_name: fqn.clone(),
            target_type_name: Some(refs.unalias(&nav.target_type_name)),
            v2_association: None,
            is_collection: nav.is_collection,
            partner: nav.partner.clone(),
            contains_target: nav.contains_target,
            referential_constraint: nav
                .referential_constraint
                .iter()
                .map(|constraint| ReferentialConstraint {
                    source_property: constraint.source_property.clone(),
                    target_property: constraint.target_property.clone(),
                })
                .collect(),
            target_type: None,
            annotations: Default::default(),
        },
        RawNavigationProperty::V2(nav) => NavigationProperty {
            name: nav.name.clone(),
            fully_qualified_name: fqn.clone(),
            target_type_name: None,
            v2_association: Some(AssociationLink {
                relationship: refs.unalias(&nav.relationship),
                from_role: nav.from_role.clone(),
                to_role: nav.to_role.clone(),
            }),
            is_collection: false,
            partner: None,
            contains_target: false,
            referential_constraint: Vec::new(),
            target_type: None,
            annotations: Default::default(),
        },
    };
    map.insert(fqn, ModelElement::NavigationProperty(element));
}
