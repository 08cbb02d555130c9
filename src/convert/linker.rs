//! Cross-reference linker.
//!
//! Five symmetric backpatch passes over the object map: navigation
//! properties, bound actions ↔ source types, action imports ↔ actions,
//! entity sets/singletons ↔ entity types (with retroactive key-property
//! flagging), and structural properties ↔ complex types/type definitions.
//! All edges are FQN strings; nothing is shared or copied.

use tracing::warn;

use crate::model::{ModelElement, ReferentialConstraint};
use crate::raw::RawAssociation;
use crate::resolver::ObjectMap;
use crate::vocabulary::VocabularyReferences;

use super::ConvertError;

/// Normalize V4 direct-FQN and V2 association/role navigation properties
/// into one resolved shape: `target_type`, `is_collection`, partner,
/// containment and referential constraint.
pub(crate) fn link_navigation_properties(
    map: &mut ObjectMap,
    refs: &VocabularyReferences,
    associations: &[RawAssociation],
) {
    let keys = map.keys_where(|element| matches!(element, ModelElement::NavigationProperty(_)));
    for key in keys {
        // V2: pull the target end out of the association first.
        let mut v2_resolved: Option<(String, bool, Vec<ReferentialConstraint>)> = None;
        if let Some(ModelElement::NavigationProperty(nav)) = map.get(&key) {
            if let Some(link) = &nav.v2_association {
                let association = associations
                    .iter()
                    .find(|association| {
                        link.relationship == association.name.as_str()
                            || link
                                .relationship
                                .ends_with(&format!(".{}", association.name))
                    });
                match association {
                    Some(association) => {
                        let Some(end) = association
                            .ends
                            .iter()
                            .find(|end| end.role == link.to_role)
                        else {
                            warn!("[LINK] association '{}' has no role '{}'", association.name, link.to_role);
                            continue;
                        };
                        let constraints = association
                            .referential_constraint
                            .as_ref()
                            .map(|constraint| {
                                // The dependent side is the navigation source.
                                constraint
                                    .dependent_properties
                                    .iter()
                                    .zip(&constraint.principal_properties)
                                    .map(|(source, target)| ReferentialConstraint {
                                        source_property: source.clone(),
                                        target_property: target.clone(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();
                        v2_resolved = Some((
                            refs.unalias(&end.end_type),
                            end.multiplicity.as_str() == "*",
                            constraints,
                        ));
                    }
                    None => {
                        warn!("[LINK] unknown association '{}'", link.relationship);
                        continue;
                    }
                }
            }
        }

        let Some(ModelElement::NavigationProperty(nav)) = map.get(&key) else {
            continue;
        };
        let target_name = match (&v2_resolved, &nav.target_type_name) {
            (Some((target, _, _)), _) => Some(target.clone()),
            (None, Some(target)) => Some(target.clone()),
            (None, None) => None,
        };
        let resolved = target_name.filter(|name| map.contains(name));
        if resolved.is_none() {
            warn!("[LINK] navigation property '{key}' has no resolvable target type");
        }

        if let Some(ModelElement::NavigationProperty(nav)) = map.get_mut(&key) {
            if let Some((target, is_collection, constraints)) = v2_resolved {
                nav.target_type_name = Some(target);
                nav.is_collection = is_collection;
                nav.referential_constraint = constraints;
                nav.v2_association = None;
            }
            nav.target_type = resolved;
        }
    }
}

/// Wire bound actions to their source entity types, and the types back to
/// their actions.
pub(crate) fn link_actions(map: &mut ObjectMap) {
    let keys = map.keys_where(|element| matches!(element, ModelElement::Action(_)));
    let mut backlinks = Vec::new();

    for key in keys {
        let Some(ModelElement::Action(action)) = map.get(&key) else {
            continue;
        };
        let Some(source_name) = action.source_type_name.clone() else {
            continue;
        };
        let action_name = action.name.clone();
        if !map.contains(&source_name) {
            warn!("[LINK] action '{key}' bound to unknown type '{source_name}'");
            continue;
        }
        backlinks.push((key, source_name, action_name));
    }

    for (action_fqn, source_fqn, action_name) in backlinks {
        if let Some(ModelElement::Action(action)) = map.get_mut(&action_fqn) {
            action.source_type = Some(source_fqn.clone());
        }
        if let Some(ModelElement::EntityType(entity_type)) = map.get_mut(&source_fqn) {
            entity_type.actions.insert(action_name, action_fqn);
        }
    }
}

/// Wire action imports to the unbound action they expose.
pub(crate) fn link_action_imports(map: &mut ObjectMap) {
    let keys = map.keys_where(|element| matches!(element, ModelElement::ActionImport(_)));
    for key in keys {
        let Some(ModelElement::ActionImport(import)) = map.get(&key) else {
            continue;
        };
        let unbound = format!("{}()", import.action_name);
        let resolved = if map.contains(&unbound) {
            Some(unbound)
        } else if let Some(ModelElement::UnboundActionGroup(group)) = map.get(&import.action_name) {
            group.overloads.first().cloned()
        } else {
            warn!("[LINK] action import '{key}' names unknown action");
            None
        };
        if let Some(ModelElement::ActionImport(import)) = map.get_mut(&key) {
            import.action = resolved;
        }
    }
}

/// Wire entity sets and singletons to their entity types, flag key
/// properties retroactively, and qualify navigation-property-binding
/// targets with the container.
pub(crate) fn link_sets_and_singletons(map: &mut ObjectMap) {
    let keys = map.keys_where(|element| {
        matches!(
            element,
            ModelElement::EntitySet(_) | ModelElement::Singleton(_)
        )
    });

    for key in keys {
        let (type_name, container) = match map.get(&key) {
            Some(ModelElement::EntitySet(set)) => (
                set.entity_type_name.clone(),
                key.rsplit_once('/').map(|(container, _)| container.to_string()),
            ),
            Some(ModelElement::Singleton(singleton)) => (
                singleton.entity_type_name.clone(),
                key.rsplit_once('/').map(|(container, _)| container.to_string()),
            ),
            _ => continue,
        };

        let resolved_type = map.canonical_key(&type_name).map(str::to_string);
        if resolved_type.is_none() {
            warn!("[LINK] '{key}' references unknown entity type '{type_name}'");
        }

        // Retroactive key-property flagging on the linked type.
        let mut key_properties = Vec::new();
        if let Some(type_fqn) = &resolved_type {
            if let Some(ModelElement::EntityType(entity_type)) = map.get(type_fqn) {
                for property_name in &entity_type.keys {
                    key_properties.push(format!("{type_fqn}/{property_name}"));
                }
            }
        }
        for property_fqn in key_properties {
            if let Some(ModelElement::Property(property)) = map.get_mut(&property_fqn) {
                property.is_key = true;
            }
        }

        // Qualify binding targets with the container where needed.
        let mut rewritten = Vec::new();
        if let (Some(container), Some(element)) = (&container, map.get(&key)) {
            let binding = match element {
                ModelElement::EntitySet(set) => &set.navigation_property_binding,
                ModelElement::Singleton(singleton) => &singleton.navigation_property_binding,
                _ => continue,
            };
            for (nav_path, target) in binding {
                if !map.contains(target) {
                    let qualified = format!("{container}/{target}");
                    if map.contains(&qualified) {
                        rewritten.push((nav_path.clone(), qualified));
                    }
                }
            }
        }

        match map.get_mut(&key) {
            Some(ModelElement::EntitySet(set)) => {
                set.entity_type = resolved_type;
                for (nav_path, target) in rewritten {
                    set.navigation_property_binding.insert(nav_path, target);
                }
            }
            Some(ModelElement::Singleton(singleton)) => {
                singleton.entity_type = resolved_type;
                for (nav_path, target) in rewritten {
                    singleton
                        .navigation_property_binding
                        .insert(nav_path, target);
                }
            }
            _ => {}
        }
    }
}

/// Wire structural properties to their complex-type or type-definition
/// targets. A property naming a type that exists nowhere is a structural
/// violation and aborts the conversion.
pub(crate) fn link_properties(map: &mut ObjectMap) -> Result<(), ConvertError> {
    let keys = map.keys_where(|element| matches!(element, ModelElement::Property(_)));
    for key in keys {
        let Some(ModelElement::Property(property)) = map.get(&key) else {
            continue;
        };
        let type_name = property.type_name.clone();
        if type_name.starts_with("Edm.") {
            continue;
        }
        let resolved = match map.get(&type_name) {
            Some(ModelElement::ComplexType(_) | ModelElement::TypeDefinition(_)) => {
                Some(type_name.clone())
            }
            Some(_) => None,
            None => {
                return Err(ConvertError::UnknownPropertyType {
                    property: key,
                    type_name,
                });
            }
        };
        if let Some(ModelElement::Property(property)) = map.get_mut(&key) {
            property.target_type = resolved;
        }
    }
    Ok(())
}
