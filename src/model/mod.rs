//! Resolved model types.
//!
//! Everything in here is addressed by fully-qualified name: elements refer
//! to each other through FQN strings into the object map, never through
//! shared ownership. After `convert()` returns, the graph is immutable.

mod annotations;
mod element;
mod value;

pub use annotations::AnnotationIndex;
pub use element::{
    Action, ActionImport, ActionParameter, Annotation, AssociationLink, ComplexType,
    EntityContainer, EntitySet, EntityType, ModelElement, NavigationProperty, Property,
    ReferentialConstraint, Singleton, TypeDefinition, UnboundActionGroup,
};
pub use value::{
    AnnotationValue, Collection, CollectionKind, PathExpression, PropertyValue, Record, ValueStep,
    slot_mut,
};
