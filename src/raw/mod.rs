//! Raw metadata input model.
//!
//! The shapes produced by an external CSDL/XML or CDS parser. This module
//! has NO dependencies on other edmlink modules: it is the interchange
//! surface of the crate, serde-derived throughout.
//!
//! Conversion never mutates these structures; [`crate::convert::convert`]
//! builds a fresh output graph referencing them by fully-qualified name.

mod expression;
mod metadata;

pub use expression::{
    ComparisonOperator, RawAnnotation, RawAnnotationList, RawExpression, RawPropertyValue,
    RawRecord,
};
pub use metadata::{
    RawAction, RawActionImport, RawActionParameter, RawAssociation, RawAssociationConstraint,
    RawAssociationEnd, RawComplexType, RawEntityContainer, RawEntitySet, RawEntityType,
    RawMetadata, RawNavigationProperty, RawNavigationPropertyV2, RawNavigationPropertyV4,
    RawProperty, RawReference, RawReferentialConstraint, RawSchema, RawSingleton,
    RawTypeDefinition,
};
