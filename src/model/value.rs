//! Typed annotation values.
//!
//! The converted form of the raw expression grammar. Path-family nodes keep
//! their raw string plus a `target` slot that the deferred pass back-patches
//! with the resolved FQN; dynamic expressions pass through opaquely.

use smol_str::SmolStr;

use super::annotations::AnnotationIndex;
use crate::raw::RawExpression;

/// One converted annotation value.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    String(String),
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Date(SmolStr),
    /// Re-aliased enum member value (`UI.Importance/High`).
    EnumMember(String),
    Path(PathExpression),
    PropertyPath(PathExpression),
    NavigationPropertyPath(PathExpression),
    AnnotationPath(PathExpression),
    Record(Record),
    Collection(Collection),
    /// Opaque passthrough of a dynamic expression (Apply, Null, operators).
    Dynamic(Box<RawExpression>),
}

impl AnnotationValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnnotationValue::String(_) => "String",
            AnnotationValue::Bool(_) => "Bool",
            AnnotationValue::Int(_) => "Int",
            AnnotationValue::Decimal(_) => "Decimal",
            AnnotationValue::Date(_) => "Date",
            AnnotationValue::EnumMember(_) => "EnumMember",
            AnnotationValue::Path(_) => "Path",
            AnnotationValue::PropertyPath(_) => "PropertyPath",
            AnnotationValue::NavigationPropertyPath(_) => "NavigationPropertyPath",
            AnnotationValue::AnnotationPath(_) => "AnnotationPath",
            AnnotationValue::Record(_) => "Record",
            AnnotationValue::Collection(_) => "Collection",
            AnnotationValue::Dynamic(_) => "Dynamic",
        }
    }

    /// The path-expression node, for the four path-family variants.
    pub fn as_path_expression(&self) -> Option<&PathExpression> {
        match self {
            AnnotationValue::Path(path)
            | AnnotationValue::PropertyPath(path)
            | AnnotationValue::NavigationPropertyPath(path)
            | AnnotationValue::AnnotationPath(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_path_expression_mut(&mut self) -> Option<&mut PathExpression> {
        match self {
            AnnotationValue::Path(path)
            | AnnotationValue::PropertyPath(path)
            | AnnotationValue::NavigationPropertyPath(path)
            | AnnotationValue::AnnotationPath(path) => Some(path),
            _ => None,
        }
    }
}

/// A Path/AnnotationPath/PropertyPath/NavigationPropertyPath node.
#[derive(Clone, Debug, PartialEq)]
pub struct PathExpression {
    /// The raw path string as written.
    pub value: String,
    /// The FQN of this node within its owning annotation.
    pub fully_qualified_name: String,
    /// Resolved target FQN, back-patched in the deferred pass.
    pub target: Option<String>,
}

impl PathExpression {
    pub fn new(value: impl Into<String>, fully_qualified_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            fully_qualified_name: fully_qualified_name.into(),
            target: None,
        }
    }
}

/// A converted record.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Unaliased record type, explicit or inferred.
    pub record_type: Option<String>,
    /// True when the type came from the term-to-type lookup rather than an
    /// explicit attribute; writeback omits inferred types.
    pub type_inferred: bool,
    pub fully_qualified_name: String,
    pub property_values: Vec<PropertyValue>,
    /// Annotations on the record itself.
    pub annotations: AnnotationIndex,
    /// Resolved Action FQN for the DataField(Action) convention.
    pub action_target: Option<String>,
}

impl Record {
    pub fn property_value(&self, name: &str) -> Option<&PropertyValue> {
        self.property_values.iter().find(|pv| pv.name == name)
    }

    pub fn property_value_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.property_values.iter_mut().find(|pv| pv.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyValue {
    pub name: SmolStr,
    pub value: AnnotationValue,
    /// Annotations on the property value.
    pub annotations: AnnotationIndex,
}

/// A converted collection: homogeneous item kind, inferred from the first
/// element at conversion time.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    pub kind: CollectionKind,
    pub items: Vec<AnnotationValue>,
}

impl Collection {
    pub fn empty() -> Self {
        Self {
            kind: CollectionKind::Empty,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Item kind of a collection, in inference precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionKind {
    PropertyPath,
    Path,
    AnnotationPath,
    NavigationPropertyPath,
    Record,
    String,
    Empty,
}

// ============================================================
// Slot addressing (for the pending-resolution worklist)
// ============================================================

/// One step of a slot address into an annotation value tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueStep {
    /// Collection item by index.
    Item(usize),
    /// Record property value by name.
    Property(SmolStr),
}

/// Walk a slot address to the node it designates.
pub fn slot_mut<'a>(
    value: &'a mut AnnotationValue,
    steps: &[ValueStep],
) -> Option<&'a mut AnnotationValue> {
    let mut current = value;
    for step in steps {
        current = match (step, current) {
            (ValueStep::Item(index), AnnotationValue::Collection(collection)) => {
                collection.items.get_mut(*index)?
            }
            (ValueStep::Property(name), AnnotationValue::Record(record)) => {
                &mut record.property_value_mut(name)?.value
            }
            _ => return None,
        };
    }
    Some(current)
}
