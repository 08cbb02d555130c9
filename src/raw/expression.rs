//! Raw annotation expression grammar.
//!
//! A closed tag set: primitives, the Path family, Record, Collection, and
//! the dynamic expressions (Apply, Null, Not, comparisons) that the
//! converter passes through opaquely.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One raw annotation expression node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawExpression {
    String(String),
    Bool(bool),
    Int(i64),
    Decimal(f64),
    /// ISO-8601 date literal, kept textual.
    Date(String),
    /// `Alias.EnumType/Member`, possibly space-separated for flag values.
    EnumMember(String),
    Path(String),
    PropertyPath(String),
    NavigationPropertyPath(String),
    AnnotationPath(String),
    Record(RawRecord),
    Collection(Vec<RawExpression>),
    /// `<Apply Function="...">` with its operand expressions.
    Apply {
        function: SmolStr,
        parameters: Vec<RawExpression>,
    },
    Null,
    Not(Box<RawExpression>),
    Comparison {
        operator: ComparisonOperator,
        left: Box<RawExpression>,
        right: Box<RawExpression>,
    },
}

impl RawExpression {
    /// True for the dynamic/logical expressions the converter does not
    /// interpret.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            RawExpression::Apply { .. }
                | RawExpression::Null
                | RawExpression::Not(_)
                | RawExpression::Comparison { .. }
        )
    }

    /// Short tag name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawExpression::String(_) => "String",
            RawExpression::Bool(_) => "Bool",
            RawExpression::Int(_) => "Int",
            RawExpression::Decimal(_) => "Decimal",
            RawExpression::Date(_) => "Date",
            RawExpression::EnumMember(_) => "EnumMember",
            RawExpression::Path(_) => "Path",
            RawExpression::PropertyPath(_) => "PropertyPath",
            RawExpression::NavigationPropertyPath(_) => "NavigationPropertyPath",
            RawExpression::AnnotationPath(_) => "AnnotationPath",
            RawExpression::Record(_) => "Record",
            RawExpression::Collection(_) => "Collection",
            RawExpression::Apply { .. } => "Apply",
            RawExpression::Null => "Null",
            RawExpression::Not(_) => "Not",
            RawExpression::Comparison { .. } => "Comparison",
        }
    }
}

/// Comparison/boolean operators of the dynamic expression grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
}

/// `<Record>`: optional explicit type, named property values, nested
/// annotations.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// Explicit `Type="..."` attribute, possibly alias-qualified.
    pub record_type: Option<String>,
    pub property_values: Vec<RawPropertyValue>,
    /// Annotations on the record itself.
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPropertyValue {
    pub name: SmolStr,
    pub value: RawExpression,
    /// Annotations on the property value.
    pub annotations: Vec<RawAnnotation>,
}

/// One `<Annotation Term="..." [Qualifier="..."]>` element.
///
/// Annotations nest: an annotation may itself carry annotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// Term name, usually alias-qualified (`UI.LineItem`).
    pub term: String,
    pub qualifier: Option<SmolStr>,
    pub value: RawExpression,
    pub annotations: Vec<RawAnnotation>,
}

impl RawAnnotation {
    pub fn new(term: impl Into<String>, value: RawExpression) -> Self {
        Self {
            term: term.into(),
            qualifier: None,
            value,
            annotations: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<SmolStr>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// `<Annotations Target="...">`: a list of annotations applied to one
/// target, as it appears in one originating source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotationList {
    /// Target path, possibly alias-qualified and possibly pointing at a
    /// nested annotation node.
    pub target: String,
    pub annotations: Vec<RawAnnotation>,
}
