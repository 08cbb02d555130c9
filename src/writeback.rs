//! Reverse converter — typed model back to raw annotation expressions.
//!
//! The structural inverse of the value converter, for persisting edited
//! annotations. Dispatch is an exhaustive match on the value union;
//! a term's qualifier is re-derived from the unaliased dotted name when it
//! was not tracked explicitly. Inferred record types are omitted, so a
//! convert → writeback round trip reproduces the input.

use smol_str::SmolStr;

use crate::convert::ConvertedMetadata;
use crate::model::{Annotation, AnnotationIndex, AnnotationValue, Record};
use crate::raw::{RawAnnotation, RawExpression, RawPropertyValue, RawRecord};
use crate::resolver::ObjectMap;
use crate::vocabulary::{VocabularyReferences, split_term_and_qualifier};

/// Reverse converter over a finished model.
pub struct Writeback<'a> {
    map: &'a ObjectMap,
    refs: &'a VocabularyReferences,
}

impl<'a> Writeback<'a> {
    pub fn new(model: &'a ConvertedMetadata) -> Self {
        Self {
            map: model.object_map(),
            refs: model.vocabulary(),
        }
    }

    /// Write one applied annotation back to its raw shape. Returns None
    /// for annotation elements that never received a value.
    pub fn annotation(&self, annotation: &Annotation) -> Option<RawAnnotation> {
        let value = annotation.value.as_ref()?;
        let (term, derived) = split_term_and_qualifier(&annotation.term);
        let qualifier = annotation
            .qualifier
            .clone()
            .or_else(|| derived.map(SmolStr::new));
        Some(RawAnnotation {
            term: self.refs.alias(term),
            qualifier,
            value: self.value(value),
            annotations: self.nested(&annotation.annotations),
        })
    }

    /// Write the annotation applied to `target` under `term`.
    pub fn annotation_on(
        &self,
        model: &ConvertedMetadata,
        target: &str,
        term: &str,
    ) -> Option<RawAnnotation> {
        self.annotation(model.annotation_on(target, term)?)
    }

    /// Re-derive the raw expression for one typed value.
    pub fn value(&self, value: &AnnotationValue) -> RawExpression {
        match value {
            AnnotationValue::String(v) => RawExpression::String(v.clone()),
            AnnotationValue::Bool(v) => RawExpression::Bool(*v),
            AnnotationValue::Int(v) => RawExpression::Int(*v),
            AnnotationValue::Decimal(v) => RawExpression::Decimal(*v),
            AnnotationValue::Date(v) => RawExpression::Date(v.to_string()),
            AnnotationValue::EnumMember(v) => RawExpression::EnumMember(v.clone()),
            AnnotationValue::Path(path) => RawExpression::Path(path.value.clone()),
            AnnotationValue::PropertyPath(path) => RawExpression::PropertyPath(path.value.clone()),
            AnnotationValue::NavigationPropertyPath(path) => {
                RawExpression::NavigationPropertyPath(path.value.clone())
            }
            AnnotationValue::AnnotationPath(path) => {
                RawExpression::AnnotationPath(path.value.clone())
            }
            AnnotationValue::Record(record) => RawExpression::Record(self.record(record)),
            AnnotationValue::Collection(collection) => RawExpression::Collection(
                collection.items.iter().map(|item| self.value(item)).collect(),
            ),
            AnnotationValue::Dynamic(dynamic) => (**dynamic).clone(),
        }
    }

    fn record(&self, record: &Record) -> RawRecord {
        RawRecord {
            // Inferred types were not in the input; only explicit ones are
            // written back, re-aliased.
            record_type: if record.type_inferred {
                None
            } else {
                record
                    .record_type
                    .as_deref()
                    .map(|record_type| self.refs.alias(record_type))
            },
            property_values: record
                .property_values
                .iter()
                .map(|property_value| RawPropertyValue {
                    name: property_value.name.clone(),
                    value: self.value(&property_value.value),
                    annotations: self.nested(&property_value.annotations),
                })
                .collect(),
            annotations: self.nested(&record.annotations),
        }
    }

    fn nested(&self, index: &AnnotationIndex) -> Vec<RawAnnotation> {
        index
            .iter()
            .filter_map(|(_, _, fqn)| self.map.get(fqn)?.as_annotation())
            .filter_map(|annotation| self.annotation(annotation))
            .collect()
    }
}
