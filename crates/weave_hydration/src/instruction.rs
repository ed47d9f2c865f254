//! Field instructions.
//!
//! The compiled, immutable form of a hydration, handed to the runtime.

use crate::arguments::ResolvedHydrationArgument;
use crate::condition::HydrationCondition;
use crate::match_strategy::MatchStrategy;
use crate::strategy::NonBatchStrategy;
use crate::virtual_types::VirtualTypeMapping;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use weave_core::{FieldCoordinates, QueryPath};

/// The backing field a hydration calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationTarget {
    pub service: String,
    pub backing_field_path: QueryPath,
    pub backing_field_coordinates: FieldCoordinates,
}

/// A hydration that calls the backing field once per parent object (or once
/// per element of a fanned-out list).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonBatchFieldInstruction {
    pub location: FieldCoordinates,
    pub target: HydrationTarget,
    pub arguments: Vec<ResolvedHydrationArgument>,
    pub source_fields: Vec<QueryPath>,
    pub condition: Option<HydrationCondition>,
    pub timeout_millis: Option<u64>,
    pub virtual_type_mapping: Option<VirtualTypeMapping>,
    pub strategy: NonBatchStrategy,
}

/// A hydration that calls the backing field once for many parent objects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFieldInstruction {
    pub location: FieldCoordinates,
    pub target: HydrationTarget,
    pub arguments: Vec<ResolvedHydrationArgument>,
    pub source_fields: Vec<QueryPath>,
    pub condition: Option<HydrationCondition>,
    pub timeout_millis: Option<u64>,
    pub virtual_type_mapping: Option<VirtualTypeMapping>,
    pub match_strategy: MatchStrategy,
    pub batch_size: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldInstruction {
    NonBatch(NonBatchFieldInstruction),
    Batch(BatchFieldInstruction),
}

impl FieldInstruction {
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    pub fn location(&self) -> &FieldCoordinates {
        match self {
            Self::NonBatch(i) => &i.location,
            Self::Batch(i) => &i.location,
        }
    }

    pub fn target(&self) -> &HydrationTarget {
        match self {
            Self::NonBatch(i) => &i.target,
            Self::Batch(i) => &i.target,
        }
    }

    pub fn arguments(&self) -> &[ResolvedHydrationArgument] {
        match self {
            Self::NonBatch(i) => &i.arguments,
            Self::Batch(i) => &i.arguments,
        }
    }

    pub fn source_fields(&self) -> &[QueryPath] {
        match self {
            Self::NonBatch(i) => &i.source_fields,
            Self::Batch(i) => &i.source_fields,
        }
    }

    pub fn condition(&self) -> Option<&HydrationCondition> {
        match self {
            Self::NonBatch(i) => i.condition.as_ref(),
            Self::Batch(i) => i.condition.as_ref(),
        }
    }

    pub fn timeout_millis(&self) -> Option<u64> {
        match self {
            Self::NonBatch(i) => i.timeout_millis,
            Self::Batch(i) => i.timeout_millis,
        }
    }

    pub fn virtual_type_mapping(&self) -> Option<&VirtualTypeMapping> {
        match self {
            Self::NonBatch(i) => i.virtual_type_mapping.as_ref(),
            Self::Batch(i) => i.virtual_type_mapping.as_ref(),
        }
    }
}

impl fmt::Display for FieldInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target();
        match self {
            Self::NonBatch(i) => writeln!(
                f,
                "{} -> {}.{} [non-batch {}]",
                i.location, target.service, target.backing_field_path, i.strategy
            )?,
            Self::Batch(i) => writeln!(
                f,
                "{} -> {}.{} [batch {}, size {}]",
                i.location,
                target.service,
                target.backing_field_path,
                i.match_strategy,
                i.batch_size
            )?,
        }
        for argument in self.arguments() {
            writeln!(f, "  arg {argument}")?;
        }
        let source_fields: Vec<String> =
            self.source_fields().iter().map(ToString::to_string).collect();
        writeln!(f, "  source fields: {}", source_fields.join(", "))?;
        if let Some(condition) = self.condition() {
            writeln!(f, "  when: {condition}")?;
        }
        if let Some(timeout) = self.timeout_millis() {
            writeln!(f, "  timeout: {timeout}ms")?;
        }
        if let Some(mapping) = self.virtual_type_mapping() {
            for (virtual_type, backing_type) in &mapping.virtual_to_backing {
                writeln!(f, "  maps {virtual_type} -> {backing_type}")?;
            }
        }
        Ok(())
    }
}

/// Every compiled hydrated field, keyed by its coordinates.
#[derive(Debug, Clone, Default)]
pub struct HydrationPlan {
    fields: IndexMap<FieldCoordinates, Vec<FieldInstruction>>,
}

impl HydrationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        coordinates: FieldCoordinates,
        instructions: Vec<FieldInstruction>,
    ) {
        self.fields.insert(coordinates, instructions);
    }

    /// Instructions of a field, one per declaration.
    pub fn get(&self, coordinates: &FieldCoordinates) -> Option<&[FieldInstruction]> {
        self.fields.get(coordinates).map(Vec::as_slice)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&[FieldInstruction]> {
        self.get(&FieldCoordinates::new(type_name, field_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldCoordinates, &[FieldInstruction])> {
        self.fields.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes the plan as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    field: &'a FieldCoordinates,
    instructions: &'a [FieldInstruction],
}

impl Serialize for HydrationPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.iter()
                .map(|(field, instructions)| PlanEntry { field, instructions }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::ResolvedArgumentValue;
    use crate::match_strategy::ObjectIdentifier;
    use weave_schema::TypeRef;

    fn batch() -> FieldInstruction {
        FieldInstruction::Batch(BatchFieldInstruction {
            location: FieldCoordinates::new("Issue", "widget"),
            target: HydrationTarget {
                service: "widgets".to_string(),
                backing_field_path: QueryPath::field("widgetsByIds"),
                backing_field_coordinates: FieldCoordinates::new("Query", "widgetsByIds"),
            },
            arguments: vec![ResolvedHydrationArgument {
                name: "ids".to_string(),
                backing_type: TypeRef::parse("[ID]").unwrap(),
                value: ResolvedArgumentValue::SourceField {
                    path: QueryPath::field("widgetId"),
                    source_type: TypeRef::parse("ID").unwrap(),
                    yields_list: false,
                    input_shape: None,
                },
            }],
            source_fields: vec![QueryPath::field("widgetId")],
            condition: None,
            timeout_millis: Some(1000),
            virtual_type_mapping: None,
            match_strategy: MatchStrategy::ObjectIdentifier(ObjectIdentifier {
                source_id: QueryPath::field("widgetId"),
                result_id: "id".to_string(),
            }),
            batch_size: 50,
        })
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(batch().to_string(), @r###"
        Issue.widget -> widgets.widgetsByIds [batch ObjectIdentifier(widgetId = id), size 50]
          arg ids: [ID] <- $source.widgetId
          source fields: widgetId
          timeout: 1000ms
        "###);
    }

    #[test]
    fn test_accessors() {
        let instruction = batch();
        assert!(instruction.is_batch());
        assert_eq!(instruction.location().to_string(), "Issue.widget");
        assert_eq!(instruction.target().backing_field_coordinates.field_name, "widgetsByIds");
        assert!(instruction.condition().is_none());
    }

    #[test]
    fn test_plan_serializes_as_sequence() {
        let mut plan = HydrationPlan::new();
        plan.insert(FieldCoordinates::new("Issue", "widget"), vec![batch()]);

        let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        let entry = &json[0];
        assert_eq!(entry["field"]["typeName"], "Issue");
        assert_eq!(entry["instructions"][0]["kind"], "batch");
        assert_eq!(entry["instructions"][0]["batchSize"], 50);
        assert_eq!(entry["instructions"][0]["matchStrategy"]["kind"], "objectIdentifier");
    }
}
