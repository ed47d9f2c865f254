//! Source field projection.
//!
//! Computes the paths that must be queried on the parent object so the
//! backing call can be built.

use crate::arguments::{ResolvedArgumentValue, ResolvedHydrationArgument};
use crate::condition::HydrationCondition;
use crate::match_strategy::MatchStrategy;
use indexmap::IndexSet;
use weave_core::QueryPath;
use weave_schema::Schema;

/// Collects the source paths of the arguments, the match keys and the
/// condition, then prunes them.
///
/// An object-typed `$source` argument needs the whole shallow object, so it
/// contributes one path per child field instead of its own path.
pub fn project_source_fields(
    schema: &Schema,
    arguments: &[ResolvedHydrationArgument],
    match_strategy: Option<&MatchStrategy>,
    condition: Option<&HydrationCondition>,
) -> Vec<QueryPath> {
    let mut paths = Vec::new();

    for argument in arguments {
        let ResolvedArgumentValue::SourceField {
            path, source_type, ..
        } = &argument.value
        else {
            continue;
        };
        match schema.fields_of(source_type.named_type()) {
            Some(children) => paths.extend(children.keys().map(|child| path.join(child.as_str()))),
            None => paths.push(path.clone()),
        }
    }

    if let Some(strategy) = match_strategy {
        paths.extend(strategy.key_paths().into_iter().cloned());
    }
    if let Some(condition) = condition {
        paths.push(condition.path.clone());
    }

    prune(paths)
}

/// Deduplicates paths and drops every path that is a strict prefix of
/// another. First-seen order is kept.
pub fn prune(paths: impl IntoIterator<Item = QueryPath>) -> Vec<QueryPath> {
    let unique: IndexSet<QueryPath> = paths.into_iter().collect();
    unique
        .iter()
        .filter(|path| !unique.iter().any(|other| path.is_strict_prefix_of(other)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_strategy::ObjectIdentifier;
    use weave_schema::{FieldDef, ObjectDef, SchemaBuilder, TypeRef};

    fn paths(raw: &[&str]) -> Vec<QueryPath> {
        raw.iter().map(|p| QueryPath::parse(p).unwrap()).collect()
    }

    fn render(paths: &[QueryPath]) -> Vec<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    fn source(name: &str, path: &str, source_type: &str) -> ResolvedHydrationArgument {
        ResolvedHydrationArgument {
            name: name.to_string(),
            backing_type: TypeRef::named("ID"),
            value: ResolvedArgumentValue::SourceField {
                path: QueryPath::parse(path).unwrap(),
                source_type: TypeRef::parse(source_type).unwrap(),
                yields_list: false,
                input_shape: None,
            },
        }
    }

    #[test]
    fn test_prune_prefixes_and_duplicates() {
        let pruned = prune(paths(&["a", "a.b", "c", "a.b", "a.b.c", "d.e"]));
        assert_eq!(render(&pruned), ["c", "a.b.c", "d.e"]);
    }

    #[test]
    fn test_prune_is_idempotent() {
        let once = prune(paths(&["x.y", "x", "z", "x.y.w", "z"]));
        let twice = prune(once.clone());
        assert_eq!(once, twice);
        for path in &once {
            assert!(!once.iter().any(|other| other.is_strict_prefix_of(path)));
        }
    }

    #[test]
    fn test_object_argument_expands_children() {
        let schema = SchemaBuilder::new()
            .object(
                ObjectDef::new("Ref")
                    .with_field(FieldDef::new("id", TypeRef::named("ID")))
                    .with_field(FieldDef::new("site", TypeRef::named("String"))),
            )
            .build();
        let arguments = [source("ref", "ref", "Ref!"), source("id", "ownerId", "ID")];
        let strategy = MatchStrategy::ObjectIdentifier(ObjectIdentifier {
            source_id: QueryPath::parse("ref.id").unwrap(),
            result_id: "id".to_string(),
        });

        let projected = project_source_fields(&schema, &arguments, Some(&strategy), None);
        insta::assert_debug_snapshot!(render(&projected), @r###"
        [
            "ref.id",
            "ref.site",
            "ownerId",
        ]
        "###);
    }
}
