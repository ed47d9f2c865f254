//! Virtual type mapping.
//!
//! A virtual type exists only in the unified schema. The mapper pairs it,
//! and every object type nested under it, with the backing types that
//! actually serve the data.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use weave_schema::Schema;

/// Bidirectional type name table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTypeMapping {
    pub virtual_to_backing: IndexMap<String, String>,
    pub backing_to_virtual: IndexMap<String, String>,
}

impl VirtualTypeMapping {
    /// Records a pair. The first mapping of a name wins.
    fn insert(&mut self, virtual_type: &str, backing_type: &str) {
        self.virtual_to_backing
            .entry(virtual_type.to_string())
            .or_insert_with(|| backing_type.to_string());
        self.backing_to_virtual
            .entry(backing_type.to_string())
            .or_insert_with(|| virtual_type.to_string());
    }

    pub fn backing_type(&self, virtual_type: &str) -> Option<&str> {
        self.virtual_to_backing.get(virtual_type).map(String::as_str)
    }

    pub fn virtual_type(&self, backing_type: &str) -> Option<&str> {
        self.backing_to_virtual.get(backing_type).map(String::as_str)
    }
}

/// Maps `virtual_type` onto `backing_type` and recurses into same-named
/// object fields.
///
/// Hydrated fields are skipped, as are virtual fields without a backing
/// counterpart.
pub fn map_virtual_types(
    schema: &Schema,
    virtual_type: &str,
    backing_type: &str,
) -> VirtualTypeMapping {
    let mut mapping = VirtualTypeMapping::default();
    let mut visited = FxHashSet::default();
    collect_mappings(schema, virtual_type, backing_type, &mut visited, &mut mapping);
    mapping
}

fn collect_mappings<'a>(
    schema: &'a Schema,
    virtual_type: &'a str,
    backing_type: &'a str,
    visited: &mut FxHashSet<(&'a str, &'a str)>,
    mapping: &mut VirtualTypeMapping,
) {
    if !visited.insert((virtual_type, backing_type)) {
        return;
    }
    mapping.insert(virtual_type, backing_type);

    let (Some(virtual_fields), Some(backing_fields)) =
        (schema.fields_of(virtual_type), schema.fields_of(backing_type))
    else {
        return;
    };

    for field in virtual_fields.values().filter(|field| !field.is_hydrated()) {
        let Some(backing_field) = backing_fields.get(&field.name) else {
            continue;
        };
        let (virtual_child, backing_child) = (field.ty.named_type(), backing_field.ty.named_type());
        if schema.is_output_object(virtual_child) && schema.is_output_object(backing_child) {
            collect_mappings(schema, virtual_child, backing_child, visited, mapping);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_schema::{FieldDef, HydratedDirective, ObjectDef, SchemaBuilder, TypeRef};

    fn schema() -> Schema {
        SchemaBuilder::new()
            .object(
                ObjectDef::new("VirtualUser")
                    .with_field(FieldDef::new("id", TypeRef::named("ID")))
                    .with_field(FieldDef::new(
                        "manager",
                        TypeRef::option(TypeRef::named("VirtualUser")),
                    ))
                    .with_field(FieldDef::new(
                        "team",
                        TypeRef::option(TypeRef::named("VirtualTeam")),
                    ))
                    .with_field(
                        FieldDef::new("avatar", TypeRef::option(TypeRef::named("VirtualImage")))
                            .with_hydrated(HydratedDirective::new("media", "image")),
                    )
                    .with_field(FieldDef::new(
                        "settings",
                        TypeRef::option(TypeRef::named("VirtualSettings")),
                    )),
            )
            .object(
                ObjectDef::new("VirtualTeam")
                    .with_field(FieldDef::new(
                        "members",
                        TypeRef::list(TypeRef::named("VirtualUser")),
                    )),
            )
            .object(ObjectDef::new("VirtualImage"))
            .object(ObjectDef::new("VirtualSettings"))
            .object(
                ObjectDef::new("User")
                    .with_field(FieldDef::new("id", TypeRef::named("ID")))
                    .with_field(FieldDef::new("manager", TypeRef::option(TypeRef::named("User"))))
                    .with_field(FieldDef::new("team", TypeRef::option(TypeRef::named("Team"))))
                    .with_field(FieldDef::new("avatar", TypeRef::option(TypeRef::named("Image")))),
            )
            .object(
                ObjectDef::new("Team")
                    .with_field(FieldDef::new("members", TypeRef::list(TypeRef::named("User")))),
            )
            .object(ObjectDef::new("Image"))
            .build()
    }

    #[test]
    fn test_maps_nested_types() {
        let mapping = map_virtual_types(&schema(), "VirtualUser", "User");
        insta::assert_debug_snapshot!(mapping.virtual_to_backing, @r###"
        {
            "VirtualUser": "User",
            "VirtualTeam": "Team",
        }
        "###);
        assert_eq!(mapping.virtual_type("Team"), Some("VirtualTeam"));
    }

    #[test]
    fn test_skips_hydrated_and_unbacked_fields() {
        let mapping = map_virtual_types(&schema(), "VirtualUser", "User");
        assert_eq!(mapping.backing_type("VirtualImage"), None);
        assert_eq!(mapping.backing_type("VirtualSettings"), None);
    }

    #[test]
    fn test_terminates_on_cycles() {
        // VirtualUser -> VirtualTeam -> VirtualUser and VirtualUser.manager.
        let mapping = map_virtual_types(&schema(), "VirtualUser", "User");
        assert_eq!(mapping.virtual_to_backing.len(), 2);
        assert_eq!(mapping.backing_to_virtual.len(), 2);
    }
}
