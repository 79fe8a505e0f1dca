use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType, LocalSecondaryIndex,
    Projection, ProjectionType, ProvisionedThroughput,
};

use crate::provision::{ModelDescriptor, PropertyRole, ScalarKind, SchemaError};

/// A fully derived table schema, ready to be sent as one CreateTable call.
///
/// Has no persistent identity; it is rebuilt from the model on every
/// provisioning run.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    /// Physical table name (prefix + declared name).
    pub table_name: String,
    /// Primary key: Hash entry first, optional Range entry second.
    pub key_schema: Vec<KeySchemaElement>,
    /// Every attribute referenced by the primary key or any index,
    /// deduplicated by attribute name.
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub local_indexes: Vec<LocalSecondaryIndex>,
    pub global_indexes: Vec<GlobalSecondaryIndex>,
    pub throughput: ProvisionedThroughput,
}

/// Derives a [`TableDefinition`] from one model's metadata.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    prefix: String,
}

impl SchemaBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Physical table name for a declared model name.
    pub fn physical_name(&self, declared: &str) -> String {
        format!("{}{}", self.prefix, declared)
    }

    pub fn build(&self, model: &ModelDescriptor) -> Result<TableDefinition, SchemaError> {
        let table_name = self.physical_name(model.table_name());

        let hash = model
            .properties()
            .iter()
            .find(|p| matches!(p.role(), PropertyRole::HashKey { .. }))
            .ok_or_else(|| SchemaError::MissingHashKey {
                table: table_name.clone(),
            })?;
        let hash_name = hash.resolved_name();

        let mut attribute_definitions = Vec::new();
        push_attribute(
            &mut attribute_definitions,
            attribute_definition(hash_name, hash.scalar_kind())?,
        );

        let hash_element = key_element(hash_name, KeyType::Hash)?;
        let mut key_schema = vec![hash_element.clone()];

        let range = model
            .properties()
            .iter()
            .find(|p| matches!(p.role(), PropertyRole::RangeKey { .. }));
        if let Some(range) = range {
            let range_name = range.resolved_name();
            push_attribute(
                &mut attribute_definitions,
                attribute_definition(range_name, range.scalar_kind())?,
            );
            key_schema.push(key_element(range_name, KeyType::Range)?);
        }

        // One projection shared by every index on the table, not tailored
        // per index.
        let projection = shared_projection(model);

        // Local indexes reuse the table's hash entry and only exist on
        // composite-key tables.
        let mut local_indexes = Vec::new();
        if range.is_some() {
            for property in model.properties() {
                let PropertyRole::LocalIndexRange { index_names } = property.role() else {
                    continue;
                };
                // A property usually names one index; extra names are
                // ignored, matching the reference behavior.
                let Some(index_name) = index_names.first() else {
                    continue;
                };
                push_attribute(
                    &mut attribute_definitions,
                    attribute_definition(property.name(), property.scalar_kind())?,
                );
                local_indexes.push(
                    LocalSecondaryIndex::builder()
                        .index_name(index_name.as_str())
                        .key_schema(hash_element.clone())
                        .key_schema(key_element(property.name(), KeyType::Range)?)
                        .projection(projection.clone())
                        .build()?,
                );
            }
        }

        let mut global_indexes = Vec::new();
        for property in model.properties() {
            let PropertyRole::GlobalIndexHash { index_name, .. } = property.role() else {
                continue;
            };
            let gsi_hash_name = property.resolved_name();
            push_attribute(
                &mut attribute_definitions,
                attribute_definition(gsi_hash_name, property.scalar_kind())?,
            );
            let mut gsi_keys = vec![key_element(gsi_hash_name, KeyType::Hash)?];

            // The range key is correlated solely by index-name membership.
            // Zero matches is a valid hash-only index; more than one is a
            // metadata defect.
            let mut candidates = model.properties().iter().filter(|p| {
                matches!(p.role(),
                    PropertyRole::GlobalIndexRange { index_names, .. }
                        if index_names.iter().any(|n| n == index_name))
            });
            let range_property = candidates.next();
            if candidates.next().is_some() {
                return Err(SchemaError::AmbiguousGlobalIndex {
                    table: table_name,
                    index: index_name.clone(),
                });
            }
            if let Some(range_property) = range_property {
                let gsi_range_name = range_property.resolved_name();
                push_attribute(
                    &mut attribute_definitions,
                    attribute_definition(gsi_range_name, range_property.scalar_kind())?,
                );
                gsi_keys.push(key_element(gsi_range_name, KeyType::Range)?);
            }

            global_indexes.push(
                GlobalSecondaryIndex::builder()
                    .index_name(index_name.as_str())
                    .set_key_schema(Some(gsi_keys))
                    .projection(projection.clone())
                    .provisioned_throughput(minimal_throughput()?)
                    .build()?,
            );
        }

        Ok(TableDefinition {
            table_name,
            key_schema,
            attribute_definitions,
            local_indexes,
            global_indexes,
            throughput: minimal_throughput()?,
        })
    }
}

/// Projection shared by all indexes: INCLUDE with every plain attribute,
/// or KEYS_ONLY when the model has none (the control plane rejects an
/// empty INCLUDE list).
fn shared_projection(model: &ModelDescriptor) -> Projection {
    let non_key: Vec<String> = model
        .properties()
        .iter()
        .filter(|p| matches!(p.role(), PropertyRole::Attribute))
        .map(|p| p.name().to_string())
        .collect();

    if non_key.is_empty() {
        Projection::builder()
            .projection_type(ProjectionType::KeysOnly)
            .build()
    } else {
        Projection::builder()
            .projection_type(ProjectionType::Include)
            .set_non_key_attributes(Some(non_key))
            .build()
    }
}

fn attribute_definition(
    name: &str,
    kind: ScalarKind,
) -> Result<AttributeDefinition, BuildError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(kind.attribute_type())
        .build()
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, BuildError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
}

/// Fixed minimal capacity baseline used for the table and every GSI.
fn minimal_throughput() -> Result<ProvisionedThroughput, BuildError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(1)
        .write_capacity_units(1)
        .build()
}

/// The same attribute may back the primary key and an index; definitions
/// are unique per attribute name.
fn push_attribute(definitions: &mut Vec<AttributeDefinition>, definition: AttributeDefinition) {
    if definitions
        .iter()
        .all(|existing| existing.attribute_name() != definition.attribute_name())
    {
        definitions.push(definition);
    }
}
