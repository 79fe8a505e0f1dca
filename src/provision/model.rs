use aws_sdk_dynamodb::types::ScalarAttributeType;
use tracing::warn;

/// Scalar storage type of a model property.
///
/// The store only distinguishes string and numeric attributes for key
/// purposes, so registration follows the same coarse rule the original data
/// layer used: text and calendar timestamps register as `String`, every
/// other value type (booleans included) registers as `Numeric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Numeric,
}

impl ScalarKind {
    pub fn attribute_type(self) -> ScalarAttributeType {
        match self {
            ScalarKind::String => ScalarAttributeType::S,
            ScalarKind::Numeric => ScalarAttributeType::N,
        }
    }
}

/// The role a property plays in the table schema.
///
/// A property has exactly one role. Roles carrying `attribute_name` may
/// override the physical attribute name; `None` means the property name is
/// used as-is. Global index hash and range entries are correlated solely by
/// shared index name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyRole {
    /// Plain non-key attribute; contributes to every index's projection.
    Attribute,
    HashKey {
        attribute_name: Option<String>,
    },
    RangeKey {
        attribute_name: Option<String>,
    },
    /// Range key of one or more local secondary indexes.
    LocalIndexRange {
        index_names: Vec<String>,
    },
    /// Hash key of a global secondary index.
    GlobalIndexHash {
        index_name: String,
        attribute_name: Option<String>,
    },
    /// Range key candidate for the named global secondary indexes.
    GlobalIndexRange {
        index_names: Vec<String>,
        attribute_name: Option<String>,
    },
}

/// One property of a registered model: name, scalar kind, and schema role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    scalar_kind: ScalarKind,
    role: PropertyRole,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, scalar_kind: ScalarKind, role: PropertyRole) -> Self {
        Self {
            name: name.into(),
            scalar_kind,
            role,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scalar_kind(&self) -> ScalarKind {
        self.scalar_kind
    }

    pub fn role(&self) -> &PropertyRole {
        &self.role
    }

    /// The physical attribute name: the explicit override when the role
    /// carries one, the property name otherwise.
    pub fn resolved_name(&self) -> &str {
        let explicit = match &self.role {
            PropertyRole::HashKey { attribute_name }
            | PropertyRole::RangeKey { attribute_name }
            | PropertyRole::GlobalIndexHash { attribute_name, .. }
            | PropertyRole::GlobalIndexRange { attribute_name, .. } => attribute_name.as_deref(),
            PropertyRole::Attribute | PropertyRole::LocalIndexRange { .. } => None,
        };
        explicit.unwrap_or(&self.name)
    }
}

/// Declarative description of one table-backed model type.
///
/// Built with chained registration calls; property declaration order is
/// preserved. The common single-index cases have shorthand methods, while
/// [`ModelDescriptor::property`] accepts a full [`PropertyDescriptor`] for
/// attribute-name overrides or multi-index membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    table_name: String,
    properties: Vec<PropertyDescriptor>,
}

impl ModelDescriptor {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a plain non-key attribute.
    pub fn attribute(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.property(PropertyDescriptor::new(name, kind, PropertyRole::Attribute))
    }

    pub fn hash_key(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.property(PropertyDescriptor::new(
            name,
            kind,
            PropertyRole::HashKey {
                attribute_name: None,
            },
        ))
    }

    pub fn range_key(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.property(PropertyDescriptor::new(
            name,
            kind,
            PropertyRole::RangeKey {
                attribute_name: None,
            },
        ))
    }

    /// Declares the property as the range key of a single local secondary
    /// index.
    pub fn local_index_range(
        self,
        name: impl Into<String>,
        kind: ScalarKind,
        index_name: impl Into<String>,
    ) -> Self {
        self.property(PropertyDescriptor::new(
            name,
            kind,
            PropertyRole::LocalIndexRange {
                index_names: vec![index_name.into()],
            },
        ))
    }

    /// Declares the property as the hash key of a global secondary index.
    pub fn global_index_hash(
        self,
        name: impl Into<String>,
        kind: ScalarKind,
        index_name: impl Into<String>,
    ) -> Self {
        self.property(PropertyDescriptor::new(
            name,
            kind,
            PropertyRole::GlobalIndexHash {
                index_name: index_name.into(),
                attribute_name: None,
            },
        ))
    }

    /// Declares the property as the range key candidate of a single global
    /// secondary index.
    pub fn global_index_range(
        self,
        name: impl Into<String>,
        kind: ScalarKind,
        index_name: impl Into<String>,
    ) -> Self {
        self.property(PropertyDescriptor::new(
            name,
            kind,
            PropertyRole::GlobalIndexRange {
                index_names: vec![index_name.into()],
                attribute_name: None,
            },
        ))
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }
}

/// The set of models eligible for provisioning, in registration order.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model, normalizing structurally malformed metadata.
    ///
    /// An index role declared without any index name cannot produce an
    /// index; the property is demoted to a plain attribute with a warning
    /// instead of aborting registration.
    pub fn register(mut self, mut model: ModelDescriptor) -> Self {
        for property in &mut model.properties {
            let malformed = match &property.role {
                PropertyRole::LocalIndexRange { index_names }
                | PropertyRole::GlobalIndexRange { index_names, .. } => index_names.is_empty(),
                PropertyRole::GlobalIndexHash { index_name, .. } => index_name.is_empty(),
                PropertyRole::Attribute
                | PropertyRole::HashKey { .. }
                | PropertyRole::RangeKey { .. } => false,
            };
            if malformed {
                warn!(
                    "property '{}' on '{}' declares an index role without an index name, \
                     treating it as a plain attribute",
                    property.name, model.table_name
                );
                property.role = PropertyRole::Attribute;
            }
        }
        self.models.push(model);
        self
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }
}
