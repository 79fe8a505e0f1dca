//! # Provisioning Module
//!
//! Derives DynamoDB table schemas from registered data models and drives the
//! create/describe/delete lifecycle against the control plane.
//!
//! ## Components
//!
//! - `ModelRegistry`: Collects `ModelDescriptor` values, the declarative
//!   description of each table-backed model (key roles, index roles, scalar
//!   kinds).
//! - `SchemaBuilder`: Converts one model into a complete `TableDefinition`
//!   (primary key, attribute definitions, local and global secondary
//!   indexes, shared projection).
//! - `TableProvisioner`: Lists existing tables, creates the missing ones,
//!   polls each new table until it reports ACTIVE, and sweeps tables under a
//!   name prefix on the drop path.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let sdk_config = aws_config::load_from_env().await;
//! let provisioner = TableProvisioner::new(&sdk_config);
//!
//! let registry = ModelRegistry::new().register(
//!     ModelDescriptor::new("Advertisements")
//!         .hash_key("AccountId", ScalarKind::String)
//!         .range_key("Id", ScalarKind::String)
//!         .local_index_range("End", ScalarKind::String, "Account_EndDate_Index"),
//! );
//!
//! let builder = SchemaBuilder::new("myapp_");
//! let report = provisioner.provision(&registry, &builder).await?;
//! println!("{report}");
//! ```
//!
//! Data flows one way, registry to builder to provisioner; only the
//! provisioner talks to the network.

mod error;
mod model;
mod provisioner;
mod schema;

pub use error::{ProvisionError, SchemaError};
pub use model::{ModelDescriptor, ModelRegistry, PropertyDescriptor, PropertyRole, ScalarKind};
pub use provisioner::{ProvisioningReport, TableProvisioner};
#[cfg(test)]
pub(crate) use provisioner::{is_missing, tables_under_prefix};
pub use schema::{SchemaBuilder, TableDefinition};
