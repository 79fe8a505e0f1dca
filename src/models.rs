//! Registered data models.
//!
//! Each model is declared once here; adding a table to the system means
//! adding a `ModelDescriptor` to the registry below.

use crate::provision::{ModelDescriptor, ModelRegistry, ScalarKind};

/// All models eligible for provisioning.
pub fn registry() -> ModelRegistry {
    ModelRegistry::new().register(
        ModelDescriptor::new("Advertisements")
            .hash_key("AccountId", ScalarKind::String)
            .range_key("Id", ScalarKind::String)
            // End is a calendar timestamp, so it registers as String.
            .local_index_range("End", ScalarKind::String, "Account_EndDate_Index"),
    )
}
