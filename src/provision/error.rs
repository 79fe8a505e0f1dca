use aws_sdk_dynamodb::error::BuildError;
use thiserror::Error;

/// Failures while deriving a table definition from a model.
///
/// `MissingHashKey` is non-fatal at the batch level: the provisioner records
/// it in the report and moves on. `AmbiguousGlobalIndex` is a defect in the
/// model's metadata and fails that table's build outright rather than
/// silently picking one candidate.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table '{table}' has no hash key property")]
    MissingHashKey { table: String },

    #[error("global index '{index}' on table '{table}' has more than one range key candidate")]
    AmbiguousGlobalIndex { table: String, index: String },

    #[error(transparent)]
    Definition(#[from] BuildError),
}

/// Failures while driving the control plane.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The bounded poll budget ran out before the table reached the
    /// expected state.
    #[error("gave up polling table '{table}' after {attempts} attempts")]
    PollTimeout { table: String, attempts: usize },

    #[error("control plane request for table '{table}' failed: {source}")]
    ControlPlane {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProvisionError {
    pub(crate) fn control_plane(
        table: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ControlPlane {
            table: table.into(),
            source: source.into(),
        }
    }
}
