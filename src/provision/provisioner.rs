use anyhow::{anyhow, Result};
use aws_sdk_dynamodb::{operation::create_table::CreateTableOutput, types::TableStatus, Client};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::provision::{ModelRegistry, ProvisionError, SchemaBuilder, TableDefinition};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_POLL_ATTEMPTS: usize = 60;
const DELETE_PAUSE: Duration = Duration::from_secs(10);

/// Drives table creation and deletion against the DynamoDB control plane.
///
/// Tables are processed strictly sequentially: one create-then-poll cycle
/// completes before the next table begins, keeping control-plane pressure
/// low. DescribeTable is eventually consistent, so the poll loops treat
/// not-found responses right after a create as propagation delay rather
/// than failure. Both poll loops carry a bounded attempt budget; a table
/// stuck in a non-terminal state surfaces [`ProvisionError::PollTimeout`]
/// instead of spinning forever.
#[derive(Debug)]
pub struct TableProvisioner {
    client: Client,
    poll_interval: Duration,
    max_poll_attempts: usize,
    delete_pause: Duration,
}

impl TableProvisioner {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            poll_interval: POLL_INTERVAL,
            max_poll_attempts: MAX_POLL_ATTEMPTS,
            delete_pause: DELETE_PAUSE,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_poll_attempts(mut self, attempts: usize) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_delete_pause(mut self, pause: Duration) -> Self {
        self.delete_pause = pause;
        self
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> Result<()> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", e);
            anyhow!("Authentication failed")
        })?;
        info!("Authentication successful");
        Ok(())
    }

    /// Lists every table name visible to the client, following pagination.
    pub async fn list_table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut start_name: Option<String> = None;

        loop {
            let mut request = self.client.list_tables();
            if let Some(start) = &start_name {
                request = request.exclusive_start_table_name(start);
            }

            let response = request.send().await?;
            names.extend(response.table_names().iter().cloned());

            start_name = response.last_evaluated_table_name().map(str::to_string);
            if start_name.is_none() {
                break;
            }
        }

        Ok(names)
    }

    /// Builds every registered model and creates the tables that are not
    /// already present.
    ///
    /// Existence is checked before schema derivation, so a model whose
    /// table is already present is skipped without re-validation. Schema
    /// failures (missing hash key, ambiguous global index) become per-table
    /// report lines; they never abort the batch.
    pub async fn provision(
        &self,
        registry: &ModelRegistry,
        builder: &SchemaBuilder,
    ) -> Result<ProvisioningReport> {
        let existing = self.list_table_names().await?;
        let mut report = ProvisioningReport::new();

        for model in registry.models() {
            let name = builder.physical_name(model.table_name());
            if existing.iter().any(|t| t == &name) {
                info!("table '{name}' already exists");
                report.skipped(&name);
                continue;
            }

            match builder.build(model) {
                Ok(definition) => match self.create_and_wait(&definition).await {
                    Ok(detail) => {
                        info!("table '{name}' created and active");
                        report.created(&name, &detail);
                    }
                    Err(err) => {
                        warn!("failed to provision table '{name}': {err:#}");
                        report.failed(&name, &err);
                    }
                },
                Err(err) => {
                    warn!("skipping model '{}': {err}", model.table_name());
                    report.invalid(&name, &err);
                }
            }
        }

        Ok(report)
    }

    /// Creates every definition whose table does not exist yet.
    ///
    /// Running this twice against an unchanged table set issues zero create
    /// calls on the second run.
    pub async fn create_missing_tables(
        &self,
        definitions: &[TableDefinition],
    ) -> Result<ProvisioningReport> {
        let existing = self.list_table_names().await?;
        let mut report = ProvisioningReport::new();

        for definition in definitions {
            self.create_if_missing(&existing, definition, &mut report)
                .await;
        }

        Ok(report)
    }

    async fn create_if_missing(
        &self,
        existing: &[String],
        definition: &TableDefinition,
        report: &mut ProvisioningReport,
    ) {
        let name = &definition.table_name;
        if !is_missing(existing, definition) {
            info!("table '{name}' already exists");
            report.skipped(name);
            return;
        }

        match self.create_and_wait(definition).await {
            Ok(detail) => {
                info!("table '{name}' created and active");
                report.created(name, &detail);
            }
            Err(err) => {
                warn!("failed to provision table '{name}': {err:#}");
                report.failed(name, &err);
            }
        }
    }

    async fn create_and_wait(&self, definition: &TableDefinition) -> Result<String> {
        let output = self.create_table(definition).await?;
        self.wait_for_table_active(&definition.table_name).await?;

        let description = output.table_description();
        let status = description
            .and_then(|d| d.table_status())
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let arn = description.and_then(|d| d.table_arn()).unwrap_or("-");
        Ok(format!("status {status}, arn {arn}"))
    }

    async fn create_table(&self, definition: &TableDefinition) -> Result<CreateTableOutput> {
        let mut request = self
            .client
            .create_table()
            .table_name(&definition.table_name)
            .set_key_schema(Some(definition.key_schema.clone()))
            .set_attribute_definitions(Some(definition.attribute_definitions.clone()))
            .provisioned_throughput(definition.throughput.clone());

        if !definition.local_indexes.is_empty() {
            request = request.set_local_secondary_indexes(Some(definition.local_indexes.clone()));
        }
        if !definition.global_indexes.is_empty() {
            request = request.set_global_secondary_indexes(Some(definition.global_indexes.clone()));
        }

        request.send().await.map_err(Into::into)
    }

    /// Deletes every table whose name starts with `prefix`.
    ///
    /// Each deletion is confirmed by polling until the table is no longer
    /// found, and successive deletes are spaced out to respect control-plane
    /// rate limits. Individual failures are logged and skipped so the sweep
    /// always runs to completion.
    pub async fn drop_all_tables(&self, prefix: &str) -> Result<()> {
        let names = self.list_table_names().await?;
        let targets = tables_under_prefix(&names, prefix);
        info!("dropping {} table(s) under prefix '{prefix}'", targets.len());

        for (position, name) in targets.iter().enumerate() {
            if position > 0 {
                sleep(self.delete_pause).await;
            }
            match self.delete_table(name).await {
                Ok(()) => info!("table '{name}' deleted"),
                Err(err) => warn!("failed to delete table '{name}': {err}"),
            }
        }

        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), ProvisionError> {
        if let Err(err) = self
            .client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
        {
            let service_err = err.into_service_error();
            if service_err.is_resource_not_found_exception() {
                info!("table '{table_name}' already gone");
                return Ok(());
            }
            return Err(ProvisionError::control_plane(table_name, service_err));
        }

        self.wait_for_table_deleted(table_name).await
    }

    async fn wait_for_table_active(&self, table_name: &str) -> Result<(), ProvisionError> {
        for _ in 0..self.max_poll_attempts {
            sleep(self.poll_interval).await;

            match self
                .client
                .describe_table()
                .table_name(table_name)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.table().and_then(|t| t.table_status());
                    info!("table '{table_name}' status: {status:?}");
                    if matches!(status, Some(TableStatus::Active)) {
                        return Ok(());
                    }
                }
                Err(err) => {
                    let service_err = err.into_service_error();
                    if !service_err.is_resource_not_found_exception() {
                        return Err(ProvisionError::control_plane(table_name, service_err));
                    }
                    // Not visible yet; keep polling.
                }
            }
        }

        Err(ProvisionError::PollTimeout {
            table: table_name.to_string(),
            attempts: self.max_poll_attempts,
        })
    }

    async fn wait_for_table_deleted(&self, table_name: &str) -> Result<(), ProvisionError> {
        for _ in 0..self.max_poll_attempts {
            sleep(self.poll_interval).await;

            match self
                .client
                .describe_table()
                .table_name(table_name)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.table().and_then(|t| t.table_status());
                    info!("table '{table_name}' still present: {status:?}");
                }
                Err(err) => {
                    let service_err = err.into_service_error();
                    if service_err.is_resource_not_found_exception() {
                        return Ok(());
                    }
                    return Err(ProvisionError::control_plane(table_name, service_err));
                }
            }
        }

        Err(ProvisionError::PollTimeout {
            table: table_name.to_string(),
            attempts: self.max_poll_attempts,
        })
    }
}

pub(crate) fn is_missing(existing: &[String], definition: &TableDefinition) -> bool {
    !existing.iter().any(|name| name == &definition.table_name)
}

pub(crate) fn tables_under_prefix<'a>(names: &'a [String], prefix: &str) -> Vec<&'a str> {
    names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .map(String::as_str)
        .collect()
}

/// Per-table outcomes of one provisioning run, in processing order.
#[derive(Debug, Default)]
pub struct ProvisioningReport {
    lines: Vec<String>,
}

impl ProvisioningReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub(crate) fn created(&mut self, table: &str, detail: &str) {
        self.push(format!("{table}: created ({detail})"));
    }

    pub(crate) fn skipped(&mut self, table: &str) {
        self.push(format!("{table}: already exists, skipped"));
    }

    pub(crate) fn invalid(&mut self, table: &str, err: &impl fmt::Display) {
        self.push(format!("{table}: invalid schema: {err}"));
    }

    pub(crate) fn failed(&mut self, table: &str, err: &anyhow::Error) {
        self.push(format!("{table}: create failed: {err:#}"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for ProvisioningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
