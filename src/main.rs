mod config;
mod logging;
mod models;
mod provision;

use anyhow::Result;
use tracing::info;

use crate::provision::{SchemaBuilder, TableProvisioner};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;
    dotenv::dotenv().ok();

    let config = config::Config::from_env();
    let sdk_config = aws_config::load_from_env().await;
    let provisioner = TableProvisioner::new(&sdk_config);

    provisioner.check_auth().await?;

    let command = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "create".to_string());

    match command.as_str() {
        "create" => {
            let registry = models::registry();
            let builder = SchemaBuilder::new(&config.table_prefix);
            let report = provisioner.provision(&registry, &builder).await?;
            info!("provisioning finished:\n{report}");
        }
        "drop" => {
            provisioner.drop_all_tables(&config.table_prefix).await?;
            info!("drop sweep finished");
        }
        other => anyhow::bail!("unknown command '{other}' (expected 'create' or 'drop')"),
    }

    Ok(())
}
