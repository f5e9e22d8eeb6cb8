use std::process::ExitCode;

use chrono::Utc;
use ico_deploy::deployer::{self, ChainDeployer};
use ico_deploy::{logging, shared};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    match deploy().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn deploy() -> anyhow::Result<()> {
    let config = shared::config()?;
    logging::initialize(&config.log_filter);
    info!(
        rpc_url = %config.rpc_url,
        artifacts_dir = %config.artifacts_dir.display(),
        "starting deployment"
    );

    let chain = ChainDeployer::connect(&config).await?;
    info!(sender = %chain.sender(), "connected");

    let deployment = deployer::run(&chain, Utc::now, &mut std::io::stdout()).await?;
    debug!(contracts = ?deployment.contracts(), "deployment complete");
    Ok(())
}
