//! launchpad is a CLI tool that deploys compiled EVM contracts to a
//! development node in one command.

mod cli;

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;

use cli::{Cli, Command};
use launchpad_deploy::{Deployer, DeployerBuilder, units};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let mut builder = DeployerBuilder::new();

    if let Some(config) = &cli.config {
        builder = builder.config_file(config.clone());
    }
    if let Some(provider) = &cli.rpc_provider {
        builder = builder.rpc_url(provider.to_rpc_url());
    }
    if let Some(chain_id) = cli.chain_id {
        builder = builder.chain_id(chain_id);
    }
    if let Some(dir) = &cli.artifacts_dir {
        builder = builder.artifacts_dir(dir.clone());
    }
    if let Some(outdata) = &cli.outdata {
        builder = builder.outdata(outdata.clone());
    }
    if let Some(signer) = cli.signer() {
        builder = builder.signer(signer);
    }
    if let Command::Deploy {
        gas_limit: Some(gas_limit),
        ..
    } = &cli.command
    {
        builder = builder.gas_limit(*gas_limit);
    }

    let deployer = builder.build()?;

    match &cli.command {
        Command::Deploy {
            contract,
            constructor_args,
            ..
        } => deploy(&deployer, contract, constructor_args.as_deref()).await,
        Command::Accounts => list_accounts(&deployer).await,
    }
}

async fn deploy(deployer: &Deployer, contract: &str, constructor_args: Option<&str>) -> Result<()> {
    let deployment = deployer.deploy(contract, constructor_args).await?;

    println!("Deployer account: {}", deployment.deployer);
    println!(
        "Account balance: {} ETH",
        units::format_ether(deployment.deployer_balance)
    );
    println!("Contract address: {}", deployment.contract_address);

    Ok(())
}

async fn list_accounts(deployer: &Deployer) -> Result<()> {
    let eth = deployer.connect().await?;
    let accounts = eth.accounts().await?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Address", "Balance (ETH)"]);

    for (index, address) in accounts.iter().enumerate() {
        let balance = eth.balance(*address).await?;
        table.add_row(vec![
            index.to_string(),
            address.to_string(),
            units::format_ether(balance),
        ]);
    }

    println!("{table}");
    Ok(())
}
