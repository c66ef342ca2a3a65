use anyhow::Context;
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use jm_wallet_client::cli::{Cli, Commands};
use jm_wallet_client::config::load_client_config;
use jm_wallet_client::http::{CreateWalletRequest, DirectSendRequest, UnlockWalletRequest, WalletRpcClient};
use jm_wallet_client::log::init_logging;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = load_client_config(&cli.config).context("Could not load configuration")?;
    config.apply_args(&cli.client);

    let client = WalletRpcClient::from_config(&config).context("Could not create wallet RPC client")?;
    info!(address:% = client.get_address(); "Using wallet daemon");

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, cancelling request");
            ctrl_c_token.cancel();
        }
    });

    let result = run(&client, cli.command, &cancel).await;
    if let Err(e) = &result {
        error!(error:% = e; "Command failed");
    }
    result
}

async fn run(client: &WalletRpcClient, command: Commands, cancel: &CancellationToken) -> Result<(), anyhow::Error> {
    let cancel = Some(cancel);
    match command {
        Commands::Info => print_json(&client.get_info(cancel).await?),
        Commands::Session => print_json(&client.session(cancel).await?),
        Commands::ListWallets => print_json(&client.list_wallets(cancel).await?),
        Commands::CreateWallet {
            name,
            password,
            wallet_type,
        } => {
            let request = CreateWalletRequest {
                walletname: name,
                password,
                wallettype: wallet_type,
            };
            print_json(&client.create_wallet(request, cancel).await?)
        },
        Commands::Unlock { name, password } => {
            let response = client
                .unlock_wallet(&name, UnlockWalletRequest { password }, cancel)
                .await?;
            print_json(&response)
        },
        Commands::Lock { name } => print_json(&client.lock_wallet(&name, cancel).await?),
        Commands::Display { name } => print_json(&client.display_wallet(&name, cancel).await?),
        Commands::DirectSend {
            name,
            mixdepth,
            amount_sats,
            destination,
        } => {
            let request = DirectSendRequest {
                mixdepth,
                amount_sats,
                destination,
            };
            print_json(&client.direct_send(&name, request, cancel).await?)
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
