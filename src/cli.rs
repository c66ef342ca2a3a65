use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::http::WalletType;

#[derive(Parser)]
#[command(name = "jm-wallet")]
#[command(about = "JoinMarket wallet RPC client", long_about = None)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Path to the configuration file",
        default_value = "data/config.toml"
    )]
    pub config: PathBuf,
    #[command(flatten)]
    pub client: ClientArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings that override the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ClientArgs {
    #[arg(short = 'u', long, global = true, help = "Base URL of the jmwalletd RPC API")]
    pub base_url: Option<String>,
    #[arg(short, long, global = true, env = "JM_TOKEN", hide_env_values = true, help = "Session token")]
    pub token: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Log every request and response")]
    pub log_requests: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the daemon version
    Info,
    /// Show the current session state
    Session,
    /// List the wallet files known to the daemon
    ListWallets,
    /// Create a new wallet and print its token and seed phrase
    CreateWallet {
        #[arg(short, long, help = "Wallet name, the .jmdat suffix is optional")]
        name: String,
        #[arg(short, long, help = "Password to encrypt the wallet file")]
        password: String,
        #[arg(long, help = "Wallet type: sw or sw-fb", default_value_t = WalletType::SegWit)]
        wallet_type: WalletType,
    },
    /// Unlock a wallet and print a fresh session token
    Unlock {
        #[arg(short, long, help = "Wallet name, the .jmdat suffix is optional")]
        name: String,
        #[arg(short, long, help = "Password to decrypt the wallet file")]
        password: String,
    },
    /// Lock a wallet (requires --token)
    Lock {
        #[arg(short, long, help = "Wallet name, the .jmdat suffix is optional")]
        name: String,
    },
    /// Show balances of a wallet (requires --token)
    Display {
        #[arg(short, long, help = "Wallet name, the .jmdat suffix is optional")]
        name: String,
    },
    /// Send funds without a coinjoin (requires --token)
    DirectSend {
        #[arg(short, long, help = "Wallet name, the .jmdat suffix is optional")]
        name: String,
        #[arg(short, long, help = "Mixdepth to spend from", default_value_t = 0)]
        mixdepth: u32,
        #[arg(short, long, help = "Amount in satoshis, 0 sweeps the mixdepth")]
        amount_sats: u64,
        #[arg(short, long, help = "Destination address")]
        destination: String,
    },
}
