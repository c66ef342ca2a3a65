//! Request and response bodies of the JoinMarket wallet RPC API.
//!
//! Field names follow the wire format of `jmwalletd` (`/api/v1/...`), which
//! is why some of them are not snake case.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Error body returned by the daemon for every non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInfoResponse {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: bool,
    pub maker_running: bool,
    pub coinjoin_in_process: bool,
    /// `"None"` when no wallet is loaded.
    pub wallet_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWalletsResponse {
    pub wallets: Vec<String>,
}

/// Kind of wallet to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WalletType {
    /// Native segwit.
    #[default]
    #[serde(rename = "sw")]
    SegWit,
    /// Native segwit with fidelity bond support.
    #[serde(rename = "sw-fb")]
    SegWitFidelityBonds,
}

impl Display for WalletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletType::SegWit => write!(f, "sw"),
            WalletType::SegWitFidelityBonds => write!(f, "sw-fb"),
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sw" => Ok(WalletType::SegWit),
            "sw-fb" => Ok(WalletType::SegWitFidelityBonds),
            other => Err(format!("unknown wallet type '{other}', expected 'sw' or 'sw-fb'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub walletname: String,
    pub password: String,
    pub wallettype: WalletType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletResponse {
    pub walletname: String,
    pub token: String,
    pub seedphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockWalletRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockWalletResponse {
    pub walletname: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockWalletResponse {
    pub walletname: String,
    pub already_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDisplayResponse {
    pub walletname: String,
    pub walletinfo: WalletInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub wallet_name: String,
    /// Balance in BTC as a decimal string.
    pub total_balance: String,
    #[serde(default)]
    pub accounts: Vec<AccountInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Mixdepth index as a string.
    pub account: String,
    pub account_balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectSendRequest {
    pub mixdepth: u32,
    pub amount_sats: u64,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectSendResponse {
    pub txinfo: TxInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    pub hex: String,
    pub txid: String,
    #[serde(default)]
    pub inputs: Vec<TxInput>,
    #[serde(default)]
    pub outputs: Vec<TxOutput>,
    #[serde(rename = "nLockTime")]
    pub lock_time: u32,
    #[serde(rename = "nVersion")]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub outpoint: String,
    #[serde(rename = "scriptSig")]
    pub script_sig: String,
    #[serde(rename = "nSequence")]
    pub sequence: u32,
    #[serde(default)]
    pub witness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value_sats: u64,
    #[serde(rename = "scriptPubKey")]
    pub script_pubkey: String,
    #[serde(default)]
    pub address: Option<String>,
}
