//! Wallet file name normalization.
//!
//! The daemon identifies wallets by their file name, which always ends in
//! [`WALLET_FILE_SUFFIX`]. Raw names without the suffix are completed rather
//! than rejected.

/// Extension of JoinMarket wallet files.
pub const WALLET_FILE_SUFFIX: &str = ".jmdat";

/// Appends [`WALLET_FILE_SUFFIX`] unless `name` already ends with it.
///
/// ```
/// use jm_wallet_client::http::normalize_wallet_name;
///
/// assert_eq!(normalize_wallet_name("alice"), "alice.jmdat");
/// assert_eq!(normalize_wallet_name("alice.jmdat"), "alice.jmdat");
/// ```
pub fn normalize_wallet_name(name: &str) -> String {
    if name.ends_with(WALLET_FILE_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{WALLET_FILE_SUFFIX}")
    }
}

/// The display name of a wallet file, i.e. without the suffix.
pub fn display_wallet_name(file_name: &str) -> &str {
    file_name.strip_suffix(WALLET_FILE_SUFFIX).unwrap_or(file_name)
}
