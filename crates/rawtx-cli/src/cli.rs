//! Command-line arguments for `rawtx`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Build, sign and relay single-input P2PKH transactions.
#[derive(Parser, Debug)]
#[command(name = "rawtx", version, propagate_version = true)]
pub struct RawTxCli {
    /// Log output format.
    #[arg(long, global = true, env = "RAWTX_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a signed payment with change back to the spender.
    Build(BuildArgs),
    /// Print the 4-byte envelope checksum of a hex payload.
    Checksum(ChecksumArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Mainnet,
    Testnet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Replace a high S with n - S.
    Negate,
    /// Re-sign with fresh nonces until S is low.
    Retry,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Spender private key, 64 hex characters or WIF.
    #[arg(long, env = "RAWTX_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,

    /// Spend with the uncompressed public key.
    #[arg(long)]
    pub uncompressed: bool,

    /// Recipient public key hash (40 hex characters) or address.
    #[arg(long)]
    pub recipient: String,

    /// Output being spent, as <txid>:<vout>.
    #[arg(long)]
    pub outpoint: String,

    /// Value of the output being spent, in satoshis.
    #[arg(long)]
    pub balance: u64,

    /// Amount paid to the recipient, in satoshis.
    #[arg(long)]
    pub payment: u64,

    /// Fee, in satoshis.
    #[arg(long)]
    pub fee: u64,

    /// Network for address decoding and relay.
    #[arg(long, value_enum, default_value_t = NetworkArg::Mainnet)]
    pub network: NetworkArg,

    #[arg(long, value_enum, default_value_t = PolicyArg::Negate)]
    pub policy: PolicyArg,

    /// Attempts allowed under the retry policy.
    #[arg(long, default_value_t = 8)]
    pub retry_attempts: u32,

    /// Relay the signed transaction to peers.
    #[arg(long, requires = "config")]
    pub broadcast: bool,

    /// Broadcast configuration (JSON).
    #[arg(long, env = "RAWTX_BROADCAST_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Payload as hex.
    pub payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        RawTxCli::command().debug_assert();
    }

    #[test]
    fn parse_build() {
        let cli = RawTxCli::try_parse_from([
            "rawtx",
            "build",
            "--key",
            "00",
            "--recipient",
            "11",
            "--outpoint",
            "22:0",
            "--balance",
            "10000",
            "--payment",
            "1000",
            "--fee",
            "1000",
            "--policy",
            "retry",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.balance, 10_000);
                assert_eq!(args.policy, PolicyArg::Retry);
                assert_eq!(args.network, NetworkArg::Mainnet);
                assert!(!args.broadcast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn broadcast_requires_config() {
        let result = RawTxCli::try_parse_from([
            "rawtx", "build", "--key", "00", "--recipient", "11", "--outpoint", "22:0",
            "--balance", "1", "--payment", "1", "--fee", "0", "--broadcast",
        ]);
        assert!(result.is_err());
    }
}
