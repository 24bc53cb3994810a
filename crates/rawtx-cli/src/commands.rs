//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use rawtx_p2p::{BroadcastConfig, Broadcaster, PeerBroadcaster};
use rawtx_primitives::ec::PrivateKey;
use rawtx_primitives::hash::{checksum, hash160};
use rawtx_script::{Address, Network};
use rawtx_transaction::{
    CanonicalPolicy, CanonicalSigner, KeyMaterial, OutPoint, SignedSpend, SpendRequest,
};

use crate::cli::{BuildArgs, ChecksumArgs, NetworkArg, PolicyArg};

/// Build the signed spend and print `<hex>` and `<txid>` on two lines.
pub fn build(args: BuildArgs) -> Result<()> {
    let signed = build_spend(&args)?;
    println!("{}", signed.to_hex());
    println!("{}", signed.txid());

    if args.broadcast {
        let path = args.config.as_ref().context("--broadcast needs --config")?;
        let config = BroadcastConfig::load(path)
            .with_context(|| format!("loading broadcast config {}", path.display()))?;
        if config.network != p2p_network(args.network) {
            bail!(
                "broadcast config is for {} but --network is {}",
                config.network,
                p2p_network(args.network)
            );
        }
        let broadcaster = PeerBroadcaster::new(config)?;
        let success = broadcaster.broadcast(signed.raw())?;
        tracing::info!(peer = %success.peer, txid = %success.txid, "broadcast complete");
    }
    Ok(())
}

pub fn checksum_cmd(args: ChecksumArgs) -> Result<()> {
    let payload = hex::decode(args.payload.trim()).context("payload is not valid hex")?;
    println!("{}", hex::encode(checksum(&payload)));
    Ok(())
}

pub(crate) fn build_spend(args: &BuildArgs) -> Result<SignedSpend> {
    let private_key = parse_private_key(&args.key)?;
    let spender = if args.uncompressed {
        let public_key = private_key.pub_key().to_uncompressed().to_vec();
        let public_key_hash = hash160(&public_key).to_vec();
        KeyMaterial::new(private_key, public_key, public_key_hash)
    } else {
        KeyMaterial::from_private_key(private_key)
    };

    let request = SpendRequest {
        outpoint: args
            .outpoint
            .parse::<OutPoint>()
            .context("invalid --outpoint")?,
        balance: args.balance,
        payment: args.payment,
        fee: args.fee,
        spender,
        recipient_hash: parse_recipient(&args.recipient, script_network(args.network))?,
    };

    let policy = match args.policy {
        PolicyArg::Negate => CanonicalPolicy::Negate,
        PolicyArg::Retry => CanonicalPolicy::Retry {
            max_attempts: args.retry_attempts,
        },
    };
    Ok(request.build_signed(&CanonicalSigner::new(policy))?)
}

/// Accepts 64 hex characters or WIF.
fn parse_private_key(s: &str) -> Result<PrivateKey> {
    let s = s.trim();
    if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return PrivateKey::from_hex(s).context("invalid private key hex");
    }
    PrivateKey::from_wif(s).context("private key is neither 64 hex characters nor WIF")
}

/// Accepts a 40-character hex hash or an address on `network`.
fn parse_recipient(s: &str, network: Network) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() == 40 {
        if let Ok(hash) = hex::decode(s) {
            return Ok(hash);
        }
    }
    let address = Address::from_string(s).context("recipient is neither a hash nor an address")?;
    if address.network != network {
        bail!("recipient address is not a {:?} address", network);
    }
    Ok(address.public_key_hash.to_vec())
}

fn script_network(network: NetworkArg) -> Network {
    match network {
        NetworkArg::Mainnet => Network::Mainnet,
        NetworkArg::Testnet => Network::Testnet,
    }
}

fn p2p_network(network: NetworkArg) -> rawtx_p2p::Network {
    match network {
        NetworkArg::Mainnet => rawtx_p2p::Network::Mainnet,
        NetworkArg::Testnet => rawtx_p2p::Network::Testnet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const KEY_WIF: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";

    fn args() -> BuildArgs {
        BuildArgs {
            key: KEY_HEX.to_string(),
            uncompressed: false,
            recipient: "42".repeat(20),
            outpoint: format!("{}:1", "11".repeat(32)),
            balance: 10_000,
            payment: 1_000,
            fee: 1_000,
            network: NetworkArg::Mainnet,
            policy: PolicyArg::Negate,
            retry_attempts: 8,
            broadcast: false,
            config: None,
        }
    }

    #[test]
    fn test_key_formats_agree() {
        assert_eq!(
            parse_private_key(KEY_HEX).unwrap(),
            parse_private_key(KEY_WIF).unwrap()
        );
        assert!(parse_private_key("not a key").is_err());
    }

    #[test]
    fn test_recipient_hash_or_address() {
        // Hash160 of the generator point, compressed.
        let hash = "751e76e8199196d454941c45d1b3a323f1433bd6";
        let address = Address::from_public_key_hash(
            &hex::decode(hash).unwrap().try_into().unwrap(),
            Network::Mainnet,
        );
        assert_eq!(
            parse_recipient(hash, Network::Mainnet).unwrap(),
            parse_recipient(&address.address_string, Network::Mainnet).unwrap()
        );
        assert!(parse_recipient(&address.address_string, Network::Testnet).is_err());
    }

    #[test]
    fn test_build_spend() {
        let signed = build_spend(&args()).unwrap();
        let tx = signed.tx();
        assert_eq!(tx.outputs[0].satoshis, 1_000);
        assert_eq!(tx.outputs[1].satoshis, 8_000);

        let retry = build_spend(&BuildArgs {
            policy: PolicyArg::Retry,
            ..args()
        })
        .unwrap();
        assert_eq!(retry.digest(), signed.digest());
    }

    #[test]
    fn test_build_spend_uncompressed() {
        let signed = build_spend(&BuildArgs {
            uncompressed: true,
            ..args()
        })
        .unwrap();
        // 65-byte key push makes the unlocking script longer.
        assert!(signed.tx().inputs[0].unlocking_script.len() > 100);
    }

    #[test]
    fn test_build_spend_rejects_overspend() {
        assert!(build_spend(&BuildArgs {
            payment: 9_001,
            ..args()
        })
        .is_err());
    }
}
