//! admit: offline operator tool for admission tokens.
//!
//! Everything here works without a ledger connection: generating keys,
//! inspecting addresses and token identities, checking event files and
//! producing or checking ownership challenges.

use std::path::{Path, PathBuf};

use admit_codec::TokenId;
use admit_crypto::{
    decode_address, derive_address, generate_keypair, keypair_from_private, Ed25519Verifier,
    SignatureVerifier,
};
use admit_issuance::{challenge_message, sign_challenge, IssuanceConfig};
use admit_types::{Address, EventDescriptor, PrivateKey, PublicKey, Signature};
use admit_utils::{format_duration, init_logging, LogFormat};
use anyhow::{bail, Context};
use clap::Parser;

#[derive(Parser)]
#[command(name = "admit", about = "Admission token operator tool")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ADMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ADMIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ADMIT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Finality wait for mints, in milliseconds.
    #[arg(long, env = "ADMIT_MINT_TIMEOUT_MS")]
    mint_timeout_ms: Option<u64>,

    /// Finality wait for each claim step, in milliseconds.
    #[arg(long, env = "ADMIT_CLAIM_TIMEOUT_MS")]
    claim_timeout_ms: Option<u64>,

    /// Lifetime of claim offers, in seconds.
    #[arg(long, env = "ADMIT_OFFER_TTL_SECS")]
    offer_ttl_secs: Option<u64>,

    /// Transfer fee for minted tokens (hundredths of a basis point).
    #[arg(long, env = "ADMIT_TRANSFER_FEE")]
    transfer_fee: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate a new key pair and print it with its address.
    Keygen,
    /// Derive the address for a hex public key.
    Address { public_key: String },
    /// Decode a token identity into its fields.
    Decode { token_id: String },
    /// Validate an event JSON file and print its canonical form.
    CheckEvent { file: PathBuf },
    /// Print the challenge an account signs to prove it holds a token.
    Challenge { account: String, token_id: String },
    /// Sign the challenge for (account, token) with a hex private key.
    SignChallenge {
        #[arg(long, env = "ADMIT_PRIVATE_KEY")]
        key: String,
        account: String,
        token_id: String,
    },
    /// Check a challenge signature offline (no ownership check).
    CheckSignature {
        account: String,
        token_id: String,
        signature: String,
    },
    /// Print the effective configuration.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_warning) = match &cli.config {
        Some(path) => match IssuanceConfig::from_toml_file(path) {
            Ok(config) => (config, None),
            Err(e) => (IssuanceConfig::default(), Some(format!("{e}, using defaults"))),
        },
        None => (IssuanceConfig::default(), None),
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("invalid configuration")?;

    init_logging(config.log_format, &config.log_level)
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    if let Some(warning) = load_warning {
        tracing::warn!("{warning}");
    } else if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    let output = run(&cli.command, &config)?;
    println!("{output}");
    Ok(())
}

fn apply_overrides(config: &mut IssuanceConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(ms) = cli.mint_timeout_ms {
        config.mint_finality_timeout_ms = ms;
    }
    if let Some(ms) = cli.claim_timeout_ms {
        config.claim_finality_timeout_ms = ms;
    }
    if let Some(secs) = cli.offer_ttl_secs {
        config.offer_ttl_secs = secs;
    }
    if let Some(fee) = cli.transfer_fee {
        config.transfer_fee = fee;
    }
}

fn run(command: &Command, config: &IssuanceConfig) -> anyhow::Result<String> {
    match command {
        Command::Keygen => {
            let keys = generate_keypair();
            Ok(format!(
                "address:     {}\npublic key:  {}\nprivate key: {}",
                derive_address(&keys.public),
                keys.public.to_hex(),
                hex::encode(keys.private.0),
            ))
        }
        Command::Address { public_key } => {
            let key = PublicKey::from_hex(public_key).context("bad public key")?;
            Ok(derive_address(&key).to_string())
        }
        Command::Decode { token_id } => decode_token(token_id),
        Command::CheckEvent { file } => check_event(file),
        Command::Challenge { account, token_id } => {
            let (account, token) = parse_pair(account, token_id)?;
            let message = challenge_message(&account, &token);
            Ok(String::from_utf8_lossy(&message).into_owned())
        }
        Command::SignChallenge {
            key,
            account,
            token_id,
        } => {
            let (account, token) = parse_pair(account, token_id)?;
            let keys = keypair_from_private(PrivateKey::from_hex(key).context("bad private key")?);
            if derive_address(&keys.public) != account {
                tracing::warn!("key does not belong to {account}; the signature will not verify");
            }
            Ok(sign_challenge(&keys, &account, &token).to_hex())
        }
        Command::CheckSignature {
            account,
            token_id,
            signature,
        } => {
            let (account, token) = parse_pair(account, token_id)?;
            let signature = Signature::from_hex(signature).context("bad signature")?;
            let Some(key) = decode_address(account.as_str()) else {
                bail!("address {account} has a bad checksum");
            };
            let valid = Ed25519Verifier.verify(&challenge_message(&account, &token), &signature, &key);
            Ok(if valid { "valid" } else { "invalid" }.to_string())
        }
        Command::Config => Ok(format!(
            "{}\n# mint finality wait {}, claim step wait {}, queries {}",
            config.to_toml_string()?,
            format_duration(config.mint_finality_timeout()),
            format_duration(config.claim_finality_timeout()),
            format_duration(config.query_timeout()),
        )),
    }
}

fn parse_pair(account: &str, token_id: &str) -> anyhow::Result<(Address, TokenId)> {
    let account = Address::parse(account).context("bad account address")?;
    let token = token_id.parse().context("bad token id")?;
    Ok((account, token))
}

fn decode_token(token_id: &str) -> anyhow::Result<String> {
    let decoded = admit_codec::decode_str(token_id).context("bad token id")?;
    Ok(format!(
        "flags:        {:#06x} ({})\ntransfer fee: {}\nissuer:       {}\ntaxon:        {}\nsequence:     {}",
        decoded.flags.bits(),
        decoded.flags,
        decoded.transfer_fee,
        decoded.issuer,
        decoded.taxon,
        decoded.sequence,
    ))
}

fn check_event(file: &Path) -> anyhow::Result<String> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let event = EventDescriptor::from_json(&json)
        .with_context(|| format!("{} is not a valid event", file.display()))?;
    let canonical = event.to_canonical_json()?;
    let pretty: serde_json::Value = serde_json::from_str(&canonical)?;
    Ok(format!(
        "event {} ok, taxon {}, quantity {}\n{}",
        event.event_id(),
        admit_codec::encode(&event),
        event.quantity(),
        serde_json::to_string_pretty(&pretty)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_crypto::keypair_from_seed;
    use std::io::Write;

    const TOKEN: &str = "000B000074A254BCED2B8E1D5882959CF4FF7B76A2B782E6A050656700000007";

    #[test]
    fn decodes_sample_token() {
        let out = decode_token(TOKEN).unwrap();
        assert!(out.contains("sequence:     7"));
        assert!(out.contains("taxon:        1615301"));
        assert!(out.contains("74A254BCED2B8E1D5882959CF4FF7B76A2B782E6"));
    }

    #[test]
    fn rejects_short_token() {
        assert!(decode_token("000B").is_err());
    }

    #[test]
    fn checks_event_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"eventid": 12345678, "name": "Soccer", "startdate": "2022-11-20 17:30", "quantity": 1000}}"#
        )
        .unwrap();
        let out = check_event(file.path()).unwrap();
        assert!(out.starts_with("event 12345678 ok"));
    }

    #[test]
    fn rejects_event_without_quantity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"eventid": 1, "name": "x", "startdate": "2022-11-20"}}"#).unwrap();
        assert!(check_event(file.path()).is_err());
    }

    #[test]
    fn signed_challenge_checks_out() {
        let keys = keypair_from_seed(&[4u8; 32]);
        let account = derive_address(&keys.public).to_string();
        let config = IssuanceConfig::default();

        let signature = run(
            &Command::SignChallenge {
                key: hex::encode(keys.private.0),
                account: account.clone(),
                token_id: TOKEN.into(),
            },
            &config,
        )
        .unwrap();
        let verdict = run(
            &Command::CheckSignature {
                account,
                token_id: TOKEN.into(),
                signature,
            },
            &config,
        )
        .unwrap();
        assert_eq!(verdict, "valid");
    }

    #[test]
    fn config_output_parses_back() {
        let config = IssuanceConfig::default();
        let out = run(&Command::Config, &config).unwrap();
        assert_eq!(IssuanceConfig::from_toml_str(&out).unwrap(), config);
    }
}
