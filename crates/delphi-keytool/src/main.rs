//! Operator key tool for the Delphi daemon.
//!
//! Usage:
//!   delphi-keytool keygen
//!   delphi-keytool pubkey <secret-hex>
//!   delphi-keytool sign <secret-hex> <account> <expires_at> <action-json>
//!
//! `sign` prints an envelope ready to pass as the `envelope` parameter of
//! `push_action`. Example action JSON:
//! `{"name":"write","owner":"feeder","value":12345}`.

use anyhow::{bail, Context};
use delphi_crypto::ed25519::SigningKey;
use delphi_types::{AccountName, Action, SignedAction};

const USAGE: &str = "usage:
  delphi-keytool keygen
  delphi-keytool pubkey <secret-hex>
  delphi-keytool sign <secret-hex> <account> <expires_at> <action-json>";

fn keygen() -> anyhow::Result<String> {
    let key = SigningKey::generate();
    let out = serde_json::json!({
        "secret_key": hex::encode(key.to_bytes()),
        "public_key": key.verifying_key().to_hex(),
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

fn pubkey(secret: &str) -> anyhow::Result<String> {
    let key = SigningKey::from_hex(secret).context("secret key")?;
    Ok(key.verifying_key().to_hex())
}

fn sign(secret: &str, account: &str, expires_at: &str, action: &str) -> anyhow::Result<String> {
    let key = SigningKey::from_hex(secret).context("secret key")?;
    let account: AccountName = account.parse().context("account")?;
    let expires_at: u64 = expires_at.parse().context("expires_at")?;
    let action: Action = serde_json::from_str(action).context("action JSON")?;

    let envelope = delphi_crypto::envelope::seal(
        &key,
        SignedAction {
            account,
            action,
            expires_at,
        },
    )?;
    Ok(serde_json::to_string(&envelope)?)
}

fn run(args: &[String]) -> anyhow::Result<String> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["keygen"] => keygen(),
        ["pubkey", secret] => pubkey(secret),
        ["sign", secret, account, expires_at, action] => sign(secret, account, expires_at, action),
        _ => bail!("{USAGE}"),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let out = run(&args)?;
    println!("{out}");
    Ok(())
}
