// crates/tools/src/gen_keys.rs
// Generate the master secret that nonce hashes are keyed from.
// Refuses to overwrite an existing key unless --force is given: rotating the
// key invalidates every outstanding nonce.

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::OsRng, RngCore};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
struct Opts {
    /// Where to write the hex-encoded 32-byte master secret.
    #[arg(long, default_value = "keys/nonce_master.hex")]
    out: PathBuf,

    /// Overwrite an existing key file.
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let opts = Opts::parse();

    if opts.out.exists() && !opts.force {
        bail!("{} exists; pass --force to rotate", opts.out.display());
    }
    if let Some(dir) = opts.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("mkdir {}", dir.display()))?;
    }

    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    fs::write(&opts.out, hex::encode(secret))
        .with_context(|| format!("write {}", opts.out.display()))?;

    tracing::info!(path = %opts.out.display(), "generated nonce master key");
    println!("Generated nonce key: {}", opts.out.display());
    Ok(())
}
