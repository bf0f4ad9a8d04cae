// crates/tools/src/probe.rs
// Inspect nonce ticks and check a nonce the way the host would.
//
//   nonce-probe tick --action autosave
//   nonce-probe check --key keys/nonce_master.hex --uid 1 --session abc --action edit 3f9a0c12be
//
// Lifespans come from --config (JSON) or NONCE_LIFE / NONCE_LOGGED_OUT_UID.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noncewin::{
    Action, ConfigHooks, NonceConfig, NonceVerifier, SaltedHmac, StaticSession, Verdict,
};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
struct Opts {
    /// JSON nonce config; environment overrides are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the current tick and the acceptance window for an action.
    Tick {
        /// Omit for the "no action" sentinel (-1).
        #[arg(long)]
        action: Option<String>,
    },
    /// Verify a nonce and print 1, 2 or false.
    Check {
        #[arg(long, default_value = "keys/nonce_master.hex")]
        key: PathBuf,
        #[arg(long)]
        action: Option<String>,
        #[arg(long, default_value_t = 0)]
        uid: u64,
        #[arg(long, default_value = "")]
        session: String,
        nonce: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<NonceConfig> {
    match path {
        Some(p) => NonceConfig::from_json_file(p).with_context(|| format!("load {}", p.display())),
        None => NonceConfig::from_env().context("nonce config from env"),
    }
}

fn action_arg(a: Option<String>) -> Action {
    a.map(Action::from).unwrap_or_default()
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let opts = Opts::parse();
    let hooks = ConfigHooks::new(load_config(opts.config.as_ref())?);

    match opts.cmd {
        Cmd::Tick { action } => {
            let action = action_arg(action);
            // ticks don't depend on the key
            let v = NonceVerifier::new(SaltedHmac::new(Vec::new())).with_hooks(hooks);
            let tick = v.tick(&action)?;
            let w = v.window(&action)?;
            println!("action:     {action}");
            println!("tick:       {tick}");
            println!("bucket:     {:?}", w.bucket());
            println!("fresh for:  up to {:?}", w.fresh_max_age());
            println!("valid for:  {:?} .. {:?}", w.guaranteed(), w.max_age());
        }
        Cmd::Check {
            key,
            action,
            uid,
            session,
            nonce,
        } => {
            let raw = fs::read_to_string(&key).with_context(|| format!("read {}", key.display()))?;
            let hasher = SaltedHmac::from_hex(&raw).context("parse nonce key")?;
            let v = NonceVerifier::new(hasher).with_hooks(hooks);
            let action = action_arg(action);
            let verdict = v.verify(nonce.trim(), &action, &StaticSession::new(uid, session))?;
            println!("{verdict}");
            if verdict == Verdict::Invalid {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
