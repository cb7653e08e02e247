/*!
 * keywarden CLI: check, rotate and renew tracked SSH keys
 *
 * Every invocation loads the lifecycle store, reconciles it against the
 * filesystem, dispatches to the requested subcommand and persists the
 * store again. Engines report errors upward; this boundary is the only
 * place that logs them and exits non-zero.
 */

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keywarden::discovery::{self, ScanFilter};
use keywarden::duration::{format_duration, parse_duration};
use keywarden::lifecycle::{
    complete_records, expired_identities, reconcile, renew_keys, rotate_keys, LifecycleStore,
};
use keywarden::{Cipher, SshKeygen};

#[derive(Parser)]
#[command(
    name = "keywarden",
    version,
    about = "Track SSH key expiration; rotate or renew keys once they expire",
    long_about = "keywarden acts as middleware around ssh-keygen, tracking the expiration \
dates that ssh-keygen itself cannot. Expired keys can either be rotated (old pair deleted, \
new pair generated under the same name) or renewed (expiry pushed forward)."
)]
struct Cli {
    /// Path of the lifecycle store (default: ~/.keywarden.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Key directory to scan (default: ~/.ssh)
    #[arg(long, global = true)]
    key_dir: Option<PathBuf>,

    /// Log filter, e.g. debug or keywarden=trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report tracked keys that have expired
    Check,
    /// Delete expired keys and generate fresh pairs under the same names
    Rotate {
        /// Cipher for the new keys
        #[arg(short, long, default_value = "ed25519")]
        cipher: String,
        /// How long the new keys stay valid (<int><s|m|h|d>)
        #[arg(short, long)]
        time: String,
        /// Passphrase for the new keys (used for every rotated key)
        #[arg(short, long)]
        password: String,
        /// Keys to act on; bare names resolve inside the key directory.
        /// Empty means every private key in the key directory.
        #[arg(short, long)]
        subset: Vec<String>,
    },
    /// Push the expiry of tracked keys forward without regenerating them
    Renew {
        /// How much longer the keys stay valid (<int><s|m|h|d>)
        #[arg(short, long)]
        time: String,
        /// Keys to act on; empty means every currently-expired key
        #[arg(short, long)]
        subset: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let store_path = cli
        .config
        .clone()
        .unwrap_or_else(keywarden::lifecycle::default_store_path);
    let key_dir = cli.key_dir.clone().unwrap_or_else(discovery::default_key_dir);

    let store = LifecycleStore::load(&store_path)
        .with_context(|| format!("failed to load store from {}", store_path.display()))?;

    // Keys removed behind our back stop being tracked before anything
    // else runs; persist the cleanup right away so it survives a later
    // subcommand failure.
    let mut store = {
        let reconciled = reconcile(&store);
        if reconciled.len() != store.len() {
            reconciled
                .save(&store_path)
                .context("failed to save store after reconciliation")?;
        }
        reconciled
    };

    match cli.command {
        Command::Check => check(&store),
        Command::Rotate {
            cipher,
            time,
            password,
            subset,
        } => {
            rotate(&mut store, &key_dir, &cipher, &time, &password, &subset)?;
            store
                .save(&store_path)
                .context("failed to save store after rotation")?;
            Ok(())
        }
        Command::Renew { time, subset } => {
            renew(&mut store, &key_dir, &time, &subset)?;
            store
                .save(&store_path)
                .context("failed to save store after renewal")?;
            Ok(())
        }
    }
}

fn check(store: &LifecycleStore) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut expired = expired_identities(store, now);
    expired.sort();

    if expired.is_empty() {
        println!("[+] No expired keys found");
        return Ok(());
    }

    println!("[+] The following keys have expired:");
    for identity in &expired {
        if let Some(record) = store.get(identity) {
            let overdue = now - record.expires_at;
            println!("\t[+] {} (expired {} ago)", identity, format_duration(overdue));
        }
    }

    println!("\n[+] To rotate expired keys, run:");
    println!("\tkeywarden rotate -t <duration> -p <password>");
    println!("\n[+] To renew expired keys, run:");
    println!("\tkeywarden renew -t <duration>");
    Ok(())
}

fn rotate(
    store: &mut LifecycleStore,
    key_dir: &Path,
    cipher: &str,
    time: &str,
    password: &str,
    subset: &[String],
) -> anyhow::Result<()> {
    let horizon = parse_duration(time)?;
    let cipher: Cipher = cipher.parse()?;

    let targets = if subset.is_empty() {
        discovery::ensure_key_dir(key_dir)?;
        discovery::discover_private_keys(key_dir, &ScanFilter::default())?
    } else {
        resolve_subset(subset, key_dir)
    };

    if targets.is_empty() {
        println!("[+] No keys found to rotate");
        return Ok(());
    }

    println!("[+] Rotating keys...");
    let creation_times = rotate_keys(&SshKeygen::new(), &targets, cipher, password)?;
    let records = complete_records(&creation_times, horizon);

    let mut rotated: Vec<_> = records.iter().collect();
    rotated.sort_by(|a, b| a.0.cmp(b.0));
    for (identity, record) in rotated {
        info!(%identity, expires_at = %record.expires_at.to_rfc3339(), "rotated key");
        println!(
            "\t[+] {} rotated, expiration date: {}",
            identity,
            record.expires_at.to_rfc3339()
        );
    }

    store.extend(records);
    println!("[+] The keys have been successfully rotated");
    Ok(())
}

fn renew(
    store: &mut LifecycleStore,
    key_dir: &Path,
    time: &str,
    subset: &[String],
) -> anyhow::Result<()> {
    let extension = parse_duration(time)?;

    let targets = if subset.is_empty() {
        // Default to every key that is expired right now.
        expired_identities(store, Utc::now())
    } else {
        resolve_subset(subset, key_dir)
    };

    if targets.is_empty() {
        println!("[+] No keys to renew");
        return Ok(());
    }

    println!("[+] Renewing keys...");
    let outcome = renew_keys(store, &targets, extension);

    for identity in &outcome.missing {
        warn!(%identity, "not tracked, skipping renewal");
        println!("\t[-] {} is not tracked, skipped", identity);
    }

    let mut renewed: Vec<_> = outcome.renewed.iter().collect();
    renewed.sort_by(|a, b| a.0.cmp(b.0));
    for (identity, record) in renewed {
        println!(
            "\t[+] {} renewed, new expiration date: {}",
            identity,
            record.expires_at.to_rfc3339()
        );
    }

    println!("[+] The keys have been successfully renewed");
    Ok(())
}

/// Resolve `--subset` entries to full private-key paths
///
/// Bare file names land in the key directory; `~` expands to the home
/// directory; anything else passes through unchanged.
fn resolve_subset(subset: &[String], key_dir: &Path) -> Vec<String> {
    subset
        .iter()
        .map(|name| {
            let expanded = expand_tilde(name);
            let path = Path::new(&expanded);
            if path.is_absolute() || path.components().count() > 1 {
                expanded
            } else {
                key_dir.join(path).display().to_string()
            }
        })
        .collect()
}

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}
