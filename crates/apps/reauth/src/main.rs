//! reauth - re-run Google consent for the full scope set
//!
//! Deletes the persisted token, opens the browser consent flow, and checks
//! the new grant against the Tasks API. Run after adding scopes to the OAuth
//! consent screen. Pass `--with-keep` on Workspace accounts to add Keep, and
//! `--with-labels` where the org allows the Drive Labels scope.

use anyhow::{Context, Result};
use lifeops::{
    ClientSecrets, CredentialStore, ServiceCache, TasksClient, TransportConfig, scopes,
};
use log::{error, info, warn};
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn requested_scopes() -> Vec<String> {
    let mut requested = scopes::all();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--with-keep" => requested.push(scopes::KEEP.to_string()),
            "--with-labels" => requested.push(scopes::DRIVE_LABELS.to_string()),
            other => warn!("Ignoring unknown argument {}", other),
        }
    }
    requested
}

fn run() -> Result<()> {
    let config_dir = config::init().context("Failed to initialize config directory")?;
    info!("Using config directory {}", config_dir.display());

    let secrets = ClientSecrets::load()?;
    let transport = TransportConfig::default();
    let store = CredentialStore::installed_app(secrets, None, &transport)?;
    store.revoke_local()?;

    let requested = requested_scopes();
    println!("Requesting {} scopes:", requested.len());
    for scope in &requested {
        println!("  {}", scope);
    }
    println!();

    let acquired = store.acquire(&requested)?;
    if let Some(warning) = &acquired.persist_warning {
        println!("Warning: {}", warning);
    }
    println!("Granted {} scopes:", acquired.credential.scopes.len());
    for scope in &acquired.credential.scopes {
        println!("  {}", scope);
    }

    let cache = ServiceCache::new(Arc::new(store), requested, transport);
    let tasks = TasksClient::new(&cache)?;
    let lists = tasks.list_task_lists()?;
    let titles: Vec<&str> = lists.items.iter().map(|l| l.title.as_str()).collect();
    println!("\nTasks: {} task list(s) {:?}", lists.len(), titles);

    cache.shutdown()?;
    println!("Re-auth complete.");
    Ok(())
}
