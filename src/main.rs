use std::env;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use directories::ProjectDirs;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::{confirm, exit_with_msg};

use crate::cert_sign_request::{
    dn::{EnvMap, DN},
    CsrError, CsrRequest,
};

mod cert_sign_request;
mod cli;
mod config;
mod utils;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The only place the process environment is read.
fn snapshot_env() -> EnvMap {
    env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

impl Cli {
    fn dn_overrides(&self) -> DN {
        DN {
            country: self.country.clone(),
            province: self.province.clone(),
            city: self.city.clone(),
            organization: self.organisation.clone(),
            organizational_unit: self.organisational_unit.clone(),
            email: self.email.clone(),
        }
    }
}

/// Asks before the engine gets to clobber an existing output file.
fn confirm_overwrite(cli: &Cli) -> anyhow::Result<()> {
    let Some(out) = cli.out.as_deref() else {
        return Ok(());
    };
    if !out.exists() || cli.force {
        return Ok(());
    }
    if cli.batch {
        anyhow::bail!("{out:?} already exists, pass --force to overwrite it");
    }
    let mut rl = DefaultEditor::new()?;
    if !confirm(&mut rl, &format!("{out:?} already exists. Overwrite? (y/N) "))? {
        exit_with_msg("not overwriting existing request", 1);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let app = ProjectDirs::from("org", "csrgen", "csrgen");
    let config = config::read_config(app.as_ref(), cli.config.as_deref())?;
    let env = snapshot_env();

    let fields = DN::resolve(&config.defaults, &env, &cli.dn_overrides());
    info!(?fields, "resolved subject defaults");
    fields.warn_on_suspicious_values();

    confirm_overwrite(&cli)?;

    let request = CsrRequest {
        key: cli.key,
        domains: cli.domains,
        batch: cli.batch,
        out: cli.out,
        temp_dir: config.temp_dir,
    };
    cert_sign_request::generate_csr(&request, &fields, &env, &config.engine)
        .context("can't create csr")?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let code = err.downcast_ref::<CsrError>().map_or(1, CsrError::exit_code);
        exit_with_msg(&format!("error: {err:#}"), code);
    }
}
