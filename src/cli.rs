use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, Parser};

/// Generate SSL certificate signing requests with subject alternative names.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a private key file to generate a CSR for.
    ///
    /// To generate a key, consider calling 'openssl genrsa -out private.key 4096'
    #[arg(long, value_name = "PRIVATE_KEY_FILE")]
    pub key: Option<PathBuf>,
    /// Domain names to request. First domain is the common name.
    #[arg(
        value_name = "DOMAIN",
        required = true,
        value_parser = clap::value_parser!(OsString)
    )]
    pub domains: Vec<OsString>,
    /// Batch mode, suppress interaction and go with defaults.
    #[arg(long)]
    pub batch: bool,
    /// Two character country code, e.g. "DE".
    #[arg(long)]
    pub country: Option<String>,
    /// Name of province, e.g. "Berlin" or "Texas".
    #[arg(long)]
    pub province: Option<String>,
    /// Name of city, e.g. "Stuttgart".
    #[arg(long)]
    pub city: Option<String>,
    /// Name of your organisation or company.
    #[arg(long, visible_aliases = ["organization", "org"])]
    pub organisation: Option<String>,
    /// Name of organisational unit or subdivision (usually left blank).
    #[arg(long, visible_alias = "ou")]
    pub organisational_unit: Option<String>,
    /// Email address of contact person in your organisation.
    #[arg(long)]
    pub email: Option<String>,
    /// Write the request to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
    /// Overwrite the output file without asking.
    #[arg(long, short)]
    pub force: bool,
    /// the config file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// More logging, repeat for even more.
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}
