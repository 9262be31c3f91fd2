//! Sample command line front end for the OXXA registrar API.
//!
//! Not a stable interface; it mostly shows how the library is used.

mod commands;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};
use oxxa_api::{ClientConfig, Credentials, Oxxa, API_URL};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "oxxa", about = "OXXA registrar API command line", version)]
struct Cli {
    /// API user
    #[arg(long, env = "OXXAPY_USER")]
    user: String,

    /// Raw password, or MD5 followed by the hex md5 of the password
    #[arg(long, env = "OXXAPY_PASS", hide_env_values = true)]
    pass: String,

    #[arg(long, default_value = API_URL)]
    api_url: String,

    /// Let the API validate commands without executing them
    #[arg(long)]
    test_mode: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Identities (contact handles)
    #[command(subcommand)]
    Id(ListCommand),

    /// Nameserver groups
    #[command(subcommand)]
    Ns(ListCommand),

    /// Resellers
    #[command(subcommand)]
    Rsl(ListCommand),

    /// Domains
    #[command(subcommand)]
    Dom(DomCommand),

    /// Transfer a domain in using existing handles
    Transfer(TransferArgs),
}

#[derive(Subcommand)]
enum ListCommand {
    /// List handles, sorted by alias
    Ls,
}

#[derive(Subcommand)]
enum DomCommand {
    /// List domains
    Ls {
        #[arg(long)]
        tld: Option<String>,
        #[arg(long)]
        autorenew: Option<bool>,
    },

    /// Check whether a domain is available
    Check { name: String },

    /// Show everything known about a domain
    Info { name: String },
}

#[derive(Args)]
pub struct TransferArgs {
    pub domain: String,
    /// EPP code from the current registrar
    pub key: String,
    pub registrant: String,
    pub admin: String,
    pub tech: String,
    pub billing: String,
    /// Reseller handle, empty for none
    pub reseller: String,
    pub nsgroup: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    ensure!(!cli.user.is_empty(), "no API user given (--user or OXXAPY_USER)");
    ensure!(!cli.pass.is_empty(), "no API password given (--pass or OXXAPY_PASS)");

    let config = ClientConfig {
        api_url: cli.api_url,
        test_mode: cli.test_mode,
        ..ClientConfig::default()
    };
    tracing::debug!(api_url = %config.api_url, test_mode = config.test_mode, "client configured");
    let api = Oxxa::with_config(Credentials::new(cli.user, cli.pass), config);
    let json = cli.json;

    match cli.command {
        Command::Id(ListCommand::Ls) => commands::list_identities(&api, json),
        Command::Ns(ListCommand::Ls) => commands::list_nsgroups(&api, json),
        Command::Rsl(ListCommand::Ls) => commands::list_resellers(&api, json),
        Command::Dom(DomCommand::Ls { tld, autorenew }) => {
            commands::list_domains(&api, tld, autorenew, json)
        }
        Command::Dom(DomCommand::Check { name }) => commands::check_domain(&api, &name, json),
        Command::Dom(DomCommand::Info { name }) => commands::domain_info(&api, &name, json),
        Command::Transfer(args) => commands::transfer_domain(&api, &args, json),
    }
}
