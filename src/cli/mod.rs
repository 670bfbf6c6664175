//! CLI argument parsing for devhost.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// devhost: compile one config file into a local Apache + PHP-FPM stack.
///
/// Reads `config.yml` from the project root and generates httpd.conf,
/// per-version php-fpm pools, TLS certificates, and `/etc/hosts` entries.
/// Every command is safe to re-run.
#[derive(Parser, Debug)]
#[command(name = "devhost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project root (default: nearest directory with config.yml, else cwd).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Config file (default: <root>/config.yml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). DEVHOST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands for devhost.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate the config without writing anything.
    ///
    /// Prints every problem found, numbered, each with its fix.
    Check(CheckArgs),

    /// Validate, then write httpd.conf and the php-fpm pool files.
    ///
    /// Files whose content is unchanged are not rewritten.
    Render(RenderArgs),

    /// Ensure every host has a TLS certificate pair.
    ///
    /// Uses mkcert when `server.use_mkcert` is set and mkcert is installed,
    /// otherwise a self-signed openssl certificate.
    Certs,

    /// Ensure one php-fpm worker runs per configured version.
    ///
    /// A worker that is already running is left alone.
    Fpm,

    /// Reconcile the devhost block in /etc/hosts.
    Hosts(HostsArgs),

    /// Print the httpd binary the stack should launch.
    HttpdBin,

    /// Report php-fpm worker and httpd states.
    Status,

    /// Stop running php-fpm workers.
    Stop,

    /// Render, then provision certificates, workers, and hosts entries.
    ///
    /// The last three steps run independently; a failure in one does not
    /// prevent the others.
    Up(UpArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the parsed config back in canonical form.
    #[arg(long)]
    pub dump: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Write httpd.conf here instead of <root>/tmp/httpd.conf.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct HostsArgs {
    /// Hosts file to reconcile.
    #[arg(long, value_name = "FILE", default_value = "/etc/hosts")]
    pub hosts_file: PathBuf,

    /// Print the managed block instead of writing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Remove the managed block instead of updating it.
    #[arg(long, conflicts_with = "dry_run")]
    pub remove: bool,
}

#[derive(Parser, Debug)]
pub struct UpArgs {
    /// Hosts file to reconcile.
    #[arg(long, value_name = "FILE", default_value = "/etc/hosts")]
    pub hosts_file: PathBuf,

    /// Skip the hosts file step.
    #[arg(long)]
    pub no_hosts: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
