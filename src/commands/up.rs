//! Implementation of the `devhost up` command.
//!
//! Renders first; a render failure stops everything. Certificates, workers,
//! and the hosts block are then provisioned as independent steps: each runs
//! even if an earlier one failed, and the first failure decides the exit.

use super::{Session, certs, fpm, hosts, render};
use crate::cli::UpArgs;
use crate::error::{DevhostError, Result};
use crate::exec::SystemRunner;
use crate::lifecycle::{EnsureOutcome, SystemLauncher};
use crate::probe::SystemProbe;
use crate::reconcile::{FileResource, reconcile};

/// Execute the `devhost up` command.
pub fn cmd_up(session: &Session, args: UpArgs) -> Result<()> {
    let rctx = session.render_context();

    let written = render::write_artifacts(session, &rctx, None)?;
    let changed = written.iter().filter(|(_, changed)| *changed).count();
    println!("render: {} file(s) written, {} unchanged", changed, written.len() - changed);

    let mut failures: Vec<(&str, DevhostError)> = Vec::new();

    match certs::provision(session, &SystemProbe, &SystemRunner) {
        Ok(outcomes) => {
            for (host, outcome) in outcomes {
                println!("certs: {}: {}", host, outcome.describe());
            }
        }
        Err(e) => failures.push(("certs", e)),
    }

    match fpm::ensure_workers(session, &rctx, &SystemProbe, &SystemLauncher) {
        Ok(outcomes) => {
            for (id, outcome) in outcomes {
                let state = match outcome {
                    EnsureOutcome::AlreadyRunning { .. } => "already running",
                    EnsureOutcome::Launched { .. } => "started",
                };
                println!("fpm: php-fpm {}: {}", id, state);
            }
        }
        Err(e) => failures.push(("fpm", e)),
    }

    if !args.no_hosts {
        let resource = FileResource::new(&args.hosts_file);
        let result = hosts::desired_block(session).and_then(|block| reconcile(&resource, &block));
        match result {
            Ok(outcome) => hosts::print_outcome(&resource, outcome),
            Err(e) => failures.push(("hosts", e)),
        }
    }

    let mut failures = failures.into_iter();
    let Some((step, first)) = failures.next() else {
        return Ok(());
    };
    for (other, err) in failures {
        tracing::error!(step = other, "{}", err);
    }
    tracing::debug!(step, "first failing step");
    Err(first)
}
