//! Implementation of the `devhost hosts` command.

use super::Session;
use crate::cli::HostsArgs;
use crate::error::Result;
use crate::reconcile::{
    ExternalResource, FileResource, ManagedBlock, ReconcileOutcome, gather_domains, hosts_block,
    reconcile, withdraw,
};

/// Execute the `devhost hosts` command.
pub fn cmd_hosts(session: &Session, args: HostsArgs) -> Result<()> {
    let block = desired_block(session)?;

    if args.dry_run {
        print!("{}", block.render());
        return Ok(());
    }

    let resource = FileResource::new(&args.hosts_file);
    let outcome = if args.remove {
        withdraw(&resource, &block)?
    } else {
        reconcile(&resource, &block)?
    };
    print_outcome(&resource, outcome);
    Ok(())
}

/// The hosts block for the current project.
pub(super) fn desired_block(session: &Session) -> Result<ManagedBlock> {
    let domains = gather_domains(&session.stack, &session.ctx.html_dir)?;
    Ok(hosts_block(&domains))
}

pub(super) fn print_outcome(resource: &dyn ExternalResource, outcome: ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Unchanged => println!("{} already up to date", resource.describe()),
        ReconcileOutcome::Updated => println!("updated {}", resource.describe()),
    }
}
