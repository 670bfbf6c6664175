//! Implementation of the `devhost certs` command.

use super::Session;
use crate::certs::{CertOutcome, CertPolicy, CertificateProvisioner};
use crate::error::Result;
use crate::exec::{CommandRunner, SystemRunner};
use crate::probe::{FsProbe, SystemProbe};

/// Execute the `devhost certs` command.
pub fn cmd_certs(session: &Session) -> Result<()> {
    for (host, outcome) in provision(session, &SystemProbe, &SystemRunner)? {
        println!("{}: {}", host, outcome.describe());
    }
    Ok(())
}

/// Ensure a certificate pair for every host, in declaration order.
pub(super) fn provision(
    session: &Session,
    probe: &dyn FsProbe,
    runner: &dyn CommandRunner,
) -> Result<Vec<(String, CertOutcome)>> {
    let server = &session.stack.server;
    let provisioner = CertificateProvisioner::new(
        server.ssl_dir(&session.ctx.root),
        server.domain_suffix.clone(),
        CertPolicy::from_server(server),
        probe,
        runner,
    );

    session
        .stack
        .hosts
        .iter()
        .map(|host| Ok((host.name.clone(), provisioner.ensure(&host.name)?)))
        .collect()
}
