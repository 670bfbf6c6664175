//! Implementation of the `devhost httpd-bin` command.

use super::Session;
use crate::error::Result;

/// Execute the `devhost httpd-bin` command.
///
/// Prints `server.httpd_bin`, else `<sbin_dir>/httpd`, else
/// `<apache_prefix>/sbin/httpd`.
pub fn cmd_httpd_bin(session: &Session) -> Result<()> {
    let binary = session.stack.server.httpd_binary();
    if !binary.exists() {
        tracing::warn!(
            path = %binary.display(),
            "httpd binary does not exist; set server.httpd_bin or server.sbin_dir"
        );
    }
    println!("{}", binary.display());
    Ok(())
}
