//! Implementation of the `devhost render` command.

use super::Session;
use crate::error::Result;
use crate::fs::write_if_changed;
use crate::render::{PoolPaths, RenderContext, render};
use std::path::{Path, PathBuf};

/// Execute the `devhost render` command.
pub fn cmd_render(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let written = write_artifacts(session, &session.render_context(), output.as_deref())?;
    for (path, changed) in written {
        let status = if changed { "wrote" } else { "unchanged" };
        println!("{:9} {}", status, path.display());
    }
    Ok(())
}

/// Render every artifact and write the ones whose content changed.
///
/// Also creates the directories the rendered stack points at: logs,
/// certificates, the pid file's parent, and every host's document root and
/// log folder. Returns each artifact path with whether it was written.
pub(super) fn write_artifacts(
    session: &Session,
    rctx: &RenderContext,
    output: Option<&Path>,
) -> Result<Vec<(PathBuf, bool)>> {
    session.ctx.ensure_layout(&stack_directories(session))?;

    let artifacts = render(&session.model, rctx);
    let mut written = Vec::new();

    let main_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| session.ctx.httpd_conf_path());
    let changed = write_if_changed(&main_path, &artifacts.main_document)?;
    written.push((main_path, changed));

    let server = &session.stack.server;
    let root = &session.ctx.root;
    for (id, pool) in &artifacts.per_runtime {
        let path = PoolPaths::new(root, server, id).config;
        let changed = write_if_changed(&path, pool)?;
        written.push((path, changed));
    }

    Ok(written)
}

fn stack_directories(session: &Session) -> Vec<PathBuf> {
    let server = &session.stack.server;
    let root = &session.ctx.root;
    let log_dir = server.log_dir(root);

    let mut dirs = vec![log_dir.clone(), server.ssl_dir(root)];
    dirs.extend(server.pid_file(root).parent().map(Path::to_path_buf));
    for host in &session.stack.hosts {
        dirs.push(host.document_root(root));
        dirs.push(log_dir.join(&host.name));
    }
    dirs
}
