//! Managed-block reconciliation of shared files.
//!
//! devhost owns exactly one region of a shared file such as `/etc/hosts`,
//! delimited by a start and an end marker line. Everything outside that
//! region belongs to someone else and is preserved byte for byte.
//!
//! [`merge`] is total: any existing content, including content with
//! orphaned or duplicated markers, yields a file with one well-formed block.
//! Merging a second time with the same block is a no-op.

mod hosts;
mod resource;


pub use hosts::{HOSTS_END_MARKER, HOSTS_START_MARKER, gather_domains, hosts_block};
pub use resource::{ExternalResource, FileResource};

use crate::error::Result;

/// A marker-delimited region and its desired body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedBlock {
    pub start_marker: String,
    pub end_marker: String,
    pub lines: Vec<String>,
}

impl ManagedBlock {
    pub fn new(start_marker: &str, end_marker: &str, lines: Vec<String>) -> Self {
        Self {
            start_marker: start_marker.to_string(),
            end_marker: end_marker.to_string(),
            lines,
        }
    }

    /// Markers and body, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in std::iter::once(&self.start_marker)
            .chain(&self.lines)
            .chain(std::iter::once(&self.end_marker))
        {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Byte range of the current block in `existing`: the last start marker
    /// line through the first end marker line after it.
    fn locate(&self, existing: &str) -> Option<(usize, usize)> {
        let mut offset = 0;
        let mut start = None;
        let mut end = None;

        for line in existing.split_inclusive('\n') {
            let next = offset + line.len();
            let text = line.trim();
            if text == self.start_marker {
                start = Some(offset);
                end = None;
            } else if start.is_some() && end.is_none() && text == self.end_marker {
                end = Some(next);
            }
            offset = next;
        }

        start.zip(end)
    }
}

/// Content of `existing` with its managed block replaced by `block`.
///
/// With no complete block present, the block is appended after one blank
/// line; empty content yields exactly the block.
pub fn merge(existing: &str, block: &ManagedBlock) -> String {
    let rendered = block.render();

    if let Some((start, end)) = block.locate(existing) {
        let mut out = String::with_capacity(existing.len() + rendered.len());
        out.push_str(&existing[..start]);
        out.push_str(&rendered);
        out.push_str(&existing[end..]);
        return out;
    }

    let base = existing.trim_end();
    if base.is_empty() {
        rendered
    } else {
        format!("{}\n\n{}", base, rendered)
    }
}

/// Content of `existing` with its managed block and the blank line that
/// separated it removed. Content without a block is returned unchanged.
pub fn strip(existing: &str, block: &ManagedBlock) -> String {
    let Some((start, end)) = block.locate(existing) else {
        return existing.to_string();
    };

    let before = existing[..start].trim_end();
    let after = &existing[end..];
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.trim_start_matches('\n').to_string(),
        (false, true) => format!("{}\n", before),
        (false, false) => format!("{}\n{}", before, after),
    }
}

/// What a reconcile run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Unchanged,
    Updated,
}

/// Bring `resource` in line with `block`, writing only when content changes.
pub fn reconcile(
    resource: &dyn ExternalResource,
    block: &ManagedBlock,
) -> Result<ReconcileOutcome> {
    let existing = resource.read_current()?.unwrap_or_default();
    let desired = merge(&existing, block);

    if desired == existing {
        tracing::info!(resource = %resource.describe(), "managed block up to date");
        return Ok(ReconcileOutcome::Unchanged);
    }

    resource.write(&desired)?;
    tracing::info!(
        resource = %resource.describe(),
        lines = block.lines.len(),
        "managed block updated"
    );
    Ok(ReconcileOutcome::Updated)
}

/// Take the managed block out of `resource`.
///
/// A resource left empty is removed entirely.
pub fn withdraw(resource: &dyn ExternalResource, block: &ManagedBlock) -> Result<ReconcileOutcome> {
    let Some(existing) = resource.read_current()? else {
        return Ok(ReconcileOutcome::Unchanged);
    };

    let desired = strip(&existing, block);
    if desired == existing {
        return Ok(ReconcileOutcome::Unchanged);
    }

    if desired.trim().is_empty() {
        resource.remove()?;
    } else {
        resource.write(&desired)?;
    }
    tracing::info!(resource = %resource.describe(), "managed block removed");
    Ok(ReconcileOutcome::Updated)
}
