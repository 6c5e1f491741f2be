//! Persisting transcript snapshots for the `save` command.

use std::fs;
use std::path::Path;

use anyhow::Context;
use banker_conversation::TranscriptSnapshot;
use tracing::info;

/// Write `snapshot` to `path` as pretty-printed JSON, replacing any
/// previous file. Missing parent directories are created.
pub fn write_snapshot(path: &Path, snapshot: &TranscriptSnapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    info!(
        "Saved session {} ({} turns) to {}",
        snapshot.session_id,
        snapshot.turn_count,
        path.display()
    );
    Ok(())
}
