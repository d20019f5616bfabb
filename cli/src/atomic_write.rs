use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` in one rename, creating parent directories as needed.
///
/// Readers see either the old file or the complete new one. The written text always ends with a
/// newline.
pub fn write_atomic_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => anyhow::bail!("cannot write config to {}", path.display()),
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("stage config next to {}", path.display()))?;
    staged
        .write_all(contents.as_bytes())
        .context("write staged config")?;
    if !contents.ends_with('\n') {
        staged.write_all(b"\n").context("write staged config")?;
    }
    staged.as_file().sync_all().context("sync staged config")?;

    staged
        .persist(path)
        .map_err(|err| anyhow::Error::new(err.error).context(format!("replace {}", path.display())))?;
    Ok(())
}
