//! Symlink manifest shipped inside the bootstrap archive.
//!
//! One pair per line, `link←target`. Zip archives cannot carry symlinks
//! portably, so the bootstrap lists them here and they are created after
//! extraction, in manifest order.

use std::io;
use std::path::{Component, Path};

use settings::constants::bootstrap::MANIFEST_ARROW;

/// One `(link, target)` pair from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkEntry {
    /// Where the link is created, relative to the prefix.
    pub link: String,
    /// What the link points at, written verbatim.
    pub target: String,
}

/// Parse manifest text. Lines without exactly one arrow, or with an empty
/// side, are skipped.
pub fn parse_manifest(content: &str) -> Vec<SymlinkEntry> {
    content
        .lines()
        .filter(|line| line.contains(MANIFEST_ARROW))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(MANIFEST_ARROW).collect();
            let [link, target] = parts.as_slice() else {
                tracing::debug!("Skipping manifest line: {:?}", line);
                return None;
            };
            let (link, target) = (link.trim(), target.trim());
            if link.is_empty() || target.is_empty() {
                return None;
            }
            Some(SymlinkEntry {
                link: link.to_string(),
                target: target.to_string(),
            })
        })
        .collect()
}

/// Create every symlink under `prefix`. Failures are logged and skipped.
///
/// Returns the number of links created.
pub fn create_symlinks(prefix: &Path, entries: &[SymlinkEntry]) -> usize {
    entries
        .iter()
        .filter(|entry| match create_symlink(prefix, entry) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to create symlink {} -> {}: {}",
                    entry.link,
                    entry.target,
                    e
                );
                false
            }
        })
        .count()
}

fn create_symlink(prefix: &Path, entry: &SymlinkEntry) -> io::Result<()> {
    let relative = Path::new(&entry.link);
    let stays_inside = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if !stays_inside {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "link path leaves the prefix",
        ));
    }

    let link_path = prefix.join(relative);
    if let Some(parent) = link_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // symlink_metadata so dangling links are replaced too
    if link_path.symlink_metadata().is_ok() {
        std::fs::remove_file(&link_path)?;
    }

    std::os::unix::fs::symlink(&entry.target, &link_path)
}
