//! Bootstrap archive packer.
//!
//! Writes a prefix tree into the archive format the installer consumes:
//! regular files as deflated entries keeping their mode bits, symlinks as
//! `link←target` lines in a `SYMLINKS.txt` entry.

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use settings::constants::bootstrap::{MANIFEST_ARROW, MANIFEST_ENTRY};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub files: usize,
    pub symlinks: usize,
}

pub fn pack_bootstrap(source: &Path, output: &Path) -> Result<PackSummary> {
    if !source.is_dir() {
        bail!("{} is not a directory", source.display());
    }
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = ZipWriter::new(file);
    let mut manifest = String::new();
    let mut summary = PackSummary::default();

    walk(source, source, &mut writer, &mut manifest, &mut summary)?;

    if !manifest.is_empty() {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(MANIFEST_ENTRY, options)?;
        writer.write_all(manifest.as_bytes())?;
    }
    writer.finish().context("Failed to finish archive")?;
    Ok(summary)
}

fn walk(
    root: &Path,
    dir: &Path,
    writer: &mut ZipWriter<File>,
    manifest: &mut String,
    summary: &mut PackSummary,
) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    // Deterministic archives
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .context("Entry outside the source tree")?
            .to_string_lossy()
            .replace('\\', "/");
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            let target = std::fs::read_link(&path)?;
            manifest.push_str(&format!("{}{}{}\n", relative, MANIFEST_ARROW, target.display()));
            summary.symlinks += 1;
        } else if file_type.is_dir() {
            walk(root, &path, writer, manifest, summary)?;
        } else if relative != MANIFEST_ENTRY {
            let mode = entry.metadata()?.permissions().mode();
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(mode & 0o777);
            writer.start_file(relative.as_str(), options)?;
            let mut source = File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            std::io::copy(&mut source, writer)?;
            summary.files += 1;
        }
    }
    Ok(())
}
