//! Archive extraction into the prefix.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use settings::constants::{bootstrap, network};

use crate::error::InstallError;
use crate::manifest::{parse_manifest, SymlinkEntry};

/// Extract every file entry of `archive` under `prefix`.
///
/// The manifest entry is parsed instead of written; its pairs are returned
/// for the caller to apply once all files are in place.
pub fn extract_archive(archive: &Path, prefix: &Path) -> Result<Vec<SymlinkEntry>, InstallError> {
    let file = File::open(archive).map_err(InstallError::io("open", archive))?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut symlinks = Vec::new();
    let mut extracted = 0usize;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_string();

        if name == bootstrap::MANIFEST_ENTRY {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(InstallError::io("read", archive))?;
            symlinks.extend(parse_manifest(&content));
            continue;
        }
        if entry.is_dir() {
            continue;
        }

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| InstallError::UnsafeEntry(name.clone()))?;
        let out_path = prefix.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(InstallError::io("create", parent))?;
        }

        // A link left by an earlier install would redirect the write.
        if out_path
            .symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
        {
            std::fs::remove_file(&out_path).map_err(InstallError::io("replace", &out_path))?;
        }

        let mut out = File::create(&out_path).map_err(InstallError::io("create", &out_path))?;
        copy_chunked(&mut entry, &mut out).map_err(InstallError::io("extract", &out_path))?;
        extracted += 1;
    }

    tracing::info!(
        "Extracted {} files, {} symlinks pending",
        extracted,
        symlinks.len()
    );
    Ok(symlinks)
}

/// Copy through a fixed-size buffer.
fn copy_chunked(reader: &mut impl Read, writer: &mut impl Write) -> std::io::Result<u64> {
    let mut buffer = [0u8; network::CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
    }
    writer.flush()?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn copy_chunked_handles_inputs_larger_than_buffer() {
        let data = vec![7u8; network::CHUNK_SIZE * 3 + 11];
        let mut out = Vec::new();
        let copied = copy_chunked(&mut Cursor::new(&data), &mut out).unwrap();
        assert_eq!(copied as usize, data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn extracts_files_and_returns_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("b.zip");
        write_archive(
            &archive,
            &[
                ("bin/", ""),
                ("bin/bash", "#!bash"),
                ("lib/libc.so", "elf"),
                ("SYMLINKS.txt", "bin/sh←bash\n"),
            ],
        );
        let prefix = dir.path().join("usr");

        let links = extract_archive(&archive, &prefix).unwrap();
        assert_eq!(std::fs::read_to_string(prefix.join("bin/bash")).unwrap(), "#!bash");
        assert_eq!(std::fs::read_to_string(prefix.join("lib/libc.so")).unwrap(), "elf");
        assert!(!prefix.join("SYMLINKS.txt").exists());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link, "bin/sh");
    }

    #[test]
    fn replaces_existing_symlink_with_extracted_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("usr");
        std::fs::create_dir_all(prefix.join("bin")).unwrap();
        std::fs::write(prefix.join("bin/bash"), "old").unwrap();
        std::os::unix::fs::symlink("bash", prefix.join("bin/sh")).unwrap();

        let archive = dir.path().join("b.zip");
        write_archive(&archive, &[("bin/bash", "#!bash"), ("bin/sh", "#!sh")]);
        extract_archive(&archive, &prefix).unwrap();

        assert!(!prefix.join("bin/sh").symlink_metadata().unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(prefix.join("bin/sh")).unwrap(), "#!sh");
        assert_eq!(std::fs::read_to_string(prefix.join("bin/bash")).unwrap(), "#!bash");
    }

    #[test]
    fn rejects_entries_escaping_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("b.zip");
        write_archive(&archive, &[("../evil", "x")]);

        let error = extract_archive(&archive, &dir.path().join("usr")).unwrap_err();
        assert!(matches!(error, InstallError::UnsafeEntry(name) if name == "../evil"));
        assert!(!dir.path().join("evil").exists());
    }

    #[test]
    fn garbage_archive_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("b.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let error = extract_archive(&archive, dir.path()).unwrap_err();
        assert_eq!(error.kind(), crate::FailureKind::Extraction);
    }
}
