//! Shared helpers for installer integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use bootstrap::{InstallProgress, Installer, Layout, ProgressReceiver};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

// ============================================================================
// Archive fixtures
// ============================================================================

/// Builds an in-memory bootstrap archive.
#[derive(Default)]
pub struct ArchiveBuilder {
    files: Vec<(String, Vec<u8>)>,
    dirs: Vec<String>,
    symlinks: Vec<(String, String)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_string(), content.as_bytes().to_vec()));
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.dirs.push(name.to_string());
        self
    }

    pub fn symlink(mut self, link: &str, target: &str) -> Self {
        self.symlinks.push((link.to_string(), target.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for dir in &self.dirs {
            writer.add_directory(dir.as_str(), options).unwrap();
        }
        for (name, content) in &self.files {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content).unwrap();
        }
        if !self.symlinks.is_empty() {
            let manifest: String = self
                .symlinks
                .iter()
                .map(|(link, target)| format!("{}←{}\n", link, target))
                .collect();
            writer.start_file("SYMLINKS.txt", options).unwrap();
            writer.write_all(manifest.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// A small but realistic userland.
pub fn sample_archive() -> Vec<u8> {
    ArchiveBuilder::new()
        .dir("bin/")
        .dir("lib/")
        .file("bin/bash", "#!/bin/sh\necho bash\n")
        .file("bin/apt", "#!/bin/sh\necho apt\n")
        .file("lib/libc.so", "\x7fELF")
        .file("etc/tls/cert.pem", "-----BEGIN CERTIFICATE-----\n")
        .symlink("bin/sh", "bash")
        .symlink("bin/pkg", "apt")
        .symlink("lib/libc.so.6", "libc.so")
        .build()
}

// ============================================================================
// Test environment
// ============================================================================

/// Isolated files directory for one install.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub layout: Layout,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(temp_dir.path().join("files"));
        Self { temp_dir, layout }
    }

    pub fn installer(&self, url: String) -> Installer {
        Installer::new(self.layout.clone(), url)
    }

    pub fn prefix_path(&self, relative: &str) -> PathBuf {
        self.layout.prefix().join(relative)
    }

    /// Mark the layout as installed at `version`.
    pub fn write_marker(&self, version: &str) {
        std::fs::create_dir_all(self.layout.prefix()).unwrap();
        std::fs::write(self.layout.version_marker(), version).unwrap();
    }
}

/// Every file and directory under `root`, sorted.
pub fn tree(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            out.push(path.clone());
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                walk(&path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}

/// Drain all progress events already sent.
pub fn drain(rx: &mut ProgressReceiver) -> Vec<InstallProgress> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
