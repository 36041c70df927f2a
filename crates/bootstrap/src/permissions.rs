//! Executable bits for the extracted userland.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use util::ResultExt;

use crate::Layout;

pub(crate) const EXECUTABLE_MODE: u32 = 0o755;

/// Binaries that must be runnable even if the recursive pass missed them.
const ESSENTIAL_BINARIES: [&str; 5] = ["bash", "sh", "apt", "dpkg", "pkg"];

/// Set 0755 on everything under `usr/bin` and `usr/lib`, then on the
/// essential binaries. Returns how many paths were updated.
///
/// Failures are logged per path and skipped.
pub fn set_permissions(layout: &Layout) -> usize {
    let mut updated = 0;
    for dir in [layout.bin(), layout.lib()] {
        if !dir.is_dir() {
            continue;
        }
        if chmod(&dir).warn_on_err(format_args!("chmod {}", dir.display())).is_some() {
            updated += 1;
        }
        updated += chmod_recursive(&dir);
    }
    for name in ESSENTIAL_BINARIES {
        let path = layout.bin().join(name);
        if !path.exists() {
            continue;
        }
        if chmod(&path).warn_on_err(format_args!("chmod {}", path.display())).is_some() {
            updated += 1;
        }
    }
    tracing::debug!("Permissions set on {} paths", updated);
    updated
}

fn chmod_recursive(dir: &Path) -> usize {
    let Some(entries) = fs::read_dir(dir).warn_on_err(format_args!("read {}", dir.display())) else {
        return 0;
    };

    let mut updated = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        // Symlinks point into the same tree; chmod would follow them.
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if chmod(&path).warn_on_err(format_args!("chmod {}", path.display())).is_some() {
            updated += 1;
        }
        if file_type.is_dir() {
            updated += chmod_recursive(&path);
        }
    }
    updated
}

pub(crate) fn chmod(path: &Path) -> std::io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))
}
