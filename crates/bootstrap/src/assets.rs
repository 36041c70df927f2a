//! Scripts and dotfiles written after extraction.
//!
//! Templates use `@PREFIX@`, `@HOME@` and `@VERSION@` placeholders, filled
//! in from the [`Layout`] at install time.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::permissions::chmod;
use crate::Layout;

/// API commands shimmed into `usr/bin`.
pub const API_COMMANDS: [&str; 41] = [
    "termux-clipboard-get",
    "termux-clipboard-set",
    "termux-toast",
    "termux-notification",
    "termux-notification-remove",
    "termux-vibrate",
    "termux-brightness",
    "termux-volume",
    "termux-battery-status",
    "termux-wifi-connectioninfo",
    "termux-wifi-scaninfo",
    "termux-location",
    "termux-sensor",
    "termux-camera-info",
    "termux-camera-photo",
    "termux-microphone-record",
    "termux-media-player",
    "termux-media-scan",
    "termux-tts-speak",
    "termux-tts-engines",
    "termux-telephony-deviceinfo",
    "termux-telephony-cellinfo",
    "termux-sms-list",
    "termux-sms-send",
    "termux-sms-inbox",
    "termux-contact-list",
    "termux-call-log",
    "termux-fingerprint",
    "termux-dialog",
    "termux-download",
    "termux-open",
    "termux-open-url",
    "termux-share",
    "termux-torch",
    "termux-wallpaper",
    "termux-audio-info",
    "termux-usb",
    "termux-wake-lock",
    "termux-wake-unlock",
    "termux-job-scheduler",
    "termux-storage-get",
];

const AM_WRAPPER: &str = r#"#!@PREFIX@/bin/bash
exec dalvikvm -Xcompiler-option --compiler-filter=speed -classpath @PREFIX@/lib/apk/termux-am.apk com.termux.am.Am "$@"
"#;

const API_PLACEHOLDER: &str = r#"#!@PREFIX@/bin/bash
# @NAME@ - Termux API command
# Sends a broadcast to the Termux API receiver

export LD_LIBRARY_PATH=@PREFIX@/lib
export PATH=@PREFIX@/bin:$PATH

am broadcast --user 0 -a com.termux.api.API_CALL \
    -n com.termux/.TermuxApiReceiver \
    --es api_method "@NAME@" \
    "$@"
"#;

const MEMORY_SCRIPT: &str = r#"#!@PREFIX@/bin/bash
# MobileCLI assistant memory

MEMORY_DIR="$HOME/.mobilecli/memory"

case "$1" in
    show|view)
        echo "=== MobileCLI Memory ==="
        for f in "$MEMORY_DIR"/*.json; do
            [ -f "$f" ] && echo "$(basename "$f"): $(cat "$f")"
        done
        ;;
    clear)
        echo "Clearing memory..."
        rm -f "${MEMORY_DIR:?}"/*.json
        echo "Memory cleared."
        ;;
    *)
        echo "Usage: mobilecli-memory [show|clear]"
        ;;
esac
"#;

const CAPS_SCRIPT: &str = r#"#!@PREFIX@/bin/bash
# MobileCLI capabilities reference

echo "=== MobileCLI Capabilities ==="
echo ""
echo "Termux API Commands:"
echo "  termux-clipboard-get/set   - Clipboard access"
echo "  termux-toast \"message\"     - Show toast"
echo "  termux-notification        - Send notification"
echo "  termux-vibrate             - Vibrate phone"
echo "  termux-camera-photo        - Take photo"
echo "  termux-location            - Get GPS location"
echo "  termux-battery-status      - Battery info"
echo "  termux-wifi-connectioninfo - WiFi info"
echo ""
echo "Development Tools:"
echo "  openjdk-17, gradle, git (run install-dev-tools)"
echo ""
echo "Storage:"
echo "  ~/                - Home directory"
echo "  /sdcard/Download/ - User downloads"
"#;

const DEV_TOOLS_SCRIPT: &str = r#"#!@PREFIX@/bin/bash
# Install development tools for MobileCLI

echo "Installing development tools..."
pkg update -y
pkg upgrade -y
pkg install -y openjdk-17 gradle git

echo ""
echo "Development tools installed!"
echo "  - Java 17 (OpenJDK)"
echo "  - Gradle"
echo "  - Git"
"#;

const NPMRC: &str = "prefix=@PREFIX@
cache=@HOME@/.npm-cache
init-module=@HOME@/.npm-init.js
";

const GITCONFIG: &str = "[user]
    name = MobileCLI User
    email = user@mobilecli.app
[core]
    editor = nano
[credential]
    helper = store
";

const BASHRC: &str = r#"# MobileCLI .bashrc
# Generated by the bootstrap installer

export HOME=@HOME@
export PREFIX=@PREFIX@
export PATH=$PREFIX/bin:$PATH
export LD_LIBRARY_PATH=$PREFIX/lib
export TERMUX_VERSION=@TERMUX_VERSION@
export LANG=en_US.UTF-8

# Power mode
if [ -f "$HOME/.claude_power_mode" ]; then
    alias claude='claude --dangerously-skip-permissions'
fi

PS1='\[\e[32m\]\u@mobilecli\[\e[0m\]:\[\e[34m\]\w\[\e[0m\]$ '

alias ll='ls -la'
alias cls='clear'
alias home='cd $HOME'

echo "Welcome to MobileCLI v@VERSION@"
echo "Type 'mobilecli-caps' for available commands"
"#;

const ASSISTANT_GUIDE: &str = r#"# MobileCLI - AI Assistant Guide

You are running inside MobileCLI on a phone.

## File Access

| Path | Use For |
|------|---------|
| ~/   | Your working directory |
| /sdcard/Download/ | **Save files here for the user to access** |
| /sdcard/DCIM/ | Photos |
| /sdcard/Documents/ | Documents |

## Available Commands

| Command | Description |
|---------|-------------|
| termux-clipboard-get | Read clipboard |
| termux-clipboard-set | Write clipboard |
| termux-toast "msg" | Show toast |
| termux-notification -t "title" -c "text" | Send notification |
| termux-open-url URL | Open browser |
| termux-vibrate | Vibrate phone |
| termux-camera-photo path | Take photo |
| termux-battery-status | Battery info |
| termux-wifi-connectioninfo | WiFi info |
| termux-tts-speak "text" | Text to speech |
| termux-wake-lock | Keep CPU awake |

## Tips

1. Save user files to /sdcard/Download/
2. Use `pkg install` to add packages
3. Use termux-wake-lock for long tasks
4. `mobilecli-memory show` lists what earlier sessions learned
"#;

/// Seed content of the assistant memory store.
pub const MEMORY_FILES: [(&str, &str); 5] = [
    ("evolution_history.json", "[]"),
    ("problems_solved.json", "[]"),
    (
        "capabilities.json",
        r#"{"terminal":true,"api":true,"development":true}"#,
    ),
    ("goals.json", "[]"),
    ("preferences.json", "{}"),
];

/// Writes the post-extraction files for one layout.
pub struct AssetWriter<'a> {
    layout: &'a Layout,
    assets_dir: Option<&'a Path>,
    version: &'a str,
}

impl<'a> AssetWriter<'a> {
    pub fn new(layout: &'a Layout, assets_dir: Option<&'a Path>, version: &'a str) -> Self {
        Self {
            layout,
            assets_dir,
            version,
        }
    }

    fn render(&self, template: &str) -> String {
        let short_version = self
            .version
            .strip_prefix("mobilecli-v")
            .unwrap_or(self.version);
        template
            .replace("@PREFIX@", &self.layout.prefix().to_string_lossy())
            .replace("@HOME@", &self.layout.home().to_string_lossy())
            .replace("@VERSION@", short_version)
            .replace(
                "@TERMUX_VERSION@",
                settings::constants::bootstrap::TERMUX_VERSION,
            )
    }

    fn asset(&self, relative: &str) -> Option<PathBuf> {
        let path = self.assets_dir?.join(relative);
        path.is_file().then_some(path)
    }

    /// Activity-manager helper: bundled apk when available, plus the wrapper.
    pub fn install_activity_manager(&self) -> Result<(), InstallError> {
        match self.asset("termux-am/am.apk") {
            Some(apk) => {
                let apk_dir = self.layout.lib().join("apk");
                fs::create_dir_all(&apk_dir).map_err(InstallError::io("create", &apk_dir))?;
                let dest = apk_dir.join("termux-am.apk");
                fs::copy(&apk, &dest).map_err(InstallError::io("copy", &dest))?;
            }
            None => tracing::warn!("termux-am apk not bundled, am wrapper will not run"),
        }
        write_executable(&self.layout.bin().join("am"), &self.render(AM_WRAPPER))
    }

    /// API shims: bundled scripts when present, broadcast placeholders otherwise.
    pub fn install_api_scripts(&self) -> Result<(), InstallError> {
        let mut bundled = 0;
        for name in API_COMMANDS {
            let dest = self.layout.bin().join(name);
            match self.asset(&format!("scripts/{}", name)) {
                Some(source) => {
                    fs::copy(&source, &dest).map_err(InstallError::io("copy", &dest))?;
                    chmod(&dest).map_err(InstallError::io("chmod", &dest))?;
                    bundled += 1;
                }
                None => {
                    let script = self.render(API_PLACEHOLDER).replace("@NAME@", name);
                    write_executable(&dest, &script)?;
                }
            }
        }
        tracing::info!(
            "API scripts installed ({} bundled, {} placeholders)",
            bundled,
            API_COMMANDS.len() - bundled
        );
        Ok(())
    }

    pub fn install_helper_scripts(&self) -> Result<(), InstallError> {
        for (name, template) in [
            ("mobilecli-memory", MEMORY_SCRIPT),
            ("mobilecli-caps", CAPS_SCRIPT),
            ("install-dev-tools", DEV_TOOLS_SCRIPT),
        ] {
            write_executable(&self.layout.bin().join(name), &self.render(template))?;
        }
        Ok(())
    }

    pub fn write_npmrc(&self) -> Result<(), InstallError> {
        write_file(&self.layout.home().join(".npmrc"), &self.render(NPMRC))
    }

    /// `.gitconfig`, left alone when the user already has one.
    pub fn write_gitconfig(&self) -> Result<(), InstallError> {
        write_if_absent(&self.layout.home().join(".gitconfig"), GITCONFIG)
    }

    /// Memory store seed files, each written only if absent.
    pub fn init_memory(&self) -> Result<(), InstallError> {
        let dir = self.layout.memory_dir();
        fs::create_dir_all(&dir).map_err(InstallError::io("create", &dir))?;
        for (name, content) in MEMORY_FILES {
            write_if_absent(&dir.join(name), content)?;
        }
        Ok(())
    }

    pub fn write_bashrc(&self) -> Result<(), InstallError> {
        write_file(&self.layout.home().join(".bashrc"), &self.render(BASHRC))
    }

    pub fn write_assistant_guide(&self) -> Result<(), InstallError> {
        write_file(&self.layout.home().join("CLAUDE.md"), ASSISTANT_GUIDE)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), InstallError> {
    fs::write(path, content).map_err(InstallError::io("write", path))
}

fn write_if_absent(path: &Path, content: &str) -> Result<(), InstallError> {
    if path.exists() {
        return Ok(());
    }
    write_file(path, content)
}

fn write_executable(path: &Path, content: &str) -> Result<(), InstallError> {
    write_file(path, content)?;
    chmod(path).map_err(InstallError::io("chmod", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn prepared() -> (tempfile::TempDir, Layout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        layout.prepare().unwrap();
        (dir, layout)
    }

    #[test]
    fn api_commands_are_unique() {
        let mut names = API_COMMANDS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), API_COMMANDS.len());
    }

    #[test]
    fn placeholders_broadcast_their_method() {
        let (_dir, layout) = prepared();
        AssetWriter::new(&layout, None, "mobilecli-v162")
            .install_api_scripts()
            .unwrap();

        let script = fs::read_to_string(layout.bin().join("termux-toast")).unwrap();
        assert!(script.contains("com.termux.api.API_CALL"));
        assert!(script.contains(r#"--es api_method "termux-toast""#));
        assert!(script.starts_with(&format!("#!{}/bin/bash", layout.prefix().display())));
        let mode = fs::metadata(layout.bin().join("termux-toast"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn bundled_scripts_win_over_placeholders() {
        let (dir, layout) = prepared();
        let assets = dir.path().join("assets");
        fs::create_dir_all(assets.join("scripts")).unwrap();
        fs::write(assets.join("scripts/termux-vibrate"), "#!/bin/sh\necho real\n").unwrap();

        AssetWriter::new(&layout, Some(&assets), "mobilecli-v162")
            .install_api_scripts()
            .unwrap();
        assert_eq!(
            fs::read_to_string(layout.bin().join("termux-vibrate")).unwrap(),
            "#!/bin/sh\necho real\n"
        );
        assert!(fs::read_to_string(layout.bin().join("termux-torch"))
            .unwrap()
            .contains("api_method"));
    }

    #[test]
    fn am_wrapper_written_without_apk() {
        let (_dir, layout) = prepared();
        AssetWriter::new(&layout, None, "v1")
            .install_activity_manager()
            .unwrap();
        let wrapper = fs::read_to_string(layout.bin().join("am")).unwrap();
        assert!(wrapper.contains("lib/apk/termux-am.apk"));
        assert!(!layout.lib().join("apk/termux-am.apk").exists());
    }

    #[test]
    fn bundled_apk_is_copied() {
        let (dir, layout) = prepared();
        let assets = dir.path().join("assets");
        fs::create_dir_all(assets.join("termux-am")).unwrap();
        fs::write(assets.join("termux-am/am.apk"), b"PK").unwrap();

        AssetWriter::new(&layout, Some(&assets), "v1")
            .install_activity_manager()
            .unwrap();
        assert_eq!(
            fs::read(layout.lib().join("apk/termux-am.apk")).unwrap(),
            b"PK"
        );
    }

    #[test]
    fn gitconfig_and_memory_are_not_overwritten() {
        let (_dir, layout) = prepared();
        fs::write(layout.home().join(".gitconfig"), "[user]\n name = me\n").unwrap();
        fs::write(layout.memory_dir().join("goals.json"), r#"["ship"]"#).unwrap();

        let writer = AssetWriter::new(&layout, None, "mobilecli-v162");
        writer.write_gitconfig().unwrap();
        writer.init_memory().unwrap();

        assert_eq!(
            fs::read_to_string(layout.home().join(".gitconfig")).unwrap(),
            "[user]\n name = me\n"
        );
        assert_eq!(
            fs::read_to_string(layout.memory_dir().join("goals.json")).unwrap(),
            r#"["ship"]"#
        );
        assert_eq!(
            fs::read_to_string(layout.memory_dir().join("problems_solved.json")).unwrap(),
            "[]"
        );
    }

    #[test]
    fn bashrc_is_rendered() {
        let (_dir, layout) = prepared();
        AssetWriter::new(&layout, None, "mobilecli-v162")
            .write_bashrc()
            .unwrap();
        let bashrc = fs::read_to_string(layout.home().join(".bashrc")).unwrap();
        assert!(bashrc.contains(".claude_power_mode"));
        assert!(bashrc.contains("Welcome to MobileCLI v162"));
        assert!(bashrc.contains(&format!("export PREFIX={}", layout.prefix().display())));
        assert!(!bashrc.contains("@PREFIX@"));
        assert!(!bashrc.contains("@VERSION@"));
    }
}
