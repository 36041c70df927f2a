//! Drawer contents: session list, toggles, help and about.

use actions::COMMANDS;
use release_channel::ReleaseChannel;
use settings::Preferences;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One row of the drawer toggle list.
fn toggle_line(label: &str, on: bool) -> String {
    format!("  [{}] {}", if on { "x" } else { " " }, label)
}

/// Drawer body: sessions with the active one marked, then toggles.
pub fn render(
    titles: &[String],
    active: usize,
    prefs: &Preferences,
    wake_lock: bool,
) -> Vec<String> {
    let mut lines = vec!["Sessions".to_string()];
    lines.extend(titles.iter().enumerate().map(|(index, title)| {
        let marker = if index == active { '>' } else { ' ' };
        format!(" {} {}. {}", marker, index + 1, title)
    }));
    lines.push(String::new());
    lines.push(toggle_line("Wake lock", wake_lock));
    lines.push(toggle_line("Power mode", prefs.power_mode));
    if prefs.developer_mode || prefs.admin_mode {
        lines.push(toggle_line("Developer mode", prefs.developer_mode));
    }
    if prefs.admin_mode {
        lines.push(toggle_line("Admin mode", true));
    }
    lines.push(format!("  Text size: {}", prefs.text_size));
    if let Some(assistant) = prefs.selected_assistant {
        lines.push(format!("  Assistant: {}", assistant));
    }
    lines.push(String::new());
    lines.push(version_label());
    lines
}

pub fn version_label() -> String {
    ReleaseChannel::global().version_label(APP_VERSION)
}

/// Help text: navigation, commands, and the bundled termux helpers.
pub fn help() -> Vec<String> {
    let mut lines = vec![
        "MobileCLI - AI Terminal".to_string(),
        String::new(),
        "Navigation:".to_string(),
        "  Lines starting with ':' are commands, everything else goes to the shell".to_string(),
        "  ':key <name>' presses a key on the extra-keys row".to_string(),
        String::new(),
        "Commands:".to_string(),
    ];
    lines.extend(COMMANDS.iter().map(|info| {
        let usage = if info.usage.is_empty() {
            info.name.to_string()
        } else {
            format!("{} {}", info.name, info.usage)
        };
        format!("  :{:<28} {}", usage, info.label)
    }));
    lines.extend([
        String::new(),
        "In the shell:".to_string(),
        "  termux-clipboard-get      Read clipboard".to_string(),
        "  termux-toast \"message\"    Show toast".to_string(),
        "  termux-vibrate            Vibrate".to_string(),
    ]);
    lines
}

pub fn about() -> Vec<String> {
    vec![
        format!("{} {}", ReleaseChannel::global().app_name(), version_label()),
        String::new(),
        "A terminal with a bundled Linux userland and AI coding assistants.".to_string(),
        String::new(),
        "Licensed under the GNU AGPL v3 or later.".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use settings::Assistant;

    fn prefs() -> Preferences {
        Preferences {
            developer_mode: false,
            admin_mode: false,
            wake_lock: false,
            power_mode: true,
            text_size: 28,
            selected_assistant: Some(Assistant::Claude),
        }
    }

    #[test]
    fn marks_active_session() {
        let titles = vec!["Session 1".to_string(), "Session 2".to_string()];
        let lines = render(&titles, 1, &prefs(), false);
        assert_eq!(lines[1], "   1. Session 1");
        assert_eq!(lines[2], " > 2. Session 2");
    }

    #[test]
    fn hides_developer_toggle_until_enabled() {
        let lines = render(&[], 0, &prefs(), true);
        assert!(lines.contains(&"  [x] Wake lock".to_string()));
        assert!(lines.contains(&"  [x] Power mode".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Developer mode")));
        assert!(lines.contains(&"  Assistant: claude".to_string()));

        let admin = Preferences {
            admin_mode: true,
            developer_mode: true,
            ..prefs()
        };
        let lines = render(&[], 0, &admin, false);
        assert!(lines.contains(&"  [x] Developer mode".to_string()));
        assert!(lines.contains(&"  [x] Admin mode".to_string()));
    }

    #[test]
    fn help_lists_every_command() {
        let text = help().join("\n");
        for info in COMMANDS {
            assert!(text.contains(&format!(":{}", info.name)), "{}", info.name);
        }
    }
}
