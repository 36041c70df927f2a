//! Shell actions for MobileCLI.
//!
//! Everything the user can ask the shell to do, whether typed as a `:`
//! command, picked from the drawer, or triggered by a configured alias.

use std::fmt;
use std::str::FromStr;

use settings::Assistant;

/// Keys on the extra-keys row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraKey {
    Esc,
    Ctrl,
    Alt,
    Tab,
    Dash,
    Slash,
    Pipe,
    Up,
    Down,
    Left,
    Right,
}

impl ExtraKey {
    /// Row order as shown to the user.
    pub const ROW: [ExtraKey; 11] = [
        Self::Esc,
        Self::Ctrl,
        Self::Alt,
        Self::Tab,
        Self::Dash,
        Self::Slash,
        Self::Pipe,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Esc => "ESC",
            Self::Ctrl => "CTRL",
            Self::Alt => "ALT",
            Self::Tab => "TAB",
            Self::Dash => "-",
            Self::Slash => "/",
            Self::Pipe => "|",
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Left => "←",
            Self::Right => "→",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Esc => "esc",
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Tab => "tab",
            Self::Dash => "-",
            Self::Slash => "/",
            Self::Pipe => "|",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for ExtraKey {
    type Err = ParseActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        Self::ROW
            .into_iter()
            .find(|key| key.name() == value || key.label().to_lowercase() == value)
            .ok_or(ParseActionError::UnknownKey(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseActionError {
    #[error("unknown command '{0}' (try :help)")]
    UnknownCommand(String),
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("invalid argument '{value}' for '{command}'")]
    InvalidArgument { command: &'static str, value: String },
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NewSession,
    KillSession,
    NextSession,
    PrevSession,
    /// Zero-based index.
    SwitchSession(usize),
    ListSessions,
    ToggleWakeLock,
    ToggleDeveloperMode,
    TogglePowerMode,
    SetTextSize(u16),
    /// Scale gesture; the factor is applied to the current size.
    ScaleTextSize(f32),
    ChooseAssistant(Assistant),
    InstallAssistant(Assistant),
    InstallDevTools,
    TapVersion,
    AdminLogin(String),
    Key(ExtraKey),
    Help,
    About,
    Stop,
    Quit,
}

/// Static description of one command, for `:help` and the palette.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub label: &'static str,
}

pub const COMMANDS: [CommandInfo; 21] = [
    CommandInfo {
        name: "new-session",
        usage: "",
        label: "New Session",
    },
    CommandInfo {
        name: "kill-session",
        usage: "",
        label: "Kill Session",
    },
    CommandInfo {
        name: "next-session",
        usage: "",
        label: "Next Session",
    },
    CommandInfo {
        name: "prev-session",
        usage: "",
        label: "Previous Session",
    },
    CommandInfo {
        name: "switch",
        usage: "<n>",
        label: "Switch to Session",
    },
    CommandInfo {
        name: "sessions",
        usage: "",
        label: "List Sessions",
    },
    CommandInfo {
        name: "wake-lock",
        usage: "",
        label: "Toggle Wake Lock",
    },
    CommandInfo {
        name: "dev-mode",
        usage: "",
        label: "Toggle Developer Mode",
    },
    CommandInfo {
        name: "power-mode",
        usage: "",
        label: "Toggle Power Mode",
    },
    CommandInfo {
        name: "text-size",
        usage: "<14-56|small|medium|default|large|x-large>",
        label: "Text Size",
    },
    CommandInfo {
        name: "zoom",
        usage: "<factor>",
        label: "Scale Text",
    },
    CommandInfo {
        name: "assistant",
        usage: "<claude|gemini|codex|none>",
        label: "Choose AI Assistant",
    },
    CommandInfo {
        name: "install-ai",
        usage: "<claude|gemini|codex>",
        label: "Install AI Assistant",
    },
    CommandInfo {
        name: "install-dev-tools",
        usage: "",
        label: "Install Dev Tools",
    },
    CommandInfo {
        name: "version",
        usage: "",
        label: "Version",
    },
    CommandInfo {
        name: "admin",
        usage: "<password>",
        label: "Admin Login",
    },
    CommandInfo {
        name: "key",
        usage: "<esc|ctrl|alt|tab|-|/|||up|down|left|right>",
        label: "Extra Key",
    },
    CommandInfo {
        name: "help",
        usage: "",
        label: "Help",
    },
    CommandInfo {
        name: "about",
        usage: "",
        label: "About",
    },
    CommandInfo {
        name: "stop",
        usage: "",
        label: "Stop Keeper",
    },
    CommandInfo {
        name: "quit",
        usage: "",
        label: "Quit",
    },
];

impl Action {
    /// Command name this action is typed as.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewSession => "new-session",
            Self::KillSession => "kill-session",
            Self::NextSession => "next-session",
            Self::PrevSession => "prev-session",
            Self::SwitchSession(_) => "switch",
            Self::ListSessions => "sessions",
            Self::ToggleWakeLock => "wake-lock",
            Self::ToggleDeveloperMode => "dev-mode",
            Self::TogglePowerMode => "power-mode",
            Self::SetTextSize(_) => "text-size",
            Self::ScaleTextSize(_) => "zoom",
            Self::ChooseAssistant(_) => "assistant",
            Self::InstallAssistant(_) => "install-ai",
            Self::InstallDevTools => "install-dev-tools",
            Self::TapVersion => "version",
            Self::AdminLogin(_) => "admin",
            Self::Key(_) => "key",
            Self::Help => "help",
            Self::About => "about",
            Self::Stop => "stop",
            Self::Quit => "quit",
        }
    }

    /// Parse a command line (without the leading `:`).
    pub fn parse(line: &str) -> Result<Self, ParseActionError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseActionError::UnknownCommand(String::new()));
        };
        let argument = words.collect::<Vec<_>>().join(" ");
        let argument = (!argument.is_empty()).then_some(argument);

        let action = match command.to_lowercase().as_str() {
            "new-session" | "new" => Self::NewSession,
            "kill-session" | "kill" => Self::KillSession,
            "next-session" | "next" => Self::NextSession,
            "prev-session" | "prev" => Self::PrevSession,
            "switch" => {
                let value = require(argument, "switch", "a session number")?;
                match value.parse::<usize>() {
                    Ok(number) if number >= 1 => Self::SwitchSession(number - 1),
                    _ => return Err(invalid("switch", value)),
                }
            }
            "sessions" => Self::ListSessions,
            "wake-lock" => Self::ToggleWakeLock,
            "dev-mode" => Self::ToggleDeveloperMode,
            "power-mode" => Self::TogglePowerMode,
            "text-size" => {
                let value = require(argument, "text-size", "a size or preset name")?;
                let size = parse_text_size(&value).ok_or_else(|| invalid("text-size", value))?;
                Self::SetTextSize(size)
            }
            "zoom" => {
                let value = require(argument, "zoom", "a scale factor")?;
                match value.parse::<f32>() {
                    Ok(factor) if factor.is_finite() && factor > 0.0 => Self::ScaleTextSize(factor),
                    _ => return Err(invalid("zoom", value)),
                }
            }
            "assistant" => {
                let value = require(argument, "assistant", "an assistant name")?;
                Self::ChooseAssistant(value.parse().map_err(|_| invalid("assistant", value))?)
            }
            "install-ai" => {
                let value = require(argument, "install-ai", "an assistant name")?;
                Self::InstallAssistant(value.parse().map_err(|_| invalid("install-ai", value))?)
            }
            "install-dev-tools" => Self::InstallDevTools,
            "version" => Self::TapVersion,
            "admin" => Self::AdminLogin(require(argument, "admin", "a password")?),
            "key" => {
                let value = require(argument, "key", "a key name")?;
                Self::Key(value.parse()?)
            }
            "help" | "?" => Self::Help,
            "about" => Self::About,
            "stop" => Self::Stop,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(ParseActionError::UnknownCommand(other.to_string())),
        };
        Ok(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchSession(index) => write!(f, "switch {}", index + 1),
            Self::SetTextSize(size) => write!(f, "text-size {}", size),
            Self::ScaleTextSize(factor) => write!(f, "zoom {}", factor),
            Self::ChooseAssistant(assistant) => write!(f, "assistant {}", assistant),
            Self::InstallAssistant(assistant) => write!(f, "install-ai {}", assistant),
            // Never echo the password
            Self::AdminLogin(_) => f.write_str("admin ***"),
            Self::Key(key) => write!(f, "key {}", key.name()),
            other => f.write_str(other.name()),
        }
    }
}

fn require(
    argument: Option<String>,
    command: &'static str,
    expected: &'static str,
) -> Result<String, ParseActionError> {
    argument.ok_or(ParseActionError::MissingArgument { command, expected })
}

fn invalid(command: &'static str, value: String) -> ParseActionError {
    ParseActionError::InvalidArgument { command, value }
}

/// A number, or a preset name from the text size picker.
fn parse_text_size(value: &str) -> Option<u16> {
    if let Ok(size) = value.parse::<u16>() {
        return Some(size);
    }
    settings::constants::text_size::PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|&(_, size)| size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("new-session", Action::NewSession ; "new session")]
    #[test_case("kill", Action::KillSession ; "kill shorthand")]
    #[test_case("switch 3", Action::SwitchSession(2) ; "switch is one based")]
    #[test_case("text-size 36", Action::SetTextSize(36) ; "numeric text size")]
    #[test_case("text-size x-large", Action::SetTextSize(48) ; "preset text size")]
    #[test_case("assistant Gemini", Action::ChooseAssistant(Assistant::Gemini) ; "assistant")]
    #[test_case("install-ai codex", Action::InstallAssistant(Assistant::Codex) ; "install ai")]
    #[test_case("key ctrl", Action::Key(ExtraKey::Ctrl) ; "extra key")]
    #[test_case("key |", Action::Key(ExtraKey::Pipe) ; "pipe key")]
    #[test_case(
        "admin open sesame",
        Action::AdminLogin("open sesame".to_string())
        ; "password keeps spaces"
    )]
    #[test_case("  quit  ", Action::Quit ; "surrounding whitespace")]
    fn parses(line: &str, expected: Action) {
        assert_eq!(Action::parse(line), Ok(expected));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            Action::parse("frobnicate"),
            Err(ParseActionError::UnknownCommand("frobnicate".to_string()))
        );
        assert!(matches!(
            Action::parse("switch"),
            Err(ParseActionError::MissingArgument { command: "switch", .. })
        ));
        assert!(matches!(
            Action::parse("switch 0"),
            Err(ParseActionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Action::parse("zoom -1"),
            Err(ParseActionError::InvalidArgument { .. })
        ));
        assert_eq!(
            Action::parse("key hyper"),
            Err(ParseActionError::UnknownKey("hyper".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for action in [
            Action::SwitchSession(4),
            Action::SetTextSize(20),
            Action::Key(ExtraKey::Left),
            Action::InstallAssistant(Assistant::Claude),
            Action::Help,
        ] {
            assert_eq!(Action::parse(&action.to_string()), Ok(action));
        }
    }

    #[test]
    fn admin_password_is_not_displayed() {
        assert_eq!(Action::AdminLogin("secret".to_string()).to_string(), "admin ***");
    }

    #[test]
    fn every_command_name_parses_or_needs_argument() {
        for info in COMMANDS {
            match Action::parse(info.name) {
                Ok(action) => assert_eq!(action.name(), info.name),
                Err(ParseActionError::MissingArgument { command, .. }) => {
                    assert_eq!(command, info.name);
                    assert!(!info.usage.is_empty());
                }
                Err(other) => panic!("{}: {}", info.name, other),
            }
        }
    }
}
