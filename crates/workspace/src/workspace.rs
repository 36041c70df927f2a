//! The MobileCLI shell controller.
//!
//! Owns the preference set and the UI-side state (extra-keys modifiers, the
//! admin gate) and turns [`Action`]s into keeper and session operations. It
//! renders nothing itself; callers get a [`Response`] describing what to show.

mod admin_gate;
mod assistant;
mod command_palette;
mod drawer;
mod extra_keys;
mod text_size;

use std::path::PathBuf;

use actions::{Action, ParseActionError};
use bootstrap::{build_environment, Layout};
use keeper::{KeeperAction, SharedKeeper};
use platform::ProcessIdentity;
use settings::{Assistant, Config, PreferenceStore, Preferences};
use terminal::{LaunchSpec, RegistryError, SessionId};
use util::ResultExt;

pub use admin_gate::{password_digest, verify_password, AdminGate, TapOutcome};
pub use assistant::{dev_tools_command, install_command};
pub use command_palette::{search as search_commands, suggest};
pub use drawer::{about, help, version_label, APP_VERSION};
pub use extra_keys::ExtraKeys;

/// Marker file read by `.bashrc` to enable power mode.
pub const POWER_MODE_MARKER: &str = ".claude_power_mode";

/// What the caller should show after handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Nothing,
    /// A one-line notice (toast).
    Message(String),
    /// A block of text (drawer, help, about).
    Lines(Vec<String>),
    /// The active session changed; redraw it from its transcript.
    Redraw,
    /// The next line typed is the admin password.
    PasswordRequired,
    Quit,
}

impl Response {
    fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }
}

pub struct Workspace {
    keeper: SharedKeeper,
    layout: Layout,
    identity: ProcessIdentity,
    config: Config,
    store: PreferenceStore,
    prefs: Preferences,
    keys: ExtraKeys,
    admin: AdminGate,
    awaiting_password: bool,
}

impl Workspace {
    /// Load preferences and restore the persisted wake lock.
    pub fn new(
        keeper: SharedKeeper,
        layout: Layout,
        config: Config,
        store: PreferenceStore,
    ) -> Self {
        let prefs = store.load();
        if prefs.wake_lock {
            keeper.lock().acquire_wake_lock();
        }
        Self {
            keeper,
            layout,
            identity: ProcessIdentity::current(),
            config,
            store,
            prefs,
            keys: ExtraKeys::default(),
            admin: AdminGate::default(),
            awaiting_password: false,
        }
    }

    pub fn keeper(&self) -> &SharedKeeper {
        &self.keeper
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn extra_keys(&self) -> &ExtraKeys {
        &self.keys
    }

    pub fn is_awaiting_password(&self) -> bool {
        self.awaiting_password
    }

    /// Launch parameters for a new login shell.
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            shell: self.layout.bash_path(),
            cwd: self.layout.home(),
            args: self.config.login_args.clone(),
            env: build_environment(&self.layout, self.identity),
        }
    }

    /// Create the first session if there is none.
    pub fn ensure_session(&mut self) -> Result<Option<SessionId>, RegistryError> {
        let mut keeper = self.keeper.lock();
        if !keeper.registry().is_empty() {
            return Ok(None);
        }
        keeper.create_session(self.launch_spec()).map(Some)
    }

    /// True until the user picks an assistant (or a plain terminal).
    pub fn needs_assistant_choice(&self) -> bool {
        self.prefs.selected_assistant.is_none()
    }

    /// Handle one line typed at the prompt.
    ///
    /// `:command` lines are actions (aliases resolved first), `::text` sends
    /// `:text` to the shell, and anything else goes to the active session.
    pub fn handle_line(&mut self, line: &str) -> Response {
        if self.awaiting_password {
            return self.dispatch(Action::AdminLogin(line.to_string()));
        }

        match line.strip_prefix(':') {
            Some(rest) if rest.starts_with(':') => self.send_line(rest),
            Some(command) => match self.parse_command(command) {
                Ok(action) => self.dispatch(action),
                Err(e) => {
                    let hint = match &e {
                        ParseActionError::UnknownCommand(name) => suggest(name),
                        _ => None,
                    };
                    match hint {
                        Some(hint) => Response::Message(format!("{}. {}", e, hint)),
                        None => Response::Message(e.to_string()),
                    }
                }
            },
            None => self.send_line(line),
        }
    }

    fn parse_command(&self, command: &str) -> Result<Action, ParseActionError> {
        let command = command.trim();
        let (word, rest) = command.split_once(' ').unwrap_or((command, ""));
        match self.config.resolve_alias(word) {
            Some(action) => Action::parse(&format!("{} {}", action, rest)),
            None => Action::parse(command),
        }
    }

    fn send_line(&mut self, line: &str) -> Response {
        let mut data = self.keys.apply(line.as_bytes());
        data.push(b'\n');
        self.write_active(&data)
    }

    /// Send raw input to the active session, applying latched modifiers.
    pub fn send_input(&mut self, input: &[u8]) -> Response {
        let data = self.keys.apply(input);
        self.write_active(&data)
    }

    fn write_active(&self, data: &[u8]) -> Response {
        let mut keeper = self.keeper.lock();
        let Some(session) = keeper.registry_mut().active_session_mut() else {
            return Response::message("No active session");
        };
        match session.write(data) {
            Ok(()) => Response::Nothing,
            Err(e) => {
                tracing::warn!("Write to session {} failed: {:#}", session.id(), e);
                Response::Message(format!("Write failed: {:#}", e))
            }
        }
    }

    /// Drain a session's pending output. Returns it only for the active
    /// session; background sessions just keep their transcript current.
    pub fn pump(&self, id: SessionId) -> Option<Vec<u8>> {
        let mut keeper = self.keeper.lock();
        let registry = keeper.registry_mut();
        let active = registry.active_session().map(|session| session.id());
        let output = registry.get_mut(id)?.pump();
        (active == Some(id) && !output.is_empty()).then_some(output)
    }

    /// Active session transcript for a redraw, last `rows` lines.
    pub fn screen(&self, rows: usize) -> Vec<String> {
        let keeper = self.keeper.lock();
        keeper
            .registry()
            .active_session()
            .map(|session| session.transcript().tail(rows))
            .unwrap_or_default()
    }

    /// Tab strip: `[1] 2 3` with the active session bracketed.
    pub fn tabs_line(&self) -> String {
        let keeper = self.keeper.lock();
        let registry = keeper.registry();
        let active = registry.active_index();
        (0..registry.len())
            .map(|index| {
                if Some(index) == active {
                    format!("[{}]", index + 1)
                } else {
                    (index + 1).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn drawer_lines(&self) -> Vec<String> {
        let keeper = self.keeper.lock();
        let registry = keeper.registry();
        drawer::render(
            &registry.titles(),
            registry.active_index().unwrap_or(0),
            &self.prefs,
            keeper.is_wake_lock_held(),
        )
    }

    pub fn dispatch(&mut self, action: Action) -> Response {
        tracing::debug!("Dispatch: {}", action);
        match action {
            Action::NewSession => self.new_session(),
            Action::KillSession => {
                if self.keeper.lock().remove_active_session() {
                    Response::Redraw
                } else {
                    Response::message("No active session")
                }
            }
            Action::NextSession => self.switch_with(|keeper| keeper.registry_mut().next()),
            Action::PrevSession => self.switch_with(|keeper| keeper.registry_mut().prev()),
            Action::SwitchSession(index) => {
                if self.keeper.lock().switch_session(index) {
                    Response::Redraw
                } else {
                    Response::Message(format!("No session {}", index + 1))
                }
            }
            Action::ListSessions => Response::Lines(self.drawer_lines()),
            Action::ToggleWakeLock => {
                let held = self.keeper.lock().toggle_wake_lock();
                self.prefs.wake_lock = held;
                self.save();
                Response::message(if held {
                    "Wake lock acquired"
                } else {
                    "Wake lock released"
                })
            }
            Action::ToggleDeveloperMode => {
                if !self.developer_options_visible() {
                    return Response::message("Developer options are not available");
                }
                self.prefs.developer_mode = !self.prefs.developer_mode;
                self.save();
                Response::Message(format!(
                    "Developer mode {}",
                    on_off(self.prefs.developer_mode)
                ))
            }
            Action::TogglePowerMode => self.toggle_power_mode(),
            Action::SetTextSize(size) => self.set_text_size(text_size::clamp(size)),
            Action::ScaleTextSize(factor) => {
                self.set_text_size(text_size::scale(self.prefs.text_size, factor))
            }
            Action::ChooseAssistant(assistant) => self.choose_assistant(assistant),
            Action::InstallAssistant(assistant) => {
                if !self.prefs.admin_mode {
                    return Response::message("Installing assistants requires admin mode");
                }
                self.run_install(assistant)
            }
            Action::InstallDevTools => {
                if !self.developer_options_visible() {
                    return Response::message("Developer tools require developer mode");
                }
                match self.write_active(dev_tools_command().as_bytes()) {
                    Response::Nothing => Response::message("Installing development tools..."),
                    other => other,
                }
            }
            Action::TapVersion => self.tap_version(),
            Action::AdminLogin(password) => self.admin_login(&password),
            Action::Key(key) => match self.keys.press(key) {
                Some(bytes) => self.write_active(&bytes),
                None => Response::Message(self.keys.render_row()),
            },
            Action::Help => Response::Lines(help()),
            Action::About => Response::Lines(about()),
            Action::Stop => {
                self.keeper.lock().handle(KeeperAction::Stop);
                Response::Quit
            }
            Action::Quit => Response::Quit,
        }
    }

    fn new_session(&mut self) -> Response {
        let spec = self.launch_spec();
        match self.keeper.lock().create_session(spec) {
            Ok(_) => Response::Redraw,
            Err(e) => {
                tracing::warn!("New session: {}", e);
                Response::Message(capitalize(&e.to_string()))
            }
        }
    }

    fn switch_with(&self, switch: impl FnOnce(&mut keeper::Keeper) -> bool) -> Response {
        let mut keeper = self.keeper.lock();
        if switch(&mut *keeper) {
            Response::Redraw
        } else {
            Response::Nothing
        }
    }

    fn developer_options_visible(&self) -> bool {
        self.prefs.developer_mode || self.prefs.admin_mode
    }

    fn power_mode_marker(&self) -> PathBuf {
        self.layout.home().join(POWER_MODE_MARKER)
    }

    fn toggle_power_mode(&mut self) -> Response {
        self.prefs.power_mode = !self.prefs.power_mode;
        let marker = self.power_mode_marker();
        if self.prefs.power_mode {
            std::fs::write(&marker, "")
                .warn_on_err(format_args!("Failed to create {}", marker.display()));
        } else if marker.exists() {
            std::fs::remove_file(&marker)
                .warn_on_err(format_args!("Failed to remove {}", marker.display()));
        }
        self.save();
        Response::Message(format!("Power mode {}", on_off(self.prefs.power_mode)))
    }

    fn set_text_size(&mut self, size: u16) -> Response {
        self.prefs.text_size = size;
        self.save();
        match text_size::preset_name(size) {
            Some(name) => Response::Message(format!("Text size: {} ({})", size, name)),
            None => Response::Message(format!("Text size: {}", size)),
        }
    }

    fn choose_assistant(&mut self, assistant: Assistant) -> Response {
        self.prefs.selected_assistant = Some(assistant);
        self.save();
        tracing::info!("Assistant selected: {}", assistant);

        if let Err(e) = self.ensure_session() {
            return Response::Message(capitalize(&e.to_string()));
        }
        if assistant == Assistant::None {
            return Response::message("Plain terminal selected");
        }
        self.run_install(assistant)
    }

    fn run_install(&mut self, assistant: Assistant) -> Response {
        let Some(command) = install_command(assistant) else {
            return Response::message("Nothing to install");
        };
        match self.write_active(command.as_bytes()) {
            Response::Nothing => Response::Message(format!("Installing {}...", assistant)),
            other => other,
        }
    }

    fn tap_version(&mut self) -> Response {
        match self.admin.tap(self.prefs.admin_mode) {
            TapOutcome::Counting => Response::Nothing,
            TapOutcome::Hint(remaining) => Response::Message(format!(
                "{} remaining",
                util::plural(remaining as usize, "tap")
            )),
            TapOutcome::PromptPassword => {
                if self.config.admin_password_hash.is_none() {
                    return Response::message("Admin mode is not configured");
                }
                self.awaiting_password = true;
                Response::PasswordRequired
            }
            TapOutcome::Disable => {
                self.prefs.admin_mode = false;
                self.save();
                tracing::info!("Admin mode disabled");
                Response::message("Admin mode disabled")
            }
        }
    }

    fn admin_login(&mut self, password: &str) -> Response {
        if !std::mem::take(&mut self.awaiting_password) {
            return Response::message("Tap the version label to unlock admin mode");
        }
        let Some(expected) = self.config.admin_password_hash.as_deref() else {
            return Response::message("Admin mode is not configured");
        };
        if !verify_password(password, expected) {
            tracing::warn!("Admin login rejected");
            return Response::message("Incorrect password");
        }

        self.prefs.admin_mode = true;
        self.prefs.developer_mode = true;
        self.save();
        tracing::info!("Admin mode enabled");
        Response::message("Admin mode enabled")
    }

    fn save(&self) {
        self.store
            .save(&self.prefs)
            .warn_on_err("Failed to save preferences");
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "enabled"
    } else {
        "disabled"
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
