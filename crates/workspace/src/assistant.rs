//! Commands typed into the active session on the user's behalf.

use settings::Assistant;

const NODE_SETUP: &str = "pkg update -y && pkg upgrade -y && pkg install nodejs-lts -y";

/// npm package providing each assistant CLI.
pub fn npm_package(assistant: Assistant) -> Option<&'static str> {
    match assistant {
        Assistant::Claude => Some("@anthropic-ai/claude-code"),
        Assistant::Gemini => Some("@google/gemini-cli"),
        Assistant::Codex => Some("@openai/codex"),
        Assistant::None => None,
    }
}

/// Shell line installing `assistant`, or `None` for a plain terminal.
pub fn install_command(assistant: Assistant) -> Option<String> {
    npm_package(assistant).map(|package| format!("{} && npm install -g {}\n", NODE_SETUP, package))
}

/// Shell lines installing the Java/Gradle/Git toolchain.
pub fn dev_tools_command() -> String {
    [
        "echo \"Installing development tools...\"",
        "pkg update -y && pkg upgrade -y",
        "pkg install -y openjdk-17 gradle git",
        "echo \"Development tools installed!\"",
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}
