//! First-run setup: bootstrap install with progress, then assistant choice.

use std::io::Write;
use std::sync::mpsc::Receiver;

use anyhow::Result;
use bootstrap::{FailureKind, InstallError, InstallProgress, Installer};
use mobilecli_workspace::{Response, Workspace};
use settings::Assistant;
use tracing::{error, info};

use crate::app_context::AppContext;
use crate::events::{self, UiEvent};

const BAR_WIDTH: usize = 30;

/// Install the bootstrap if needed. Returns false when the user gave up.
pub fn ensure_installed(cx: &AppContext, input: &Receiver<UiEvent>) -> Result<bool> {
    loop {
        let installer = Installer::from_config(cx.layout().clone(), cx.config());
        if installer.is_installed() {
            return Ok(true);
        }

        println!("Setting up MobileCLI ({})", installer.version());
        let (mut progress, task) = installer.spawn(cx.handle());
        let outcome = cx.block_on(async move {
            while let Some(step) = progress.recv().await {
                draw_progress(&step);
            }
            task.await
        });
        println!();

        let failure = match outcome {
            Ok(Ok(())) => return Ok(true),
            Ok(Err(e)) => e,
            Err(join) => InstallError::Task(join),
        };
        error!("Setup failed: {}", failure);
        println!("{}: {}", failure_title(failure.kind()), failure);

        print!("Retry? [Y/n] ");
        std::io::stdout().flush()?;
        match events::next_line(input) {
            Some(answer) if wants_retry(&answer) => info!("Retrying setup"),
            _ => return Ok(false),
        }
    }
}

fn draw_progress(step: &InstallProgress) {
    let mut stdout = std::io::stdout();
    // \r + clear line, so the bar redraws in place
    let _ = write!(stdout, "\r\x1b[2K{}", progress_line(step));
    let _ = stdout.flush();
}

fn progress_line(step: &InstallProgress) -> String {
    let percent = usize::from(step.percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        step.status
    )
}

fn failure_title(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Download => "Download failed",
        FailureKind::Extraction => "Could not unpack the bootstrap",
        FailureKind::Filesystem => "Setup failed",
    }
}

fn wants_retry(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}

/// Ask which assistant to install, unless already chosen. Returns false when
/// input closed before an answer.
pub fn choose_assistant(workspace: &mut Workspace, input: &Receiver<UiEvent>) -> Result<bool> {
    if !workspace.needs_assistant_choice() {
        return Ok(true);
    }

    println!("Choose your AI assistant:");
    for (number, assistant) in Assistant::ALL.iter().enumerate() {
        println!("  {}) {}", number + 1, assistant_label(*assistant));
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(answer) = events::next_line(input) else {
            return Ok(false);
        };
        match parse_choice(&answer) {
            Some(assistant) => {
                if let Response::Message(text) =
                    workspace.dispatch(actions::Action::ChooseAssistant(assistant))
                {
                    println!("{}", text);
                }
                return Ok(true);
            }
            None => println!("Pick 1-{} or a name", Assistant::ALL.len()),
        }
    }
}

fn assistant_label(assistant: Assistant) -> &'static str {
    match assistant {
        Assistant::Claude => "Claude Code",
        Assistant::Gemini => "Gemini CLI",
        Assistant::Codex => "Codex",
        Assistant::None => "None (plain terminal)",
    }
}

/// A menu number (1-based) or an assistant name.
fn parse_choice(answer: &str) -> Option<Assistant> {
    let answer = answer.trim();
    if let Ok(number) = answer.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| Assistant::ALL.get(index).copied());
    }
    answer.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn step(percent: u8, status: &str) -> InstallProgress {
        InstallProgress {
            percent,
            status: status.to_string(),
        }
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(
            progress_line(&step(50, "Extracting bootstrap...")),
            format!("[{}{}]  50% Extracting bootstrap...", "#".repeat(15), "-".repeat(15))
        );
        let full = progress_line(&step(100, "Complete!"));
        assert!(full.starts_with(&format!("[{}]", "#".repeat(30))));
        let empty = progress_line(&step(0, "Preparing directories..."));
        assert!(empty.starts_with(&format!("[{}]", "-".repeat(30))));
    }

    #[test_case("1", Some(Assistant::Claude) ; "first entry")]
    #[test_case(" 4 ", Some(Assistant::None) ; "last entry")]
    #[test_case("codex", Some(Assistant::Codex) ; "by name")]
    #[test_case("0", None ; "zero")]
    #[test_case("5", None ; "past the end")]
    #[test_case("copilot", None ; "unknown name")]
    fn parses_choices(answer: &str, expected: Option<Assistant>) {
        assert_eq!(parse_choice(answer), expected);
    }

    #[test_case("", true ; "default is yes")]
    #[test_case("Y", true ; "yes")]
    #[test_case("n", false ; "no")]
    #[test_case(" No ", false ; "spelled out")]
    fn retry_answers(answer: &str, expected: bool) {
        assert_eq!(wants_retry(answer), expected);
    }

    #[test]
    fn every_failure_kind_has_a_title() {
        for kind in [FailureKind::Download, FailureKind::Extraction, FailureKind::Filesystem] {
            assert!(!failure_title(kind).is_empty());
        }
    }
}
