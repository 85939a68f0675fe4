// crates/jira-cli/src/services/prompt.rs - Yes/no questions on the terminal

use console::Term;
use dialoguer::Confirm;
use jira_core::Prompter;
use tracing::warn;

/// Asks on the terminal with "yes" as the default answer
///
/// When no terminal is attached the question cannot be answered and is
/// treated as declined, so scripted runs stop instead of looping.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        if !Term::stderr().is_term() {
            warn!("no terminal to ask \"{question}\", answering no");
            return false;
        }
        match Confirm::new().with_prompt(question).default(true).interact() {
            Ok(answer) => answer,
            Err(e) => {
                warn!("cannot ask \"{question}\": {e}");
                false
            }
        }
    }
}
