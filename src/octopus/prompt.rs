//! Interactive space selection.
//!
//! The factory never talks to the terminal itself. It asks an [`Asker`]
//! whether prompting is possible and, if so, to pick a space. Two askers
//! ship with the crate:
//!
//! - [`TerminalAsker`]: a real menu (via `inquire`) when stdin and stdout are
//!   both terminals and prompting was not switched off.
//! - [`NoPrompt`]: never interactive; used for `--no-prompt` and scripts.

use crate::error::{OctoError, Result};
use crate::spaces::Space;
use inquire::{InquireError, Select};
use std::io::IsTerminal;

pub trait Asker: Send + Sync {
    fn is_interactive(&self) -> bool;

    /// Lets the user choose one of `spaces`.
    fn select_space(&self, spaces: &[Space]) -> Result<Space>;
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalAsker {
    prompt_enabled: bool,
}

impl TerminalAsker {
    pub fn new(prompt_enabled: bool) -> Self {
        Self { prompt_enabled }
    }
}

impl Asker for TerminalAsker {
    fn is_interactive(&self) -> bool {
        self.prompt_enabled && std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }

    fn select_space(&self, spaces: &[Space]) -> Result<Space> {
        if !self.is_interactive() {
            return Err(OctoError::SpaceUnspecified);
        }
        Select::new("Select the space you want to work in:", spaces.to_vec())
            .with_help_message("Pass --space or set OCTOPUS_SPACE to skip this question")
            .prompt()
            .map_err(|e| match e {
                InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                    OctoError::PromptCancelled
                }
                other => OctoError::Io(other.to_string()),
            })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Asker for NoPrompt {
    fn is_interactive(&self) -> bool {
        false
    }

    fn select_space(&self, _spaces: &[Space]) -> Result<Space> {
        Err(OctoError::SpaceUnspecified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_prompt_never_selects() {
        let asker = NoPrompt;
        assert!(!asker.is_interactive());
        assert_eq!(
            asker.select_space(&[Space::new("Spaces-1", "Default")]),
            Err(OctoError::SpaceUnspecified)
        );
    }

    #[test]
    fn test_disabled_terminal_asker_is_not_interactive() {
        let asker = TerminalAsker::new(false);
        assert!(!asker.is_interactive());
        assert!(asker.select_space(&[]).is_err());
    }
}
