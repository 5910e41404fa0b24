/// Identifies the invocation asking for a client.
///
/// Passed on every factory call. It holds no cached state; the factory only
/// reads it when a client is actually built, to label outbound requests.
pub trait Requester: Send + Sync {
    /// A short label for the invoking command, e.g. `space list`.
    fn requester(&self) -> String;
}

/// The requester used by the CLI: the space-separated subcommand path.
#[derive(Debug, Clone, Default)]
pub struct CommandRequester {
    command: String,
}

impl CommandRequester {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Requester for CommandRequester {
    fn requester(&self) -> String {
        self.command.clone()
    }
}

/// Builds the `User-Agent` value for a client constructed on behalf of `requester`.
pub fn user_agent(requester: &dyn Requester) -> String {
    let label = requester.requester();
    if label.is_empty() {
        format!("octopus-cli/{}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("octopus-cli/{} ({})", env!("CARGO_PKG_VERSION"), label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_includes_command() {
        let agent = user_agent(&CommandRequester::new("space list"));
        assert!(agent.starts_with("octopus-cli/"));
        assert!(agent.ends_with("(space list)"));
    }

    #[test]
    fn test_user_agent_without_command() {
        let agent = user_agent(&CommandRequester::default());
        assert!(!agent.contains('('));
    }
}
