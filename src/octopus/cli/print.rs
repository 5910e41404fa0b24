use colored::Colorize;
use octopus::client::RootResource;
use octopus::spaces::Space;
use octopus::targets::{DeploymentTarget, ResourcePage};

const DEFAULT_MARKER: &str = "(default)";
const DISABLED_MARKER: &str = "(disabled)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Success,
    Warning,
}

pub(super) fn print_message(level: MessageLevel, content: &str) {
    match level {
        MessageLevel::Info => println!("{}", content.dimmed()),
        MessageLevel::Success => println!("{}", content.green()),
        MessageLevel::Warning => println!("{}", content.yellow()),
    }
}

pub(super) fn print_spaces(spaces: &[Space]) {
    print!("{}", render_spaces(spaces));
}

pub(super) fn print_targets(page: &ResourcePage<DeploymentTarget>) {
    print!("{}", render_targets(page));
}

pub(super) fn print_server(server_url: &str, root: &RootResource) {
    print!("{}", render_server(server_url, root));
}

/// One line per space: ID, name, and a marker on the server's default space.
fn render_spaces(spaces: &[Space]) -> String {
    if spaces.is_empty() {
        return format!("{}\n", "No spaces found.".dimmed());
    }

    let id_width = spaces.iter().map(|s| s.id.chars().count()).max().unwrap_or(0);
    let mut output = String::new();
    for space in spaces {
        let padding = " ".repeat(id_width - space.id.chars().count());
        output.push_str(&format!("{}{}  {}", space.id.yellow(), padding, space.name.bold()));
        if space.is_default {
            output.push_str(&format!(" {}", DEFAULT_MARKER.dimmed()));
        }
        output.push('\n');
    }
    output
}

fn render_targets(page: &ResourcePage<DeploymentTarget>) -> String {
    if page.items.is_empty() {
        return format!("{}\n", "No deployment targets found.".dimmed());
    }

    let name_width = page
        .items
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut output = String::new();
    for target in &page.items {
        let padding = " ".repeat(name_width - target.name.chars().count());
        let health = target.health_status.as_deref().unwrap_or("Unknown");
        let health = match health {
            "Healthy" => health.green(),
            "Unhealthy" | "Unavailable" => health.red(),
            _ => health.yellow(),
        };
        output.push_str(&format!("{}{}  {}", target.name.bold(), padding, health));
        if !target.roles.is_empty() {
            output.push_str(&format!("  {}", target.roles.join(", ").dimmed()));
        }
        if target.is_disabled {
            output.push_str(&format!(" {}", DISABLED_MARKER.red()));
        }
        output.push('\n');
    }

    if page.total_results > page.items.len() {
        output.push_str(&format!(
            "{}\n",
            format!("Showing {} of {} targets.", page.items.len(), page.total_results).dimmed()
        ));
    }
    output
}

fn render_server(server_url: &str, root: &RootResource) -> String {
    let application = if root.application.is_empty() {
        "Octopus Deploy"
    } else {
        root.application.as_str()
    };
    format!(
        "{} {}\n{} {}\n",
        application.bold(),
        root.version,
        "Server:".dimmed(),
        server_url
    )
}
