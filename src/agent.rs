use crate::error::InstallError;
use std::path::{Path, PathBuf};

/// Agent selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentKind {
    #[default]
    Copilot,
    Cursor,
}

impl AgentKind {
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Copilot => "copilot",
            Self::Cursor => "cursor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub identifier: String,
    /// Name shown in messages, e.g. `github-copilot`.
    pub display_name: String,
    pub destination: PathBuf,
    pub template_subdir: String,
}

struct AgentEntry {
    identifier: &'static str,
    display_name: &'static str,
    destination: &'static [&'static str],
    template_subdir: &'static str,
}

const AGENTS: &[AgentEntry] = &[
    AgentEntry {
        identifier: "copilot",
        display_name: "github-copilot",
        destination: &[".github", "prompts"],
        template_subdir: "github",
    },
    AgentEntry {
        identifier: "cursor",
        display_name: "cursor",
        destination: &[".cursor", "commands"],
        template_subdir: "cursor",
    },
];

/// Looks up the profile for `identifier`, anchoring its destination under
/// `project_root`.
pub fn resolve_agent(identifier: &str, project_root: &Path) -> Result<AgentProfile, InstallError> {
    let entry = AGENTS
        .iter()
        .find(|entry| entry.identifier == identifier)
        .ok_or_else(|| InstallError::UnknownAgent {
            agent: identifier.to_string(),
        })?;

    let destination = entry
        .destination
        .iter()
        .fold(project_root.to_path_buf(), |path, part| path.join(part));

    Ok(AgentProfile {
        identifier: entry.identifier.to_string(),
        display_name: entry.display_name.to_string(),
        destination,
        template_subdir: entry.template_subdir.to_string(),
    })
}
