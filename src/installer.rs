use crate::{
    agent::resolve_agent,
    cli::ParsedArgs,
    config::{self, CONFIG_FILE, REVIEW_DIR},
    error::ConfigKind,
    templates::{CopiedPrompts, copy_prompts},
};
use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Installer {
    project_root: PathBuf,
    template_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub lang: String,
    pub config_path: PathBuf,
    pub prompts: CopiedPrompts,
}

impl Installer {
    pub fn new(project_root: PathBuf, template_root: PathBuf) -> Self {
        Self {
            project_root,
            template_root,
        }
    }

    /// Copies the agent's prompts and writes the merged review config.
    /// Nothing is rolled back on failure; rerunning converges.
    pub fn install(&self, args: &ParsedArgs) -> Result<InstallSummary> {
        let review_dir = self.project_root.join(REVIEW_DIR);
        fs::create_dir_all(&review_dir)
            .with_context(|| format!("failed to create {}", review_dir.display()))?;

        let agent = args.agent.unwrap_or_default();
        let profile = resolve_agent(agent.identifier(), &self.project_root)?;
        info!(
            agent = %profile.identifier,
            template_root = %self.template_root.display(),
            "installing prompts"
        );
        let prompts = copy_prompts(&self.template_root, &profile)?;
        info!(files = prompts.files, dir = %prompts.dir.display(), "copied prompts");

        let config_path = review_dir.join(CONFIG_FILE);
        let defaults = config::load_config(&self.template_config_path(), ConfigKind::Template)?;
        let existing = config::load_config(&config_path, ConfigKind::Existing)?;
        let merged = config::apply_lang(
            config::merge(&defaults, &existing),
            &defaults,
            args.lang.as_deref(),
        );
        config::write_config(&config_path, &merged)?;

        Ok(InstallSummary {
            lang: config::lang_of(&merged),
            config_path,
            prompts,
        })
    }

    fn template_config_path(&self) -> PathBuf {
        self.template_root.join("config").join(CONFIG_FILE)
    }
}

impl InstallSummary {
    pub fn print(&self) {
        println!("✅ PR review templates installed successfully");
        println!(
            "   Language set to '{}' in {}",
            self.lang,
            self.config_path.display()
        );
        println!("   Prompts copied to:");
        println!("     - {}: {}", self.prompts.agent, self.prompts.dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agent::AgentKind, error::InstallError};
    use tempfile::TempDir;
    use walkdir::WalkDir;

    struct Fixture {
        templates: TempDir,
        project: TempDir,
    }

    impl Fixture {
        fn new(template_config: Option<&str>) -> Self {
            let templates = TempDir::new().unwrap();
            for (subdir, file) in [("github", "review.prompt.md"), ("cursor", "review.md")] {
                let dir = templates.path().join("prompts").join(subdir);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join(file), format!("{subdir} prompt")).unwrap();
            }
            if let Some(raw) = template_config {
                let dir = templates.path().join("config");
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join(CONFIG_FILE), raw).unwrap();
            }
            Self {
                templates,
                project: TempDir::new().unwrap(),
            }
        }

        fn installer(&self) -> Installer {
            Installer::new(
                self.project.path().to_path_buf(),
                self.templates.path().to_path_buf(),
            )
        }

        fn config_path(&self) -> PathBuf {
            self.project.path().join(REVIEW_DIR).join(CONFIG_FILE)
        }

        fn write_existing(&self, raw: &str) {
            fs::create_dir_all(self.project.path().join(REVIEW_DIR)).unwrap();
            fs::write(self.config_path(), raw).unwrap();
        }

        fn snapshot(&self) -> Vec<(PathBuf, String)> {
            WalkDir::new(self.project.path())
                .sort_by_file_name()
                .into_iter()
                .map(Result::unwrap)
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| {
                    let rel = entry.path().strip_prefix(self.project.path()).unwrap();
                    (rel.to_path_buf(), fs::read_to_string(entry.path()).unwrap())
                })
                .collect()
        }
    }

    fn args(agent: Option<AgentKind>, lang: Option<&str>) -> ParsedArgs {
        ParsedArgs {
            agent,
            lang: lang.map(str::to_string),
            help: false,
        }
    }

    #[test]
    fn defaults_to_copilot_and_template_lang() {
        let fixture = Fixture::new(Some("lang: en\n"));

        let summary = fixture.installer().install(&args(None, None)).unwrap();

        assert_eq!(summary.lang, "en");
        assert_eq!(summary.prompts.agent, "github-copilot");
        assert!(fixture.project.path().join(".github/prompts/review.prompt.md").is_file());
        assert!(!fixture.project.path().join(".cursor").exists());
        assert_eq!(fs::read_to_string(fixture.config_path()).unwrap(), "lang: en\n");
    }

    #[test]
    fn cursor_installs_into_cursor_commands() {
        let fixture = Fixture::new(Some("lang: en\n"));

        let summary = fixture
            .installer()
            .install(&args(Some(AgentKind::Cursor), None))
            .unwrap();

        assert_eq!(summary.prompts.dir, fixture.project.path().join(".cursor/commands"));
        assert!(summary.prompts.dir.join("review.md").is_file());
    }

    #[test]
    fn second_run_leaves_identical_tree() {
        let fixture = Fixture::new(Some("lang: en\nseverity: high\n"));
        let installer = fixture.installer();

        installer.install(&args(None, None)).unwrap();
        let first = fixture.snapshot();
        installer.install(&args(None, None)).unwrap();

        assert_eq!(fixture.snapshot(), first);
    }

    #[test]
    fn existing_config_wins_unless_lang_is_forced() {
        let fixture = Fixture::new(Some("lang: en\n"));
        fixture.write_existing("lang: fr\ncustomKey: x\n");

        let summary = fixture.installer().install(&args(None, None)).unwrap();
        assert_eq!(summary.lang, "fr");
        assert_eq!(
            fs::read_to_string(fixture.config_path()).unwrap(),
            "lang: fr\ncustomKey: x\n"
        );

        let summary = fixture.installer().install(&args(None, Some("de"))).unwrap();
        assert_eq!(summary.lang, "de");
        assert_eq!(
            fs::read_to_string(fixture.config_path()).unwrap(),
            "lang: de\ncustomKey: x\n"
        );
    }

    #[test]
    fn no_lang_anywhere_defaults_to_en() {
        let fixture = Fixture::new(None);

        let summary = fixture.installer().install(&args(None, None)).unwrap();

        assert_eq!(summary.lang, "en");
        assert_eq!(fs::read_to_string(fixture.config_path()).unwrap(), "lang: en\n");
    }

    #[test]
    fn invalid_existing_config_is_left_untouched() {
        let fixture = Fixture::new(Some("lang: en\n"));
        fixture.write_existing("lang: [fr\n");

        let err = fixture.installer().install(&args(None, None)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<InstallError>(),
            Some(InstallError::ConfigParse { kind: ConfigKind::Existing, .. })
        ));
        assert_eq!(fs::read_to_string(fixture.config_path()).unwrap(), "lang: [fr\n");
    }

    #[test]
    fn missing_template_subdir_fails_before_config_write() {
        let fixture = Fixture::new(Some("lang: en\n"));
        fs::remove_dir_all(fixture.templates.path().join("prompts/cursor")).unwrap();

        let err = fixture
            .installer()
            .install(&args(Some(AgentKind::Cursor), None))
            .unwrap_err();

        assert!(err.to_string().starts_with("No template found for cursor at"));
        assert!(fixture.project.path().join(REVIEW_DIR).is_dir());
        assert!(!fixture.config_path().exists());
    }
}
