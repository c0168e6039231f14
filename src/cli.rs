use crate::{
    agent::AgentKind,
    error::InstallError,
    installer::Installer,
    templates::locate_template_root,
};
use anyhow::{Context, Result};
use clap::{
    ArgAction, CommandFactory, Parser,
    error::{ContextKind, ContextValue, ErrorKind},
};
use std::{env, ffi::OsString};
use tracing::debug;

const BIN_NAME: &str = "pr-review";

#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    about = "Install PR review prompt templates for an AI coding agent",
    disable_help_flag = true,
    args_override_self = true
)]
struct Cli {
    /// Install prompts for GitHub Copilot (default)
    #[arg(long, action = ArgAction::Count)]
    copilot: u8,
    /// Install prompts for Cursor
    #[arg(long, action = ArgAction::Count)]
    cursor: u8,
    /// Language code stored in .review/config.yml (default: template value)
    #[arg(long, value_name = "LOCALE")]
    lang: Option<String>,
    /// Show this help message
    #[arg(short = 'h', long, action = ArgAction::SetTrue)]
    help: bool,
    #[arg(hide = true)]
    positional: Vec<String>,
}

/// Arguments after validation. At most one agent is ever selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub agent: Option<AgentKind>,
    pub lang: Option<String>,
    pub help: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parsed = parse_args(args)?;
    if parsed.help {
        println!("{}", usage());
        return Ok(());
    }

    let project_root = env::current_dir().context("failed to read the working directory")?;
    let installer = Installer::new(project_root, locate_template_root()?);
    installer.install(&parsed)?.print();
    Ok(())
}

/// Parses the tokens that follow the program name.
pub fn parse_args<I, T>(args: I) -> Result<ParsedArgs, InstallError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let tokens: Vec<OsString> = args.into_iter().map(Into::into).collect();
    check_tokens(&tokens)?;

    let argv = std::iter::once(OsString::from(BIN_NAME)).chain(tokens);
    let cli = Cli::try_parse_from(argv).map_err(usage_error)?;
    if !cli.positional.is_empty() {
        debug!(ignored = ?cli.positional, "ignoring positional arguments");
    }

    let agent = match (cli.copilot, cli.cursor) {
        (0, 0) => None,
        (1, 0) => Some(AgentKind::Copilot),
        (0, 1) => Some(AgentKind::Cursor),
        _ => {
            return Err(InstallError::usage(
                "multiple agent options specified, please specify only one",
            ));
        }
    };

    Ok(ParsedArgs {
        agent,
        lang: cli.lang.filter(|lang| !lang.is_empty()),
        help: cli.help,
    })
}

/// Rejects what clap would otherwise accept or word differently: the `--`
/// escape, hyphen-leading `--lang` values, values attached to flags and
/// clustered shorts such as `-hh`. Errors surface in token order.
fn check_tokens(tokens: &[OsString]) -> Result<(), InstallError> {
    let mut agents = 0;
    let mut iter = tokens.iter().map(|token| token.to_string_lossy());
    while let Some(token) = iter.next() {
        match &*token {
            "-h" | "--help" => {}
            "--copilot" | "--cursor" => {
                agents += 1;
                if agents > 1 {
                    return Err(InstallError::usage(
                        "multiple agent options specified, please specify only one",
                    ));
                }
            }
            "--lang" => match iter.next() {
                Some(value) if !value.starts_with('-') => {}
                _ => return Err(InstallError::usage("missing value for --lang")),
            },
            token if token.starts_with("--lang=") => {}
            token if token.starts_with('-') => {
                return Err(InstallError::usage(format!("unknown option: {token}")));
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn usage() -> String {
    Cli::command().render_help().to_string().trim_end().to_string()
}

fn usage_error(err: clap::Error) -> InstallError {
    let arg = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg.clone(),
        _ => String::new(),
    };

    match err.kind() {
        ErrorKind::UnknownArgument | ErrorKind::TooManyValues => {
            InstallError::usage(format!("unknown option: {arg}"))
        }
        ErrorKind::InvalidValue | ErrorKind::NoEquals if arg.starts_with("--lang") => {
            InstallError::usage("missing value for --lang")
        }
        _ => {
            let rendered = err.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            InstallError::usage(first.trim_start_matches("error: ").to_string())
        }
    }
}
