use std::path::PathBuf;

use clap::Parser;
use pr_feedback::{DEFAULT_GITHUB_API_BASE, DEFAULT_MAX_LOG_CHARS};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "pr-feedback",
    about = "Post or refresh the plugin validation status comment on a pull request",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "log-path",
        env = "VALIDATION_LOG",
        default_value = "validation.log",
        help = "Validation log written by the submission checker"
    )]
    pub(crate) log_path: PathBuf,

    #[arg(
        long = "github-repo",
        env = "GITHUB_REPOSITORY",
        help = "Repository holding the pull request, in owner/repo format"
    )]
    pub(crate) github_repo: String,

    #[arg(
        long = "pr-number",
        env = "PR_NUMBER",
        value_parser = parse_positive_u64,
        help = "Pull request number receiving the status comment"
    )]
    pub(crate) pr_number: u64,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access"
    )]
    pub(crate) github_token: String,

    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_URL",
        default_value = DEFAULT_GITHUB_API_BASE,
        help = "GitHub API base URL"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "max-log-chars",
        env = "PR_FEEDBACK_MAX_LOG_CHARS",
        default_value_t = DEFAULT_MAX_LOG_CHARS,
        value_parser = parse_positive_usize,
        help = "Characters of log kept before the truncation suffix; must fit in one comment"
    )]
    pub(crate) max_log_chars: usize,

    #[arg(
        long = "closure-notice",
        env = "PR_FEEDBACK_CLOSURE_NOTICE",
        default_value_t = false,
        help = "Append the notice about closing failing pull requests after 7+ idle days"
    )]
    pub(crate) closure_notice: bool,

    #[arg(
        long = "dry-run",
        env = "PR_FEEDBACK_DRY_RUN",
        default_value_t = false,
        help = "Locate the existing comment and print the planned write without posting"
    )]
    pub(crate) dry_run: bool,

    #[arg(
        long = "json",
        default_value_t = false,
        help = "Print the outcome as a single JSON object"
    )]
    pub(crate) json: bool,
}
