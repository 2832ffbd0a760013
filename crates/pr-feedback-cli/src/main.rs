mod bootstrap_helpers;
mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use pr_feedback::{
    run_validation_feedback, CommentTemplate, FeedbackConfig, FeedbackOutcome, GithubApiClient,
    PullRequestRef, UpsertAction,
};

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;

fn build_feedback_config(cli: &Cli) -> Result<FeedbackConfig> {
    let request = PullRequestRef::parse(&cli.github_repo, cli.pr_number)
        .context("invalid pull request identity")?;
    let mut template = CommentTemplate::default();
    if cli.closure_notice {
        template = template.with_closure_notice();
    }
    Ok(FeedbackConfig {
        log_path: cli.log_path.clone(),
        request,
        template,
        max_log_chars: cli.max_log_chars,
        dry_run: cli.dry_run,
    })
}

fn render_outcome_line(outcome: &FeedbackOutcome) -> String {
    match outcome {
        FeedbackOutcome::Applied(result) => format!(
            "{} comment {} {}",
            result.action.as_str(),
            result.comment_id,
            result.url.as_deref().unwrap_or("(no url)")
        ),
        FeedbackOutcome::Planned {
            action, comment_id, ..
        } => match comment_id {
            Some(comment_id) => format!("dry-run: would update comment {comment_id}"),
            None => format!("dry-run: would {} a new comment", action_verb(*action)),
        },
    }
}

fn action_verb(action: UpsertAction) -> &'static str {
    match action {
        UpsertAction::Created => "create",
        UpsertAction::Updated => "update",
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let config = build_feedback_config(&cli)?;
    let client = GithubApiClient::new(&cli.github_api_base, &cli.github_token)
        .context("failed to create github api client")?;
    let outcome = run_validation_feedback(&config, &client)
        .await
        .with_context(|| {
            format!(
                "failed to publish validation feedback on {}#{}",
                config.request.as_slug(),
                config.request.number
            )
        })?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string(&outcome).context("failed to encode outcome")?
        );
    } else {
        println!("{}", render_outcome_line(&outcome));
        if let FeedbackOutcome::Planned { body, .. } = &outcome {
            println!("{body}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli).await
}
