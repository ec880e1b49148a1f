//! Parse a rule config and report what it contains.

use super::{fetch_rules, load_settings};
use crate::error::{CliError, CliResult};
use colored::Colorize;
use pushwatch_core::{ParseMode, RuleSet};
use std::path::Path;

pub async fn execute(
    rules: Option<&str>,
    settings: Option<&Path>,
    mode: ParseMode,
) -> CliResult<()> {
    let settings = load_settings(settings, rules)?;
    let location = settings.rules.clone().ok_or_else(|| {
        CliError::InvalidArgument("no rule config; pass --rules or set PUSHWATCH_RULES".to_string())
    })?;

    let text = fetch_rules(&settings).await.map_err(CliError::Rules)?;
    let set = settings
        .parser(mode)
        .parse(&text)
        .map_err(CliError::Rules)?;

    println!();
    println!("  {} {}", "Rule config".bright_cyan().bold(), location.dimmed());
    println!();
    print_summary(&set);

    for skipped in set.skipped() {
        crate::warn(&format!("line {} skipped: {}", skipped.line, skipped.reason));
    }

    println!();
    crate::success("Rule config is valid");
    Ok(())
}

fn print_summary(set: &RuleSet) {
    let stats = set.stats();
    let metadata = set.metadata();

    println!("  {:<16} {}", "Lines:", stats.lines);
    println!("  {:<16} {}", "Rules:", stats.rules);
    println!("  {:<16} {}", "Exceptions:", stats.exceptions);

    // Key names only; values may hold the shared secret
    let keys: Vec<&str> = metadata.keys().collect();
    if keys.is_empty() {
        println!("  {:<16} {}", "Metadata:", "none".dimmed());
    } else {
        println!("  {:<16} {}", "Metadata:", keys.join(", "));
    }

    let signing = if metadata.secret().is_some() {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!("  {:<16} {}", "Signature check:", signing);

    if let Some(email) = metadata.email() {
        println!("  {:<16} {}", "Alert email:", email);
    }

    for rule in set.rules() {
        let line = format!("{:>4}", rule.line());
        println!("  {} {} {}", line.as_str().dimmed(), "-".green(), rule);
    }
    for exception in set.exceptions() {
        let line = format!("{:>4}", exception.line());
        println!("  {} {} {}", line.as_str().dimmed(), "!".red(), exception);
    }
}
