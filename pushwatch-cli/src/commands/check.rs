//! Check a push body against a rule config.

use super::{fetch_rules, load_settings, read_body};
use crate::error::{CliError, CliResult};
use crate::sink::WriterSink;
use pushwatch_core::{
    Alert, AlertSink, Checker, LogObserver, ParseMode, PushContext, unwrap_form_body,
};
use std::path::Path;

/// Options for `pushwatch check`
pub struct CheckOptions<'a> {
    pub rules: Option<&'a str>,
    pub payload: Option<&'a Path>,
    pub signature: Option<&'a str>,
    pub settings: Option<&'a Path>,
    pub mode: ParseMode,
    pub json: bool,
}

pub async fn execute(opts: CheckOptions<'_>) -> CliResult<()> {
    let settings = load_settings(opts.settings, opts.rules)?;
    if settings.rules.is_none() {
        return Err(CliError::InvalidArgument(
            "no rule config; pass --rules or set PUSHWATCH_RULES".to_string(),
        ));
    }
    let body = read_body(opts.payload)?;

    let mut checker = Checker::new()
        .with_parser(settings.parser(opts.mode))
        .with_observer(LogObserver);

    let result = match fetch_rules(&settings).await {
        Ok(text) => checker.load(&text).map(|_| ()),
        Err(error) => Err(error),
    }
    .and_then(|_| checker.check(&body, opts.signature));

    let recipient = checker
        .rules()
        .and_then(|rules| rules.metadata().email())
        .or(settings.alert_email.as_deref());
    let sink = WriterSink::stdout();

    match result {
        Ok(report) => {
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if let Some(alert) = Alert::changes(&report.repository, &report.notify) {
                sink.dispatch(recipient, &alert)?;
            } else {
                crate::info(&format!(
                    "No watched files changed in {} ({} scanned)",
                    report.repository, report.scanned
                ));
            }
            Ok(())
        }
        Err(error) => {
            let repository = repository_hint(&body);
            if opts.json {
                let value = serde_json::json!({
                    "repository": repository,
                    "error": error.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let alert = Alert::failure(repository.as_deref(), error.clone(), &body);
                sink.dispatch(recipient, &alert)?;
            }
            Err(CliError::Check(error))
        }
    }
}

/// Best-effort repository name for failure alerts
fn repository_hint(body: &[u8]) -> Option<String> {
    let body = unwrap_form_body(body).ok()?;
    PushContext::extract(&body).ok().map(|ctx| ctx.repository)
}
