use std::io::Read;
use std::path::Path;

use crate::action::{self, ActionDiagnoseSymptoms, CollectingDispatcher};
use crate::config::Config;
use crate::context::DiagnosisContext;
use crate::error::Result;

/// Run the diagnose action on one dialogue-engine request and print the reply JSON.
///
/// An unreadable request or a context that fails to load is answered with an
/// apology rather than an error, the same as any other per-turn failure.
pub fn cmd_handle(config: &Config, file: Option<&Path>, allow_fetch: bool) -> Result<()> {
    let body = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let mut dispatcher = CollectingDispatcher::default();

    // The dialogue engine always gets a reply, even when nothing could be loaded
    let ctx = match DiagnosisContext::from_config(config, allow_fetch) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "cannot load diagnosis context");
            dispatcher.messages.push(action::apology(&e));
            return print_response(dispatcher);
        }
    };
    let handler = ActionDiagnoseSymptoms::new(&ctx);

    match action::parse_request(body.trim()) {
        Ok(message) => handler.run(&message, &mut dispatcher),
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "rejected action request");
            dispatcher.messages.push(action::apology(&e));
        }
    }

    tracing::debug!(action = handler.name(), "action complete");
    print_response(dispatcher)
}

fn print_response(dispatcher: CollectingDispatcher) -> Result<()> {
    println!("{}", serde_json::to_string(&dispatcher.into_response())?);
    Ok(())
}
