use colored::Colorize;

use crate::action::apology;
use crate::config::Config;
use crate::context::{Assessment, DiagnosisContext};
use crate::error::Result;

/// Diagnose symptom descriptions given on the command line.
///
/// Anything that goes wrong, loading included, is printed as an apology and
/// the command still succeeds. `check` is the command that fails loudly.
pub fn cmd_diagnose(
    config: &Config,
    symptoms: &[String],
    explain: bool,
    allow_fetch: bool,
) -> Result<()> {
    let ctx = match DiagnosisContext::from_config(config, allow_fetch) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "cannot load diagnosis context");
            println!("{}", apology(&e));
            return Ok(());
        }
    };

    match ctx.assess(symptoms) {
        Ok(assessment) => {
            println!("{}", assessment.diagnosis.message());
            if explain {
                print_explanation(&ctx, &assessment);
            }
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "diagnosis failed");
            println!("{}", apology(&e));
        }
    }

    Ok(())
}

fn print_explanation(ctx: &DiagnosisContext, assessment: &Assessment) {
    let thresholds = ctx.thresholds();

    println!();
    println!(
        "{} ({} of {} catalog symptoms, threshold {:.2})",
        "Matched symptoms".cyan().bold(),
        assessment.indicator.flagged_count(),
        assessment.indicator.len(),
        thresholds.symptom
    );
    if assessment.matches.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for m in &assessment.matches {
        println!("  {} {} ({:.1}%)", ">".green(), m.symptom, m.score * 100.0);
    }

    if assessment.ranking.is_empty() {
        return;
    }

    println!();
    println!(
        "{} (threshold {:.2})",
        "Illness scores".cyan().bold(),
        thresholds.diagnosis
    );
    for score in assessment.ranking.iter().take(5) {
        let line = format!("{} ({:.1}%)", score.illness, score.score * 100.0);
        if score.score > thresholds.diagnosis {
            println!("  {} {}", ">".green(), line);
        } else {
            println!("  {} {}", "-".dimmed(), line.dimmed());
        }
    }
}
