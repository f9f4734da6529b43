use colored::Colorize;

use crate::config::Config;
use crate::context::DiagnosisContext;
use crate::error::Result;

/// Load model and catalogs, then report sizes or the first load error
pub fn cmd_check(config: &Config, allow_fetch: bool) -> Result<()> {
    println!("{}", "symptom-dx check".green().bold());
    println!("{}", "=".repeat(40));
    println!("  Symptom catalog: {}", config.symptom_catalog.display());
    println!("  Illness catalog: {}", config.illness_catalog.display());
    println!("  Model:           {}", config.model.path.display());
    println!();

    let ctx = match DiagnosisContext::from_config(config, allow_fetch) {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return Err(e);
        }
    };

    let catalogs = ctx.catalogs();
    let thresholds = ctx.thresholds();
    println!("  {} embedder: {}", "✓".green(), ctx.embedder_name());
    println!(
        "  {} {} symptoms, {} dimensions",
        "✓".green(),
        catalogs.symptoms.len(),
        catalogs.symptoms.dimension()
    );
    println!(
        "  {} {} illnesses over {} symptom flags",
        "✓".green(),
        catalogs.illnesses.len(),
        catalogs.illnesses.width()
    );
    println!(
        "  {} thresholds: symptom > {}, diagnosis > {}",
        "✓".green(),
        thresholds.symptom,
        thresholds.diagnosis
    );

    Ok(())
}
