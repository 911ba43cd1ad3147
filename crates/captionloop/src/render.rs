//! Terminal output for a finished run.
//!
//! Banners go to stderr; the two JSON reports are the only thing on stdout.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use captionloop_core::{LoopOutcome, RunSettings};

pub fn print_outcome(outcome: &LoopOutcome) {
    match outcome {
        LoopOutcome::Accepted {
            attempts,
            candidate,
            total_duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "=== APPROVED ===".green().bold());
            eprintln!("Attempts: {}", attempts);
            eprintln!("Duration: {:.1}s", total_duration_secs);
            eprintln!("Caption: {}", candidate);
        }
        LoopOutcome::Exhausted {
            attempts,
            feedback,
            total_duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "No approved caption produced.".yellow().bold());
            eprintln!("Reason: {}", feedback);
            eprintln!("Attempts: {}", attempts);
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
    }
}

pub fn print_reports(attempt_log: &Value, final_payload: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(attempt_log)?);
    println!("{}", serde_json::to_string_pretty(final_payload)?);
    Ok(())
}

pub fn print_dry_run(settings: &RunSettings, working_dir: &Path) {
    println!("=== Dry Run ===");
    println!("Product: {}", settings.brief.product);
    println!("Audience: {}", settings.brief.audience);
    println!("Working dir: {}", working_dir.display());
    println!("Max attempts: {}", settings.max_attempts);
    println!("Max words: {}", settings.max_words);
    println!("Generator: {}", settings.generator);
    println!("Evaluator: {}", settings.evaluator);

    for (role, provider) in [
        ("Generator", &settings.generator_provider),
        ("Evaluator", &settings.evaluator_provider),
    ] {
        println!(
            "{} model: {}/{} (temperature {})",
            role, provider.provider, provider.model, provider.temperature
        );
    }
    println!(
        "API key: {}",
        if settings.generator_provider.api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );
}
