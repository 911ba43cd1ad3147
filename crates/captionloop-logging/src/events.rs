use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

/// Which capability an event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Generator,
    Evaluator,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Generator => write!(f, "generator"),
            AgentRole::Evaluator => write!(f, "evaluator"),
        }
    }
}

/// Structured log events for the propose/evaluate loop.
///
/// `attempt` is 0-indexed; renderers show it 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    LoopStarted {
        product: String,
        audience: String,
        generator: String,
        evaluator: String,
        max_attempts: usize,
    },
    GeneratorStarted {
        attempt: usize,
        feedback: Option<String>,
    },
    CandidateProposed {
        attempt: usize,
        candidate: String,
    },
    EvaluatorStarted {
        attempt: usize,
    },
    VerdictRecorded {
        attempt: usize,
        accepted: bool,
        reasons: String,
    },
    LoopAccepted {
        attempts: usize,
        candidate: String,
        duration_secs: f64,
    },
    BudgetExhausted {
        attempts: usize,
        max_attempts: usize,
    },
    ErrorEncountered {
        attempt: usize,
        role: AgentRole,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for captionloop events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                if let Err(e) = writeln!(file, "{}", json) {
                    warn!(error = %e, "Failed to append event to log file");
                }
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::LoopStarted {
                product,
                audience,
                generator,
                evaluator,
                max_attempts,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "captionloop".bold().bright_white(),
                    " ".repeat(56) + &"│".bright_blue().to_string()
                );
                for (label, value) in [
                    ("Product:", product.as_str()),
                    ("Audience:", audience.as_str()),
                    ("Generator:", generator.as_str()),
                    ("Evaluator:", evaluator.as_str()),
                ] {
                    let _ = writeln!(
                        stderr,
                        "{}  {} {}",
                        "│".bright_blue(),
                        label.dimmed(),
                        Self::truncate_with_padding(value, 52, 66 - label.len()).dimmed()
                    );
                }
                let budget = format!("{}", max_attempts);
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Budget:".dimmed(),
                    Self::truncate_with_padding(&budget, 52, 59).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::GeneratorStarted { attempt, feedback } => {
                let attempt_text = format!("─ Attempt {} ", attempt + 1);
                let padding = "─".repeat(67usize.saturating_sub(attempt_text.chars().count()));
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    attempt_text.bright_blue().bold(),
                    padding.bright_blue()
                );
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_cyan(),
                    "GENERATOR".bright_cyan().bold()
                );
                if let Some(feedback) = feedback {
                    let _ = writeln!(
                        stderr,
                        "    {} {}",
                        "│".dimmed(),
                        format!("feedback: {}", feedback).dimmed()
                    );
                }
            }
            LogEvent::CandidateProposed { candidate, .. } => {
                let _ = writeln!(stderr, "    {} {}", "✎".bright_green(), candidate);
                let _ = writeln!(stderr);
            }
            LogEvent::EvaluatorStarted { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    "EVALUATOR".bright_magenta().bold()
                );
            }
            LogEvent::VerdictRecorded {
                accepted, reasons, ..
            } => {
                let styled = if *accepted {
                    "✓ Verdict: APPROVED".bright_green().to_string()
                } else {
                    format!("→ Verdict: REJECTED ({})", reasons)
                        .bright_yellow()
                        .to_string()
                };
                let _ = writeln!(stderr, "    {}", styled);
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "└─────────────────────────────────────────────────────────────────────┘"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::LoopAccepted { .. } => {
                // The final outcome is rendered by the binary
            }
            LogEvent::BudgetExhausted {
                attempts,
                max_attempts,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Attempt budget exhausted ({} attempt(s), budget {})",
                    "⚠".bright_yellow(),
                    attempts,
                    max_attempts
                );
            }
            LogEvent::ErrorEncountered {
                attempt,
                role,
                error,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} failed in attempt {}: {}",
                    "✗".bright_red(),
                    role,
                    attempt + 1,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::LoopStarted { max_attempts, .. } => {
                format!("[{}] loop:start budget={}", timestamp, max_attempts)
            }
            LogEvent::GeneratorStarted { attempt, .. } => {
                format!("[{}] generator:start:{}", timestamp, attempt + 1)
            }
            LogEvent::CandidateProposed { attempt, candidate } => {
                format!("[{}] generator:done:{} {}", timestamp, attempt + 1, candidate)
            }
            LogEvent::EvaluatorStarted { attempt } => {
                format!("[{}] evaluator:start:{}", timestamp, attempt + 1)
            }
            LogEvent::VerdictRecorded {
                attempt,
                accepted,
                reasons,
            } => {
                let verdict = if *accepted { "approved" } else { "rejected" };
                format!(
                    "[{}] evaluator:done:{} {} {}",
                    timestamp,
                    attempt + 1,
                    verdict,
                    reasons
                )
            }
            LogEvent::LoopAccepted {
                attempts,
                duration_secs,
                ..
            } => format!(
                "[{}] loop:accepted:{} {:.1}s",
                timestamp, attempts, duration_secs
            ),
            LogEvent::BudgetExhausted {
                attempts,
                max_attempts,
            } => format!(
                "[{}] loop:exhausted:{} budget={}",
                timestamp, attempts, max_attempts
            ),
            LogEvent::ErrorEncountered {
                attempt,
                role,
                error,
            } => format!("[{}] error:{}:{}:{}", timestamp, role, attempt + 1, error),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1); // +1 for trailing │
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
