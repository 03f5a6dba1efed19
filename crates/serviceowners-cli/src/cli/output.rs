//! Output formatting for the CLI.
//!
//! This module provides the human-readable console writer and the JSON
//! payloads printed by each subcommand.

use colored::Colorize;
use serde::Serialize;
use serviceowners_core::lint::{Issue, Severity};
use serviceowners_core::services::Service;
use serviceowners_core::{ImpactReport, LintResult, Match, Rule};
use std::collections::BTreeMap;
use std::io::Write;

/// Version reported in JSON payloads.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Writes any payload as pretty-printed JSON.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, payload: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(payload).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

/// A rule as it appears in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonRule<'a> {
    pub pattern: &'a str,
    pub service: &'a str,
    pub line: usize,
    pub source: &'a str,
}

impl<'a> From<&'a Rule> for JsonRule<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            pattern: rule.pattern(),
            service: rule.service(),
            line: rule.line(),
            source: rule.source(),
        }
    }
}

/// `who-owns --format json` payload.
#[derive(Debug, Serialize)]
pub struct WhoOwnsJson<'a> {
    pub path: &'a str,
    pub service: Option<&'a str>,
    pub chosen_rule: Option<JsonRule<'a>>,
    pub matches: Vec<JsonRule<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Service>,
    pub version: &'static str,
}

impl<'a> WhoOwnsJson<'a> {
    pub fn new(m: &'a Match<'a>, metadata: Option<&'a Service>) -> Self {
        Self {
            path: &m.path,
            service: m.service(),
            chosen_rule: m.chosen.map(JsonRule::from),
            matches: m.candidates.iter().copied().map(JsonRule::from).collect(),
            metadata,
            version: VERSION,
        }
    }
}

/// Files owned by one service in `impacted --format json`.
#[derive(Debug, Serialize)]
pub struct JsonServiceFiles<'a> {
    pub count: usize,
    pub files: &'a [String],
}

/// `impacted --format json` payload.
#[derive(Debug, Serialize)]
pub struct ImpactedJson<'a> {
    pub diff: Option<&'a str>,
    pub impacted_services: Vec<&'a str>,
    pub services: BTreeMap<&'a str, JsonServiceFiles<'a>>,
    pub unmapped_files: &'a [String],
    pub overlaps: &'a BTreeMap<String, Vec<String>>,
    pub total_files: usize,
    pub version: &'static str,
}

impl<'a> ImpactedJson<'a> {
    pub fn new(report: &'a ImpactReport, diff: Option<&'a str>) -> Self {
        Self {
            diff,
            impacted_services: report.impacted_services(),
            services: report
                .services_to_files
                .iter()
                .map(|(name, files)| {
                    (
                        name.as_str(),
                        JsonServiceFiles {
                            count: files.len(),
                            files,
                        },
                    )
                })
                .collect(),
            unmapped_files: &report.unmapped_files,
            overlaps: &report.overlaps,
            total_files: report.total_files(),
            version: VERSION,
        }
    }
}

/// `lint --format json` payload.
#[derive(Debug, Serialize)]
pub struct LintJson<'a> {
    pub issues: &'a [Issue],
    pub error_count: usize,
    pub warning_count: usize,
    pub version: &'static str,
}

impl<'a> LintJson<'a> {
    pub fn new(result: &'a LintResult) -> Self {
        Self {
            issues: &result.issues,
            error_count: result.error_count(),
            warning_count: result.warning_count(),
            version: VERSION,
        }
    }
}

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Writes the resolution of one path.
    pub fn write_who_owns(
        &mut self,
        m: &Match<'_>,
        metadata: Option<&Service>,
        explain: bool,
    ) -> std::io::Result<()> {
        let Some(service) = m.service() else {
            if self.use_colors {
                writeln!(self.writer, "{}: {}", m.path, "(unmapped)".yellow())?;
            } else {
                writeln!(self.writer, "{}: (unmapped)", m.path)?;
            }
            if explain {
                writeln!(self.writer)?;
                writeln!(self.writer, "No matching rules.")?;
            }
            return Ok(());
        };

        if self.use_colors {
            writeln!(self.writer, "{}: {}", m.path, service.green().bold())?;
        } else {
            writeln!(self.writer, "{}: {}", m.path, service)?;
        }

        if let Some(meta) = metadata {
            self.write_service_details(meta)?;
        }

        if explain {
            writeln!(self.writer)?;
            writeln!(self.writer, "Matched rules (last-match wins):")?;
            for rule in &m.candidates {
                let line = format!(
                    "- {} -> {} ({}:{})",
                    rule.pattern(),
                    rule.service(),
                    rule.source(),
                    rule.line()
                );
                let chosen = m.chosen.is_some_and(|c| std::ptr::eq(c, *rule));
                match (chosen, self.use_colors) {
                    (true, true) => writeln!(self.writer, "{}  {}", line, "<== chosen".cyan().bold())?,
                    (true, false) => writeln!(self.writer, "{}  <== chosen", line)?,
                    (false, _) => writeln!(self.writer, "{}", line)?,
                }
            }
        }

        Ok(())
    }

    fn write_service_details(&mut self, meta: &Service) -> std::io::Result<()> {
        let owners: Vec<&str> = meta
            .owners
            .iter()
            .map(|o| o.display())
            .filter(|o| !o.is_empty())
            .collect();
        if !owners.is_empty() {
            writeln!(self.writer, "  owners: {}", owners.join(", "))?;
        }
        let details = [
            ("slack", meta.contact.slack.as_deref()),
            ("email", meta.contact.email.as_deref()),
            ("oncall", meta.oncall.as_deref()),
            ("runbook", meta.runbook.as_deref()),
            ("docs", meta.docs.as_deref()),
        ];
        for (label, value) in details {
            if let Some(value) = value {
                writeln!(self.writer, "  {}: {}", label, value)?;
            }
        }
        Ok(())
    }

    /// Writes a header for a section.
    pub fn write_check_header(&mut self, name: &str) -> std::io::Result<()> {
        let header = format!("==> {}", name);
        if self.use_colors {
            writeln!(self.writer, "\n{}", header.cyan().bold())?;
        } else {
            writeln!(self.writer, "\n{}", header)?;
        }
        Ok(())
    }

    /// Writes every lint issue followed by a summary line.
    pub fn write_lint_result(&mut self, result: &LintResult) -> std::io::Result<()> {
        if !result.is_clean() {
            self.write_check_header("lint")?;
            for issue in &result.issues {
                self.write_issue(issue)?;
            }
        }
        self.write_summary(result.error_count(), result.warning_count())
    }

    /// Writes a single issue.
    pub fn write_issue(&mut self, issue: &Issue) -> std::io::Result<()> {
        let label = format!("[{}]", issue.severity);
        let location = issue
            .location
            .as_ref()
            .map(|l| format!(" {}", l))
            .unwrap_or_default();

        if self.use_colors {
            let colored_label = match issue.severity {
                Severity::Error => label.red().bold(),
                Severity::Warn => label.yellow().bold(),
            };
            writeln!(
                self.writer,
                "  {} {}{}: {}",
                colored_label,
                issue.code.as_str().bold(),
                location,
                issue.message
            )?;
        } else {
            writeln!(
                self.writer,
                "  {} {}{}: {}",
                label, issue.code, location, issue.message
            )?;
        }

        if let Some(hint) = &issue.hint {
            if self.use_colors {
                writeln!(self.writer, "      {} {}", "hint:".dimmed(), hint)?;
            } else {
                writeln!(self.writer, "      hint: {}", hint)?;
            }
        }

        Ok(())
    }

    /// Writes a summary of the lint run.
    pub fn write_summary(
        &mut self,
        total_errors: usize,
        total_warnings: usize,
    ) -> std::io::Result<()> {
        writeln!(self.writer)?;

        if total_errors == 0 && total_warnings == 0 {
            let message = "✓ No lint issues found";
            if self.use_colors {
                writeln!(self.writer, "{}", message.green().bold())?;
            } else {
                writeln!(self.writer, "{}", message)?;
            }
        } else {
            let message = format!(
                "✗ Found {} error(s) and {} warning(s)",
                total_errors, total_warnings
            );
            if self.use_colors {
                let colored = if total_errors > 0 {
                    message.red().bold()
                } else {
                    message.yellow().bold()
                };
                writeln!(self.writer, "{}", colored)?;
            } else {
                writeln!(self.writer, "{}", message)?;
            }
        }

        Ok(())
    }

    /// Writes an error message, e.g. `parse error: ...`.
    pub fn write_error(&mut self, label: &str, message: &str) -> std::io::Result<()> {
        let label = format!("{}:", label);
        if self.use_colors {
            writeln!(self.writer, "{} {}", label.red().bold(), message)?;
        } else {
            writeln!(self.writer, "{} {}", label, message)?;
        }
        Ok(())
    }
}
