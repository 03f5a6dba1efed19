//! Markdown rendering for impact and lint reports.
//!
//! The same renderers feed the `impacted` text output, the GitHub job summary
//! and the pull request comment.

use serviceowners_core::lint::Severity;
use serviceowners_core::services::Service;
use serviceowners_core::{ImpactReport, LintResult, ServiceCatalog};
use std::fmt::Write;

/// Marker identifying the comment this tool owns on a pull request.
pub const DEFAULT_MARKER: &str = "serviceowners";

/// Heading of the pull request comment.
pub const COMMENT_TITLE: &str = "🧭 ServiceOwners";

/// Unmapped files listed directly in the pull request comment.
const COMMENT_UNMAPPED_LIMIT: usize = 10;

/// Files listed per service in the comment's collapsible section.
const COMMENT_FILES_LIMIT: usize = 50;

const SEPARATOR: &str = " · ";

/// Options for [`render_impact_markdown`].
#[derive(Debug, Clone)]
pub struct ImpactMarkdownOptions<'a> {
    pub title: &'a str,
    pub include_files: bool,
    pub max_files_per_service: usize,
    pub include_unmapped: bool,
    pub show_metadata: bool,
}

impl Default for ImpactMarkdownOptions<'_> {
    fn default() -> Self {
        Self {
            title: "ServiceOwners",
            include_files: false,
            max_files_per_service: 50,
            include_unmapped: true,
            show_metadata: true,
        }
    }
}

/// Returns the begin and end HTML comments wrapping a marked section.
pub fn marker_comments(marker: &str) -> (String, String) {
    (
        format!("<!-- {}:begin -->", marker),
        format!("<!-- {}:end -->", marker),
    )
}

/// Impacted services, largest first then by name.
fn sorted_impact(report: &ImpactReport) -> Vec<(&str, &[String])> {
    let mut impacted: Vec<(&str, &[String])> = report
        .services_to_files
        .iter()
        .map(|(name, files)| (name.as_str(), files.as_slice()))
        .collect();
    impacted.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
    impacted
}

fn plural_files(count: usize) -> String {
    format!("{} file{}", count, if count == 1 { "" } else { "s" })
}

fn owners_line(service: &Service) -> Option<String> {
    let owners: Vec<&str> = service
        .owners
        .iter()
        .map(|o| o.display())
        .filter(|o| !o.is_empty())
        .collect();
    (!owners.is_empty()).then(|| owners.join(", "))
}

fn push_file_list(out: &mut String, indent: &str, files: &[String], limit: usize) {
    for file in files.iter().take(limit) {
        let _ = writeln!(out, "{}- `{}`", indent, file);
    }
    if files.len() > limit {
        let _ = writeln!(out, "{}- _…and {} more_", indent, files.len() - limit);
    }
}

/// Renders an impact report as markdown.
pub fn render_impact_markdown(
    report: &ImpactReport,
    services: &ServiceCatalog,
    options: &ImpactMarkdownOptions<'_>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", options.title);

    if report.services_to_files.is_empty() && report.unmapped_files.is_empty() {
        out.push_str("_No changed files detected._\n");
        return out;
    }

    let impacted = sorted_impact(report);
    let _ = writeln!(out, "### Impacted services ({})\n", impacted.len());

    for (name, files) in &impacted {
        let mut bits = vec![format!("**{}**", name), format!("({})", plural_files(files.len()))];

        if options.show_metadata
            && let Some(meta) = services.get(name)
        {
            if let Some(owners) = owners_line(meta) {
                bits.push(format!("owners: {}", owners));
            }
            if let Some(slack) = &meta.contact.slack {
                bits.push(format!("slack: `{}`", slack));
            }
            if let Some(oncall) = &meta.oncall {
                bits.push(format!("oncall: {}", oncall));
            }
            if let Some(runbook) = &meta.runbook {
                bits.push(format!("[runbook]({})", runbook));
            }
            if let Some(docs) = &meta.docs {
                bits.push(format!("[docs]({})", docs));
            }
        }

        let _ = writeln!(out, "- {}", bits.join(SEPARATOR));

        if options.include_files {
            push_file_list(&mut out, "  ", files, options.max_files_per_service);
        }
    }
    out.push('\n');

    if options.include_unmapped && report.has_unmapped() {
        let _ = writeln!(
            out,
            "### Unmapped files ({})\n",
            report.unmapped_files.len()
        );
        push_file_list(
            &mut out,
            "",
            &report.unmapped_files,
            options.max_files_per_service,
        );
        out.push('\n');
    }

    out
}

/// Renders the compact pull request comment, wrapped in marker comments.
pub fn render_impact_comment(
    report: &ImpactReport,
    services: &ServiceCatalog,
    marker: &str,
    title: &str,
) -> String {
    let (begin, end) = marker_comments(marker);
    let impacted = sorted_impact(report);

    let mut out = String::new();
    let _ = writeln!(out, "{}\n## {}\n", begin, title);
    let _ = writeln!(out, "**Impacted services:** {}\n", impacted.len());

    if impacted.is_empty() {
        out.push_str("_None_\n");
    }
    for (name, files) in &impacted {
        let mut bits = vec![format!("**{}**", name), plural_files(files.len())];
        if let Some(meta) = services.get(name) {
            if let Some(owners) = owners_line(meta) {
                bits.push(format!("owners: {}", owners));
            }
            if let Some(slack) = &meta.contact.slack {
                bits.push(format!("slack: `{}`", slack));
            }
        }
        let _ = writeln!(out, "- {}", bits.join(SEPARATOR));
    }
    out.push('\n');

    if report.has_unmapped() {
        let _ = writeln!(
            out,
            "**Unmapped files:** {} ⚠️\n",
            report.unmapped_files.len()
        );
        push_file_list(&mut out, "", &report.unmapped_files, COMMENT_UNMAPPED_LIMIT);
        out.push('\n');
    }

    out.push_str("<details>\n<summary>Changed files by service</summary>\n\n");
    if impacted.is_empty() {
        out.push_str("_No mapped services._\n\n");
    }
    for (name, files) in &impacted {
        let _ = writeln!(out, "### {}", name);
        push_file_list(&mut out, "", files, COMMENT_FILES_LIMIT);
        out.push('\n');
    }
    out.push_str("</details>\n\n");
    out.push_str(&end);

    out
}

/// Renders lint issues as a markdown list.
pub fn render_lint_markdown(result: &LintResult, title: &str) -> String {
    if result.is_clean() {
        return format!("### {}\n\n✅ No lint issues found.\n", title);
    }

    let mut out = format!("### {}\n\n", title);
    for issue in &result.issues {
        let icon = match issue.severity {
            Severity::Error => "❌",
            Severity::Warn => "⚠️",
        };
        let location = issue
            .location
            .as_ref()
            .map(|l| format!("{}: ", l))
            .unwrap_or_default();
        let hint = issue
            .hint
            .as_ref()
            .map(|h| format!(" _(hint: {})_", h))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "- {} **{}**: {}{}{}",
            icon, issue.code, location, issue.message, hint
        );
    }
    out
}
