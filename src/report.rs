//! Minimal result renderers (spec §1 Non-goals: "the concrete text/
//! JSON/XML/YAML/markdown result renderers" are explicitly out of
//! scope for the framework; the aggregator only promises an ordered
//! result stream, §4.5). This module is the thinnest possible
//! consumer of that stream so the CLI has something to write to
//! `--output`; it is deliberately not a feature-complete reporting
//! system.
//!
//! Grounded in the teacher's own `models::Output` + `serde_json::to_
//! string_pretty` pattern (`main.rs::write_output`): serialize the
//! domain records directly rather than hand-building a separate
//! report DTO.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::result::ResultRecord;
use crate::models::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Xml,
    Yaml,
    Markdown,
    Summary,
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "yaml" => Ok(Format::Yaml),
            "markdown" => Ok(Format::Markdown),
            "summary" => Ok(Format::Summary),
            other => anyhow::bail!("unrecognized --format {other:?}"),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    worst: Severity,
    results: &'a [ResultRecord],
}

/// Render the ordered result stream once, per the renderer contract
/// (§4.5 "a renderer consumes the ordered result list once and is not
/// invoked re-entrantly"). Each format here is a straightforward,
/// non-exhaustive rendering — a full implementation of any one of them
/// is explicitly out of scope.
pub fn render(out: &mut dyn Write, format: Format, worst: Severity, results: &[ResultRecord]) -> Result<()> {
    match format {
        Format::Text => render_text(out, results),
        Format::Summary => render_summary(out, worst, results),
        Format::Markdown => render_markdown(out, results),
        Format::Json => {
            let report = Report { worst, results };
            serde_json::to_writer_pretty(out, &report).context("writing JSON report")
        }
        Format::Yaml => {
            let report = Report { worst, results };
            serde_yaml::to_writer(out, &report).context("writing YAML report")
        }
        Format::Xml => render_xml(out, results),
    }
}

fn render_text(out: &mut dyn Write, results: &[ResultRecord]) -> Result<()> {
    for r in results {
        writeln!(out, "{}: {}: {}", r.inspection, r.severity, r.message)?;
        if let Some(remedy) = &r.remedy {
            writeln!(out, "    remedy: {remedy}")?;
        }
    }
    Ok(())
}

fn render_markdown(out: &mut dyn Write, results: &[ResultRecord]) -> Result<()> {
    writeln!(out, "| inspection | severity | message |")?;
    writeln!(out, "|---|---|---|")?;
    for r in results {
        writeln!(out, "| {} | {} | {} |", r.inspection, r.severity, r.message.replace('|', "\\|"))?;
    }
    Ok(())
}

fn render_summary(out: &mut dyn Write, worst: Severity, results: &[ResultRecord]) -> Result<()> {
    let mut counts: std::collections::BTreeMap<String, u32> = std::collections::BTreeMap::new();
    for r in results {
        *counts.entry(r.severity.to_string()).or_default() += 1;
    }
    writeln!(out, "worst severity: {worst}")?;
    for (severity, count) in counts {
        writeln!(out, "  {severity}: {count}")?;
    }
    Ok(())
}

fn render_xml(out: &mut dyn Write, results: &[ResultRecord]) -> Result<()> {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<results>")?;
    for r in results {
        writeln!(
            out,
            "  <result inspection=\"{}\" severity=\"{}\">{}</result>",
            xml_escape(&r.inspection),
            r.severity,
            xml_escape(&r.message),
        )?;
    }
    writeln!(out, "</results>")?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::ResultParams;

    fn sample() -> Vec<ResultRecord> {
        vec![ResultParams {
            severity: Severity::Verify,
            inspection: "elf".into(),
            message: "missing RELRO".into(),
            ..Default::default()
        }
        .into()]
    }

    #[test]
    fn format_from_str_accepts_all_documented_values() {
        for s in ["text", "json", "xml", "yaml", "markdown", "summary"] {
            assert!(s.parse::<Format>().is_ok(), "{s} should parse");
        }
        assert!("bogus".parse::<Format>().is_err());
    }

    #[test]
    fn json_report_round_trips_through_serde() {
        let results = sample();
        let mut buf = Vec::new();
        render(&mut buf, Format::Json, Severity::Verify, &results).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["worst"], "verify");
        assert_eq!(parsed["results"][0]["inspection"], "elf");
    }

    #[test]
    fn text_report_includes_inspection_and_message() {
        let results = sample();
        let mut buf = Vec::new();
        render(&mut buf, Format::Text, Severity::Verify, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("elf"));
        assert!(text.contains("missing RELRO"));
    }

    #[test]
    fn summary_report_counts_by_severity() {
        let results = sample();
        let mut buf = Vec::new();
        render(&mut buf, Format::Summary, Severity::Verify, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("worst severity: verify"));
        assert!(text.contains("verify: 1"));
    }
}
