//! Reporting layer: formatted per-node output and run totals.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use noderewards_core::NodeRecord;
use noderewards_engine::{DecodeFailure, Report, Summary};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// One line per node followed by totals.
    #[default]
    Pretty,
    /// A single JSON document.
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(ReportFormat::Pretty),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Parse an offset such as `+02:00`, `-05:30` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value == "Z" {
        return FixedOffset::east_opt(0).context("UTC offset out of range");
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        anyhow::bail!("UTC offset must look like +HH:MM (got '{}')", value);
    };

    let (hours, minutes) = rest
        .split_once(':')
        .with_context(|| format!("UTC offset must look like +HH:MM (got '{}')", value))?;
    let hours: i32 = hours
        .parse()
        .with_context(|| format!("Invalid UTC offset hours in '{}'", value))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("Invalid UTC offset minutes in '{}'", value))?;
    if !(0..60).contains(&minutes) {
        anyhow::bail!("Invalid UTC offset minutes in '{}'", value);
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("UTC offset out of range: '{}'", value))
}

/// Format a unix timestamp as RFC 3339 with an explicit offset.
pub fn format_timestamp(timestamp: u64, offset: &FixedOffset) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.with_timezone(offset).to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

/// One reconciled node, ready for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    /// Owner address.
    pub address: Address,
    /// Node name.
    pub name: String,
    /// Creation timestamp (unix seconds).
    pub created_at: u64,
    /// Creation time, RFC 3339.
    pub created_at_formatted: String,
    /// Last claim timestamp (unix seconds).
    pub last_claim: u64,
    /// Last claim time, RFC 3339.
    pub last_claim_formatted: String,
    /// Whether any claim applied.
    pub had_claim: bool,
}

impl NodeReport {
    /// Attach formatted timestamps to a reconciled node.
    pub fn from_record(node: &NodeRecord, offset: &FixedOffset) -> Self {
        Self {
            address: node.owner,
            name: node.name.clone(),
            created_at: node.created_at,
            created_at_formatted: format_timestamp(node.created_at, offset),
            last_claim: node.last_claim,
            last_claim_formatted: format_timestamp(node.last_claim, offset),
            had_claim: node.had_claim,
        }
    }
}

/// A full run, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Reconciled nodes.
    pub nodes: Vec<NodeReport>,
    /// Counters.
    pub summary: Summary,
    /// Dropped transactions.
    pub failures: Vec<DecodeFailure>,
}

impl RunReport {
    /// Build the output form of an engine report.
    pub fn new(report: &Report, offset: &FixedOffset) -> Self {
        Self {
            nodes: report
                .nodes
                .iter()
                .map(|node| NodeReport::from_record(node, offset))
                .collect(),
            summary: report.summary,
            failures: report.failures.clone(),
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report")
            }
            ReportFormat::Pretty => Ok(self.render_pretty()),
        }
    }

    fn render_pretty(&self) -> String {
        let mut out = String::new();

        for node in &self.nodes {
            let claim = if node.had_claim {
                node.last_claim_formatted.as_str()
            } else {
                "never"
            };
            let _ = writeln!(
                out,
                "{}: {} | created {} | last claim {}",
                node.address, node.name, node.created_at_formatted, claim
            );
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\nDropped transactions:");
            for failure in &self.failures {
                let _ = writeln!(
                    out,
                    "  {} ({}): {}",
                    failure.tx_hash, failure.kind, failure.message
                );
            }
        }

        let s = &self.summary;
        let _ = writeln!(out, "\nTotal Nodes: {}", s.nodes_created);
        let _ = writeln!(out, "Nodes With Claims: {}", s.nodes_with_claim);
        let _ = writeln!(out, "Single Claims: {}", s.single_claims);
        let _ = writeln!(out, "Claim-All Transactions: {}", s.claim_alls);
        let _ = writeln!(out, "Ignored Transactions: {}", s.ignored);
        let _ = writeln!(out, "Undecodable Transactions: {}", s.decode_failures);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("CET").is_err());
        assert!(parse_utc_offset("+2").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
        assert!(parse_utc_offset("+30:00").is_err());
        assert!(parse_utc_offset("").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0, &utc()), "1970-01-01T00:00:00+00:00");
        let plus_two = parse_utc_offset("+02:00").unwrap();
        assert_eq!(
            format_timestamp(1_646_150_400, &plus_two),
            "2022-03-01T18:00:00+02:00"
        );
        assert_eq!(format_timestamp(u64::MAX, &utc()), "unknown");
    }

    fn sample() -> Report {
        let mut claimed = NodeRecord::new(Address::with_last_byte(1), "alpha".into(), 100);
        claimed.last_claim = 200;
        claimed.had_claim = true;
        let fresh = NodeRecord::new(Address::with_last_byte(2), "beta".into(), 300);

        Report {
            summary: Summary {
                transactions: 3,
                nodes_created: 2,
                nodes_with_claim: 1,
                claim_alls: 1,
                ..Summary::default()
            },
            nodes: vec![claimed, fresh],
            failures: vec![],
        }
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let rendered = RunReport::new(&sample(), &utc())
            .render(ReportFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let node = &value["nodes"][0];
        assert_eq!(node["name"], "alpha");
        assert_eq!(node["createdAt"], 100);
        assert_eq!(node["lastClaimFormatted"], "1970-01-01T00:03:20+00:00");
        assert_eq!(node["hadClaim"], true);
        assert_eq!(value["summary"]["nodesCreated"], 2);
        assert_eq!(value["summary"]["nodesWithClaim"], 1);
        assert_eq!(value["summary"]["claimAlls"], 1);
    }

    #[test]
    fn test_json_failures_use_camel_case_fields() {
        let mut report = sample();
        report.failures.push(DecodeFailure {
            tx_hash: noderewards_core::B256::repeat_byte(0xab),
            kind: noderewards_core::TxKind::ClaimSingle,
            reason: "timestamp_overflow",
            message: "claim target does not fit in a timestamp".into(),
        });
        report.summary.decode_failures = 1;

        let rendered = RunReport::new(&report, &utc())
            .render(ReportFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["summary"]["decodeFailures"], 1);
        let failure = &value["failures"][0];
        assert_eq!(failure["txHash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(failure["kind"], "claim_single");
        assert_eq!(failure["reason"], "timestamp_overflow");
        assert!(failure.get("tx_hash").is_none());
    }

    #[test]
    fn test_pretty_lists_nodes_and_totals() {
        let rendered = RunReport::new(&sample(), &utc())
            .render(ReportFormat::Pretty)
            .unwrap();

        assert!(rendered.contains("alpha | created 1970-01-01T00:01:40+00:00 | last claim 1970-01-01T00:03:20+00:00"));
        assert!(rendered.contains("beta | created 1970-01-01T00:05:00+00:00 | last claim never"));
        assert!(rendered.contains("Total Nodes: 2"));
        assert!(rendered.contains("Nodes With Claims: 1"));
        assert!(!rendered.contains("Dropped transactions"));
    }
}
