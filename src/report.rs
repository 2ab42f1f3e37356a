//! Landing report: what a run selected and whether anything changed.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Landing;
use crate::reconcile::AppliedUpdate;

/// Summary of one landing run.
#[derive(Debug, Clone, Serialize)]
pub struct LandingReport {
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Where the updates landed.
    pub landing: Landing,
    /// Whether any morphology was rewritten.
    pub changed: bool,
    /// One entry per config, in batch order.
    pub updates: Vec<AppliedUpdate>,
}

impl LandingReport {
    /// Renders the report as an aligned text table.
    #[must_use]
    pub fn render_table(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .updates
            .iter()
            .map(|u| {
                [
                    format!("{}:{}", u.stratum, u.chunk),
                    u.selection.display_name.clone(),
                    u.selection.commit.clone(),
                    u.config.clone(),
                ]
            })
            .collect();

        let headers = ["TARGET", "REF", "COMMIT", "CONFIG"];
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| rows.iter().map(|r| r[i].len()).max().unwrap_or(0).max(h.len()))
            .collect();
        let (w0, w1, w2) = (widths[0], widths[1], widths[2]);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Landing {} ({} from {})",
            self.landing.repo, self.landing.myref, self.landing.baseref
        );
        let _ = writeln!(out, "{:<w0$}  {:<w1$}  {:<w2$}  {}", headers[0], headers[1], headers[2], headers[3]);
        let _ = writeln!(out, "{:-<w0$}  {:-<w1$}  {:-<w2$}  {:-<4$}", "", "", "", "", widths[3]);
        for [target, name, commit, config] in &rows {
            let _ = writeln!(out, "{target:<w0$}  {name:<w1$}  {commit:<w2$}  {config}");
        }
        let summary = if self.changed { "morphologies updated" } else { "no changes" };
        let _ = writeln!(out, "\n{} update(s), {summary}.", rows.len());
        out
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Selection;
    use chrono::TimeZone;

    fn report() -> LandingReport {
        LandingReport {
            generated_at: Utc.with_ymd_and_hms(2014, 8, 1, 12, 0, 0).unwrap(),
            landing: Landing {
                repo: "baserock:definitions".into(),
                baseref: "master".into(),
                myref: "firehose/all".into(),
            },
            changed: true,
            updates: vec![AppliedUpdate {
                config: "linux.yaml".into(),
                stratum: "bsp-x86_64-generic".into(),
                chunk: "linux".into(),
                repo: "upstream:linux".into(),
                selection: Selection {
                    canonical: "3.14".into(),
                    raw_name: "refs/tags/v3.14".into(),
                    commit: "455baa7".into(),
                    display_name: "v3.14".into(),
                },
            }],
        }
    }

    #[test]
    fn table_lists_each_update() {
        let table = report().render_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Landing baserock:definitions (firehose/all from master)");
        assert!(lines[1].starts_with("TARGET"));
        assert_eq!(lines[3], "bsp-x86_64-generic:linux  v3.14  455baa7  linux.yaml");
        assert!(table.ends_with("1 update(s), morphologies updated.\n"));
    }

    #[test]
    fn json_carries_selection_details() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["changed"], true);
        assert_eq!(json["generated_at"], "2014-08-01T12:00:00Z");
        assert_eq!(json["updates"][0]["selection"]["raw_name"], "refs/tags/v3.14");
        assert_eq!(json["landing"]["myref"], "firehose/all");
    }
}
