//! JSON report written for the map front end

use crate::error::Result;
use carpool_route_lib::{MapOverlay, MeetingPlan};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Top-level report document. Unreachable distances are written as `null`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub version: &'static str,
    pub plan: &'a MeetingPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<MapOverlay>,
}

impl<'a> Report<'a> {
    pub fn new(plan: &'a MeetingPlan, overlay: Option<MapOverlay>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            plan,
            overlay,
        }
    }

    pub fn to_writer<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Write to `output`, or to stdout when `None`
    pub fn write(&self, output: Option<&Path>, pretty: bool) -> Result<()> {
        match output {
            Some(path) => {
                let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
                self.to_writer(&mut writer, pretty)?;
                writer.flush()?;
                tracing::info!("Report written to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                let mut writer = stdout.lock();
                self.to_writer(&mut writer, pretty)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }

    /// Human readable summary, one line per candidate
    pub fn log_summary(&self) {
        let route = &self.plan.route;
        tracing::info!(
            "Best end point (minimum total distance): {}",
            route.best_end
        );
        for (idx, score) in route.distances.iter().enumerate() {
            let crow_flies = self.plan.crow_flies_km.get(idx).copied().unwrap_or(f64::NAN);
            if score.is_reachable() {
                tracing::info!(
                    "  #{} {}: {:.3} km by road, {:.3} km as the crow flies",
                    idx,
                    score.candidate,
                    score.total_km,
                    crow_flies
                );
            } else {
                tracing::info!(
                    "  #{} {}: unreachable from some start, {:.3} km as the crow flies",
                    idx,
                    score.candidate,
                    crow_flies
                );
            }
        }
        for meeting in &self.plan.overlap.meeting_points {
            tracing::info!(
                "Meeting point of starts {}: {}",
                meeting.group,
                meeting.node
            );
        }
    }
}
