//! Text and JSON renderings of analysis results.

use std::fmt::{self, Display};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    analysis::{AttackReport, Distribution, Ranking, Report},
    error::Result,
    sabotage::Fragmentation,
};

/// Serialises any report type to JSON.
pub fn to_json<S: Serialize>(report: &S, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };

    Ok(json)
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(creator) = &self.creator {
            writeln!(f, "Creator: {creator}")?;
        }
        writeln!(f, "Vertices: {}", self.vertex_count)?;
        writeln!(f, "Edges: {}", self.edge_count)?;
        writeln!(f, "Density: {:.6}", self.density)?;
        writeln!(
            f,
            "Connected: {} ({} components)",
            self.connected, self.component_count
        )?;
        writeln!(f, "Average clustering: {:.4}", self.average_clustering)?;
        writeln!(f, "Mean degree: {:.2}", self.mean_degree)?;

        writeln!(f, "\nDegree distribution:")?;
        for (degree, share) in &self.degree_distribution {
            writeln!(f, "  {degree:>4}  {share:.4}")?;
        }

        for distribution in &self.distributions {
            write!(f, "\n{distribution}")?;
        }

        for ranking in &self.rankings {
            write!(f, "\n{ranking}")?;
        }

        // Attacks are grouped under one banner per removal, in the order they ran.
        for (removal, attacks) in &self.attacks.iter().chunk_by(|attack| attack.removal) {
            let title = format!("Results for {removal} vertices removed:");
            let banner = "=".repeat(title.len());
            writeln!(f, "\n{banner}\n{title}\n{banner}")?;

            for attack in attacks {
                writeln!(f, "{}:", attack.strategy)?;
                writeln!(f, "{}", attack.fragmentation)?;
            }
        }

        write!(f, "duration: {:.3}s", self.duration_secs)
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.title)?;
        for bin in &self.histogram.bins {
            writeln!(f, "  [{:.4}, {:.4})  {}", bin.start, bin.end, bin.count)?;
        }

        Ok(())
    }
}

impl Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top {} by {}:", self.top.len(), self.strategy)?;
        for (rank, vertex) in self.top.iter().enumerate() {
            writeln!(
                f,
                "  {:>3}. {} (id {})  {:.6}",
                rank + 1,
                vertex.label,
                vertex.id,
                vertex.score
            )?;
        }

        Ok(())
    }
}

impl Display for Fragmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Components: {}", self.component_count)?;
        writeln!(
            f,
            "Largest: {} ({:.1}%)",
            self.largest_component,
            self.largest_share() * 100.0
        )?;
        match self.average_fragment_size {
            Some(size) => writeln!(f, "Average size: {size:.2}"),
            None => writeln!(f, "Average size: n/a"),
        }
    }
}

impl Display for AttackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}, {} vertices removed ({}):",
            self.strategy,
            self.removal,
            self.removed.len()
        )?;
        writeln!(f, "Removed: {}", self.removed.iter().join(", "))?;
        write!(f, "{}", self.fragmentation)
    }
}
