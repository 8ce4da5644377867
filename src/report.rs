//! Convergence reporting for finished (or running) searches.
//!
//! Reports are built from recorded [`GenerationStats`] and never from inside
//! the search loop.

use std::fmt::Write;

use crate::schema::GenerationStats;

/// Renders per-generation max/mean/min fitness.
pub struct ConvergenceReport<'a> {
    history: &'a [GenerationStats],
}

impl<'a> ConvergenceReport<'a> {
    pub fn new(history: &'a [GenerationStats]) -> Self {
        Self { history }
    }

    /// Fixed-width table, one row per generation.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>4} {:>6} {:>12} {:>12} {:>12}",
            "gen", "nevals", "max", "mean", "min"
        );
        for s in self.history {
            let _ = writeln!(
                out,
                "{:>4} {:>6} {:>12.6} {:>12.6} {:>12.6}",
                s.generation, s.evaluations, s.max, s.mean, s.min
            );
        }
        out
    }

    /// CSV with a header row.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("generation,evaluations,max,mean,min\n");
        for s in self.history {
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                s.generation, s.evaluations, s.max, s.mean, s.min
            );
        }
        out
    }

    /// JSON array of generation records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self.history)
    }

    /// ASCII plot of max (`+`), mean (`o`) and min (`-`) fitness by generation.
    ///
    /// Generations are resampled onto `width` columns. Where series overlap,
    /// the max marker is drawn on top.
    pub fn render_chart(&self, width: usize, height: usize) -> String {
        let width = width.max(2);
        let height = height.max(2);

        let values = self
            .history
            .iter()
            .flat_map(|s| [s.max, s.mean, s.min])
            .filter(|v| v.is_finite());
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if lo > hi {
            return String::from("(no finite fitness values)\n");
        }
        let span = if hi > lo { hi - lo } else { 1.0 };

        let mut grid = vec![vec![' '; width]; height];
        let last = self.history.len() - 1;
        for col in 0..width {
            let idx = if last == 0 {
                0
            } else {
                (col * last + (width - 1) / 2) / (width - 1)
            };
            let stats = &self.history[idx];
            for (value, mark) in [(stats.min, '-'), (stats.mean, 'o'), (stats.max, '+')] {
                if !value.is_finite() {
                    continue;
                }
                let level = ((value - lo) / span * (height - 1) as f64).round() as usize;
                grid[height - 1 - level.min(height - 1)][col] = mark;
            }
        }

        let mut out = String::new();
        for (i, row) in grid.iter().enumerate() {
            let label = match i {
                0 => format!("{:>10.4}", hi),
                r if r == height - 1 => format!("{:>10.4}", lo),
                _ => " ".repeat(10),
            };
            let line: String = row.iter().collect();
            let _ = writeln!(out, "{} |{}", label, line.trim_end());
        }
        let _ = writeln!(out, "{} +{}", " ".repeat(10), "-".repeat(width));
        let _ = writeln!(
            out,
            "{}  gen 0{:>pad$}",
            " ".repeat(10),
            format!("gen {}", last),
            pad = width.saturating_sub(5)
        );
        out
    }
}
