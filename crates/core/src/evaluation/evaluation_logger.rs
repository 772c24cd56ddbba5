use std::collections::HashMap;
use std::time::Instant;

use crate::evaluation::accuracy_report::AccuracyReport;
use crate::evaluation::dataset::DatasetEntry;
use crate::scoring::domain::accuracy_grade::AccuracyGrade;

/// Observer for dataset evaluation runs.
///
/// Keeps the evaluator independent of where its output goes (terminal,
/// tests, a future UI).
pub trait EvaluationLogger: Send {
    /// Called as each entry finishes, in completion order.
    fn progress(&mut self, completed: usize, total: usize);

    /// Record how long a named stage took for one entry.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Called once per scored entry, in dataset order.
    fn scored(
        &mut self,
        position: usize,
        total: usize,
        entry: &DatasetEntry,
        transcript: &str,
        score: f64,
        grade: AccuracyGrade,
    );

    /// Called once per entry that could not be scored, in dataset order.
    fn skipped(&mut self, position: usize, total: usize, entry: &DatasetEntry, reason: &str);

    /// Emit the final report. Default: no-op.
    fn summary(&self, _report: &AccuracyReport) {}
}

/// Logger that discards all events.
pub struct NullEvaluationLogger;

impl EvaluationLogger for NullEvaluationLogger {
    fn progress(&mut self, _completed: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn scored(
        &mut self,
        _position: usize,
        _total: usize,
        _entry: &DatasetEntry,
        _transcript: &str,
        _score: f64,
        _grade: AccuracyGrade,
    ) {
    }
    fn skipped(&mut self, _position: usize, _total: usize, _entry: &DatasetEntry, _reason: &str) {}
}

/// CLI logger: one line per entry, stage timings, and the final report.
///
/// Progress output is throttled to every `throttle_entries` entries.
pub struct StdoutEvaluationLogger {
    throttle_entries: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    lines: Vec<String>,
}

impl StdoutEvaluationLogger {
    pub fn new(throttle_entries: usize) -> Self {
        Self {
            throttle_entries: throttle_entries.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            lines: Vec::new(),
        }
    }

    /// Formats the line printed for a scored entry.
    pub fn scored_line(
        position: usize,
        total: usize,
        entry: &DatasetEntry,
        transcript: &str,
        score: f64,
        grade: AccuracyGrade,
    ) -> String {
        let label = match grade {
            AccuracyGrade::Perfect => "Fully Correct",
            AccuracyGrade::MinorErrors => "Minor Errors",
            AccuracyGrade::Incorrect => "Incorrect",
        };
        let mut line = format!(
            "[{position}/{total}] {} {label} ({score:.2}%): '{}'",
            grade.symbol(),
            entry.normalized_transcription
        );
        if grade != AccuracyGrade::Perfect {
            line.push_str(&format!("\n    -> Recognized: '{transcript}'"));
        }
        line
    }

    /// Per-stage timing summary, or `None` if nothing was timed.
    pub fn timing_summary(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!("Timing ({:.1}s total):", elapsed_ms / 1000.0)];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:7.1}ms  total {total_ms:8.0}ms"
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Entry lines emitted so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn emit(&mut self, line: String) {
        log::info!("{line}");
        self.lines.push(line);
    }
}

impl Default for StdoutEvaluationLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl EvaluationLogger for StdoutEvaluationLogger {
    fn progress(&mut self, completed: usize, total: usize) {
        if total > 0 && (completed % self.throttle_entries == 0 || completed == total) {
            let pct = completed as f64 / total as f64 * 100.0;
            log::info!("Evaluating: {completed}/{total} entries ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn scored(
        &mut self,
        position: usize,
        total: usize,
        entry: &DatasetEntry,
        transcript: &str,
        score: f64,
        grade: AccuracyGrade,
    ) {
        self.emit(Self::scored_line(position, total, entry, transcript, score, grade));
    }

    fn skipped(&mut self, position: usize, total: usize, entry: &DatasetEntry, reason: &str) {
        let line = format!("[{position}/{total}] Skipping {}: {reason}", entry.id);
        log::warn!("{line}");
        self.lines.push(line);
    }

    fn summary(&self, report: &AccuracyReport) {
        log::info!("\n\n{report}");
        if let Some(text) = self.timing_summary() {
            log::info!("\n{text}");
        }
    }
}
