use crate::scoring::domain::accuracy_grade::AccuracyGrade;

/// Tally of graded dataset entries.
///
/// Rates are taken over every attempted entry, skipped ones included, so a
/// run with unreadable audio reports lower rates rather than hiding them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyReport {
    pub attempted: usize,
    pub fully_correct: usize,
    pub minor_errors: usize,
    pub incorrect: usize,
    pub skipped: usize,
    /// Accuracy threshold used for grading, shown in the report labels.
    pub accuracy_threshold: f64,
}

impl AccuracyReport {
    pub fn new(attempted: usize, accuracy_threshold: f64) -> Self {
        Self {
            attempted,
            accuracy_threshold,
            ..Self::default()
        }
    }

    pub fn record(&mut self, grade: AccuracyGrade) {
        match grade {
            AccuracyGrade::Perfect => self.fully_correct += 1,
            AccuracyGrade::MinorErrors => self.minor_errors += 1,
            AccuracyGrade::Incorrect => self.incorrect += 1,
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn scored(&self) -> usize {
        self.fully_correct + self.minor_errors + self.incorrect
    }

    pub fn fully_correct_rate(&self) -> f64 {
        self.rate(self.fully_correct)
    }

    pub fn minor_errors_rate(&self) -> f64 {
        self.rate(self.minor_errors)
    }

    pub fn incorrect_rate(&self) -> f64 {
        self.rate(self.incorrect)
    }

    fn rate(&self, count: usize) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            count as f64 / self.attempted as f64 * 100.0
        }
    }
}

impl std::fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(40);
        let threshold = self.accuracy_threshold;
        writeln!(f, "{rule}")?;
        writeln!(f, "        Final Accuracy Report")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total Sentences Tested: {}", self.attempted)?;
        writeln!(
            f,
            "Fully Correct: {} ({:.2}%)",
            self.fully_correct,
            self.fully_correct_rate()
        )?;
        writeln!(
            f,
            "Minor Errors (>={threshold}%): {} ({:.2}%)",
            self.minor_errors,
            self.minor_errors_rate()
        )?;
        write!(
            f,
            "Incorrect (<{threshold}%): {} ({:.2}%)",
            self.incorrect,
            self.incorrect_rate()
        )?;
        if self.skipped > 0 {
            write!(f, "\nSkipped: {}", self.skipped)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report_with(grades: &[AccuracyGrade], skipped: usize) -> AccuracyReport {
        let mut report = AccuracyReport::new(grades.len() + skipped, 70.0);
        for g in grades {
            report.record(*g);
        }
        for _ in 0..skipped {
            report.record_skipped();
        }
        report
    }

    #[test]
    fn test_record_counts_each_grade() {
        let report = report_with(
            &[
                AccuracyGrade::Perfect,
                AccuracyGrade::Perfect,
                AccuracyGrade::MinorErrors,
                AccuracyGrade::Incorrect,
            ],
            0,
        );
        assert_eq!(report.fully_correct, 2);
        assert_eq!(report.minor_errors, 1);
        assert_eq!(report.incorrect, 1);
        assert_eq!(report.scored(), 4);
    }

    #[test]
    fn test_rates_include_skipped_entries() {
        let report = report_with(&[AccuracyGrade::Perfect, AccuracyGrade::Incorrect], 2);
        assert_relative_eq!(report.fully_correct_rate(), 25.0);
        assert_relative_eq!(report.incorrect_rate(), 25.0);
        assert_relative_eq!(report.minor_errors_rate(), 0.0);
    }

    #[test]
    fn test_rates_zero_when_nothing_attempted() {
        let report = AccuracyReport::new(0, 70.0);
        assert_eq!(report.fully_correct_rate(), 0.0);
        assert_eq!(report.minor_errors_rate(), 0.0);
        assert_eq!(report.incorrect_rate(), 0.0);
    }

    #[test]
    fn test_display_matches_report_layout() {
        let report = report_with(
            &[
                AccuracyGrade::Perfect,
                AccuracyGrade::MinorErrors,
                AccuracyGrade::Incorrect,
                AccuracyGrade::Incorrect,
            ],
            0,
        );
        let text = report.to_string();
        assert!(text.contains("Final Accuracy Report"));
        assert!(text.contains("Total Sentences Tested: 4"));
        assert!(text.contains("Fully Correct: 1 (25.00%)"));
        assert!(text.contains("Minor Errors (>=70%): 1 (25.00%)"));
        assert!(text.contains("Incorrect (<70%): 2 (50.00%)"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_display_mentions_skipped() {
        let report = report_with(&[AccuracyGrade::Perfect], 1);
        assert!(report.to_string().ends_with("Skipped: 1"));
    }
}
