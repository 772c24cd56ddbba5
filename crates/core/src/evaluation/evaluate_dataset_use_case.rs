use std::path::Path;
use std::time::Instant;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::evaluation::accuracy_report::AccuracyReport;
use crate::evaluation::dataset::{Dataset, DatasetEntry, DatasetError};
use crate::evaluation::evaluation_logger::EvaluationLogger;
use crate::scoring::domain::accuracy_grade::{AccuracyGrade, GradeThresholds};
use crate::scoring::domain::word_accuracy_scorer::WordAccuracyScorer;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

/// What happened to one dataset entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Scored {
        transcript: String,
        score: f64,
        grade: AccuracyGrade,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct EntryResult {
    pub entry: DatasetEntry,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub report: AccuracyReport,
    /// One result per attempted entry, in dataset order.
    pub results: Vec<EntryResult>,
}

struct WorkerResult {
    index: usize,
    outcome: EntryOutcome,
    decode_ms: Option<f64>,
    transcribe_ms: Option<f64>,
}

/// Runs recognizer + scorer over the first `limit` entries of a dataset and
/// grades each against its normalized transcription.
///
/// Entries are independent, so they are spread over `workers` threads that
/// share the reader and recognizer. Results are reported in dataset order
/// whatever the worker count.
pub struct EvaluateDatasetUseCase {
    reader: Box<dyn AudioReader>,
    recognizer: Box<dyn SpeechRecognizer>,
    scorer: WordAccuracyScorer,
    thresholds: GradeThresholds,
    workers: usize,
}

impl EvaluateDatasetUseCase {
    pub fn new(
        reader: Box<dyn AudioReader>,
        recognizer: Box<dyn SpeechRecognizer>,
        scorer: WordAccuracyScorer,
        thresholds: GradeThresholds,
        workers: usize,
    ) -> Self {
        Self {
            reader,
            recognizer,
            scorer,
            thresholds,
            workers: workers.max(1),
        }
    }

    pub fn execute(
        &self,
        dataset_root: &Path,
        limit: usize,
        logger: &mut dyn EvaluationLogger,
    ) -> Result<EvaluationSummary, DatasetError> {
        let dataset = Dataset::open(dataset_root)?;
        Ok(self.evaluate(&dataset, limit, logger))
    }

    pub fn evaluate(
        &self,
        dataset: &Dataset,
        limit: usize,
        logger: &mut dyn EvaluationLogger,
    ) -> EvaluationSummary {
        let entries = &dataset.entries()[..limit.min(dataset.entries().len())];
        let total = entries.len();
        let workers = self.workers.min(total).max(1);
        log::info!("Evaluating {total} entries with {workers} worker(s)");

        let mut slots: Vec<Option<EntryOutcome>> = vec![None; total];

        std::thread::scope(|scope| {
            let (job_tx, job_rx) =
                crossbeam_channel::bounded::<usize>(workers.saturating_mul(2));
            let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerResult>();

            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for index in job_rx {
                        let result = self.evaluate_entry(dataset, &entries[index], index);
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            scope.spawn(move || {
                for index in 0..total {
                    if job_tx.send(index).is_err() {
                        break;
                    }
                }
            });

            for (completed, result) in result_rx.iter().enumerate() {
                if let Some(ms) = result.decode_ms {
                    logger.timing("decode", ms);
                }
                if let Some(ms) = result.transcribe_ms {
                    logger.timing("transcribe", ms);
                }
                slots[result.index] = Some(result.outcome);
                logger.progress(completed + 1, total);
            }
        });

        let mut report = AccuracyReport::new(total, self.thresholds.accuracy);
        let mut results = Vec::with_capacity(total);
        for (index, (entry, slot)) in entries.iter().zip(slots).enumerate() {
            let outcome = slot.unwrap_or_else(|| EntryOutcome::Skipped {
                reason: "worker stopped before scoring".to_string(),
            });
            match &outcome {
                EntryOutcome::Scored {
                    transcript,
                    score,
                    grade,
                } => {
                    report.record(*grade);
                    logger.scored(index + 1, total, entry, transcript, *score, *grade);
                }
                EntryOutcome::Skipped { reason } => {
                    report.record_skipped();
                    logger.skipped(index + 1, total, entry, reason);
                }
            }
            results.push(EntryResult {
                entry: entry.clone(),
                outcome,
            });
        }

        logger.summary(&report);
        EvaluationSummary { report, results }
    }

    fn evaluate_entry(&self, dataset: &Dataset, entry: &DatasetEntry, index: usize) -> WorkerResult {
        let skipped = |reason: String, decode_ms, transcribe_ms| WorkerResult {
            index,
            outcome: EntryOutcome::Skipped { reason },
            decode_ms,
            transcribe_ms,
        };

        let path = dataset.audio_path(entry);
        if !path.exists() {
            return skipped(
                format!("audio file not found: {}", path.display()),
                None,
                None,
            );
        }

        let started = Instant::now();
        let mut audio = match self.reader.read_audio(&path, WHISPER_SAMPLE_RATE) {
            Ok(Some(audio)) => audio,
            Ok(None) => return skipped("file has no audio stream".to_string(), None, None),
            Err(e) => return skipped(format!("failed to decode audio: {e}"), None, None),
        };
        audio.normalize_peak();
        let decode_ms = Some(elapsed_ms(started));

        let started = Instant::now();
        let transcript = match self.recognizer.transcribe(&audio) {
            Ok(text) => text,
            Err(e) => return skipped(format!("recognition failed: {e}"), decode_ms, None),
        };
        let transcribe_ms = Some(elapsed_ms(started));

        let score = self
            .scorer
            .score_text(&transcript, &entry.normalized_transcription);
        WorkerResult {
            index,
            outcome: EntryOutcome::Scored {
                transcript,
                score,
                grade: AccuracyGrade::classify(score, &self.thresholds),
            },
            decode_ms,
            transcribe_ms,
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use crate::evaluation::evaluation_logger::{NullEvaluationLogger, StdoutEvaluationLogger};
    use crate::scoring::domain::normalizer::NormalizationMode;
    use approx::assert_relative_eq;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    // ─── Stubs ───

    /// Encodes the entry's position in the segment length so the recognizer
    /// stub knows which utterance it is hearing.
    struct StubAudioReader {
        ids: Vec<String>,
        no_audio: Vec<String>,
        broken: Vec<String>,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            path: &Path,
            rate: u32,
        ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
            let stem = path.file_stem().unwrap().to_string_lossy().to_string();
            if self.no_audio.contains(&stem) {
                return Ok(None);
            }
            if self.broken.contains(&stem) {
                return Err("invalid data found when processing input".into());
            }
            let position = self.ids.iter().position(|id| *id == stem).unwrap();
            Ok(Some(AudioSegment::new(vec![0.5; position + 1], rate, 1)))
        }
    }

    struct StubRecognizer {
        transcripts: Vec<Result<String, String>>,
        calls: Arc<AtomicUsize>,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn transcribe(&self, audio: &AudioSegment) -> Result<String, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if audio.samples()[0] != 1.0 {
                return Err("audio was not peak-normalized".into());
            }
            self.transcripts[audio.samples().len() - 1]
                .clone()
                .map_err(|e| e.into())
        }
    }

    struct Fixture {
        dir: TempDir,
        ids: Vec<String>,
    }

    /// Writes metadata.csv and one placeholder wav per entry.
    /// `(id, normalized transcription, has_wav)`
    fn fixture(rows: &[(&str, &str, bool)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let wavs = dir.path().join("wavs");
        fs::create_dir_all(&wavs).unwrap();
        let mut metadata = String::new();
        for (id, text, has_wav) in rows {
            metadata.push_str(&format!("{id}|{text}|{text}\n"));
            if *has_wav {
                fs::write(wavs.join(format!("{id}.wav")), b"RIFF").unwrap();
            }
        }
        fs::write(dir.path().join("metadata.csv"), metadata).unwrap();
        Fixture {
            dir,
            ids: rows.iter().map(|r| r.0.to_string()).collect(),
        }
    }

    fn use_case(
        fixture: &Fixture,
        transcripts: &[Result<&str, &str>],
        workers: usize,
    ) -> (EvaluateDatasetUseCase, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let recognizer = StubRecognizer {
            transcripts: transcripts
                .iter()
                .map(|t| t.map(str::to_string).map_err(str::to_string))
                .collect(),
            calls: calls.clone(),
        };
        let reader = StubAudioReader {
            ids: fixture.ids.clone(),
            no_audio: vec!["LJ-silent".to_string()],
            broken: vec!["LJ-broken".to_string()],
        };
        let uc = EvaluateDatasetUseCase::new(
            Box::new(reader),
            Box::new(recognizer),
            WordAccuracyScorer::new(NormalizationMode::StripPunctuation),
            GradeThresholds::default(),
            workers,
        );
        (uc, calls)
    }

    fn scores(summary: &EvaluationSummary) -> Vec<Option<f64>> {
        summary
            .results
            .iter()
            .map(|r| match &r.outcome {
                EntryOutcome::Scored { score, .. } => Some(*score),
                EntryOutcome::Skipped { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_grades_each_entry() {
        let f = fixture(&[
            ("LJ-1", "Hello, world.", true),
            ("LJ-2", "hello", true),
            ("LJ-3", "the quick fox", true),
        ]);
        let (uc, _) = use_case(&f, &[Ok("hello world"), Ok("helko"), Ok("a")], 2);
        let summary = uc
            .execute(f.dir.path(), 50, &mut NullEvaluationLogger)
            .unwrap();

        assert_eq!(summary.report.attempted, 3);
        assert_eq!(summary.report.fully_correct, 1);
        assert_eq!(summary.report.minor_errors, 1);
        assert_eq!(summary.report.incorrect, 1);
        let s = scores(&summary);
        assert_relative_eq!(s[0].unwrap(), 100.0);
        assert_relative_eq!(s[1].unwrap(), 80.0);
        assert_relative_eq!(s[2].unwrap(), 0.0);
    }

    #[test]
    fn test_limit_takes_first_entries() {
        let f = fixture(&[
            ("LJ-1", "one", true),
            ("LJ-2", "two", true),
            ("LJ-3", "three", true),
        ]);
        let (uc, calls) = use_case(&f, &[Ok("one"), Ok("two"), Ok("three")], 4);
        let summary = uc
            .execute(f.dir.path(), 2, &mut NullEvaluationLogger)
            .unwrap();
        assert_eq!(summary.report.attempted, 2);
        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.results[1].entry.id, "LJ-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_results_in_dataset_order_for_any_worker_count() {
        let rows: Vec<(String, String)> = (0..20)
            .map(|i| (format!("LJ-{i:02}"), format!("word{i}")))
            .collect();
        let row_refs: Vec<(&str, &str, bool)> = rows
            .iter()
            .map(|(id, text)| (id.as_str(), text.as_str(), true))
            .collect();
        let f = fixture(&row_refs);
        let transcripts: Vec<Result<&str, &str>> =
            rows.iter().map(|(_, text)| Ok(text.as_str())).collect();

        let (single, _) = use_case(&f, &transcripts, 1);
        let (many, _) = use_case(&f, &transcripts, 8);
        let a = single.execute(f.dir.path(), 50, &mut NullEvaluationLogger).unwrap();
        let b = many.execute(f.dir.path(), 50, &mut NullEvaluationLogger).unwrap();

        let ids_a: Vec<_> = a.results.iter().map(|r| r.entry.id.clone()).collect();
        let ids_b: Vec<_> = b.results.iter().map(|r| r.entry.id.clone()).collect();
        assert_eq!(ids_a, f.ids);
        assert_eq!(ids_a, ids_b);
        assert_eq!(scores(&a), scores(&b));
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn test_failures_are_skipped_not_fatal() {
        let f = fixture(&[
            ("LJ-ok", "hello", true),
            ("LJ-missing", "hello", false),
            ("LJ-silent", "hello", true),
            ("LJ-broken", "hello", true),
            ("LJ-asr", "hello", true),
        ]);
        let (uc, _) = use_case(
            &f,
            &[Ok("hello"), Ok("-"), Ok("-"), Ok("-"), Err("model crashed")],
            3,
        );
        let summary = uc
            .execute(f.dir.path(), 50, &mut NullEvaluationLogger)
            .unwrap();

        assert_eq!(summary.report.attempted, 5);
        assert_eq!(summary.report.fully_correct, 1);
        assert_eq!(summary.report.skipped, 4);
        assert_relative_eq!(summary.report.fully_correct_rate(), 20.0);

        let reasons: Vec<String> = summary
            .results
            .iter()
            .filter_map(|r| match &r.outcome {
                EntryOutcome::Skipped { reason } => Some(reason.clone()),
                _ => None,
            })
            .collect();
        assert!(reasons[0].contains("not found"));
        assert!(reasons[1].contains("no audio stream"));
        assert!(reasons[2].contains("decode"));
        assert!(reasons[3].contains("model crashed"));
    }

    #[test]
    fn test_worker_count_larger_than_dataset() {
        let f = fixture(&[("LJ-1", "hello", true)]);
        let (uc, calls) = use_case(&f, &[Ok("hello")], usize::MAX);
        let summary = uc
            .execute(f.dir.path(), 50, &mut NullEvaluationLogger)
            .unwrap();
        assert_eq!(summary.report.fully_correct, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_metadata_is_error() {
        let dir = TempDir::new().unwrap();
        let f = Fixture {
            dir,
            ids: Vec::new(),
        };
        let (uc, _) = use_case(&f, &[], 2);
        let result = uc.execute(f.dir.path(), 50, &mut NullEvaluationLogger);
        assert!(matches!(result, Err(DatasetError::Read { .. })));
    }

    #[test]
    fn test_empty_dataset_reports_zero() {
        let f = fixture(&[]);
        let (uc, calls) = use_case(&f, &[], 2);
        let summary = uc
            .execute(f.dir.path(), 50, &mut NullEvaluationLogger)
            .unwrap();
        assert_eq!(summary.report.attempted, 0);
        assert_eq!(summary.report.fully_correct_rate(), 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_logger_receives_lines_and_timings() {
        let f = fixture(&[("LJ-1", "hello", true), ("LJ-2", "world", false)]);
        let (uc, _) = use_case(&f, &[Ok("hello"), Ok("-")], 2);
        let mut logger = StdoutEvaluationLogger::new(1);
        uc.execute(f.dir.path(), 50, &mut logger).unwrap();

        assert_eq!(logger.lines().len(), 2);
        assert!(logger.lines()[0].starts_with("[1/2]"));
        assert!(logger.lines()[1].starts_with("[2/2] Skipping LJ-2"));
        assert_eq!(logger.timings_for("transcribe").unwrap().len(), 1);
        assert_eq!(logger.timings_for("decode").unwrap().len(), 1);
    }
}
