mod settings;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use pronounce_core::audio::domain::audio_reader::AudioReader;
use pronounce_core::audio::domain::speech_recognizer::SpeechRecognizer;
use pronounce_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use pronounce_core::audio::infrastructure::whisper_recognizer::{
    threads_per_worker, WhisperRecognizer,
};
use pronounce_core::evaluation::evaluate_dataset_use_case::EvaluateDatasetUseCase;
use pronounce_core::evaluation::evaluation_logger::StdoutEvaluationLogger;
use pronounce_core::practice::practice_session::PracticeSession;
use pronounce_core::scoring::domain::accuracy_grade::{AccuracyGrade, GradeThresholds};
use pronounce_core::scoring::domain::normalizer::NormalizationMode;
use pronounce_core::scoring::domain::word_accuracy_scorer::{Alignment, WordAccuracyScorer};
use pronounce_core::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL, WHISPER_SAMPLE_RATE};
use pronounce_core::shared::model_resolver;

use settings::{Normalization, Settings};

/// Pronunciation practice: speak a phrase, get a word-accuracy score.
#[derive(Parser)]
#[command(name = "pronounce")]
struct Cli {
    /// Score at or above which an attempt counts as correct (0-100).
    #[arg(long, global = true)]
    accuracy_threshold: Option<f64>,

    /// Score at or above which an attempt counts as perfect (0-100).
    #[arg(long, global = true)]
    perfect_threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a transcript against the expected phrase, no audio involved.
    Score {
        expected: String,
        transcribed: String,
        /// Strip punctuation before comparing.
        #[arg(long)]
        strict: bool,
    },
    /// Transcribe a recording of a phrase and grade it.
    Practice {
        /// The phrase the speaker was asked to say.
        phrase: String,
        /// Recorded audio (WAV, FLAC, MP3, ...).
        audio: PathBuf,
    },
    /// Grade recognition accuracy over an LJSpeech-style dataset.
    Evaluate {
        /// Dataset root containing metadata.csv and wavs/.
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Number of entries to evaluate.
        #[arg(long)]
        limit: Option<usize>,
        /// Worker threads (default: one per CPU).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Show the effective settings.
    Config {
        /// Save them, threshold flags included, as the new defaults.
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(Settings::load(), &cli);
    settings.validate()?;
    let thresholds = GradeThresholds::new(settings.accuracy_threshold, settings.perfect_threshold);

    match cli.command {
        Command::Score {
            expected,
            transcribed,
            strict,
        } => {
            let mode = if strict {
                NormalizationMode::StripPunctuation
            } else {
                normalization_mode(settings.practice_normalization)
            };
            run_score(&expected, &transcribed, mode, &thresholds);
        }
        Command::Practice { phrase, audio } => {
            validate_input(&audio)?;
            run_practice(&phrase, &audio, &settings, thresholds)?;
        }
        Command::Evaluate {
            dataset,
            limit,
            workers,
        } => {
            let dataset = dataset.unwrap_or_else(|| settings.dataset_path.clone());
            let limit = limit.unwrap_or(settings.evaluation_limit);
            let workers = workers.unwrap_or(settings.workers);
            if limit == 0 {
                return Err("Limit must be at least 1".into());
            }
            run_evaluate(&dataset, limit, workers, &settings, thresholds)?;
        }
        Command::Config { save } => run_config(&settings, save)?,
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(t) = cli.accuracy_threshold {
        settings.accuracy_threshold = t;
    }
    if let Some(t) = cli.perfect_threshold {
        settings.perfect_threshold = t;
    }
    settings
}

fn run_score(
    expected: &str,
    transcribed: &str,
    mode: NormalizationMode,
    thresholds: &GradeThresholds,
) {
    let scorer = WordAccuracyScorer::new(mode);
    let alignment = scorer.align_text(transcribed, expected);
    let score = alignment.score();
    let grade = AccuracyGrade::classify(score, thresholds);

    println!("{} {}", grade.symbol(), grade.feedback(score, expected));
    print_alignment(&alignment, expected, &scorer);
}

fn run_practice(
    phrase: &str,
    audio_path: &Path,
    settings: &Settings,
    thresholds: GradeThresholds,
) -> Result<(), Box<dyn std::error::Error>> {
    let recognizer = build_recognizer(settings, 1)?;
    let mut audio = FfmpegAudioReader
        .read_audio(audio_path, WHISPER_SAMPLE_RATE)?
        .ok_or_else(|| format!("No audio stream in {}", audio_path.display()))?;
    audio.normalize_peak();
    log::info!("Loaded {:.2}s of audio", audio.duration());

    let scorer = WordAccuracyScorer::new(normalization_mode(settings.practice_normalization));
    let mut session = PracticeSession::new(recognizer, scorer, thresholds);
    let result = session.attempt(audio, phrase)?;

    println!("You said: '{}'", result.transcript);
    println!("{} {}", result.grade.symbol(), result.feedback());
    print_alignment(&result.alignment, phrase, &scorer);
    Ok(())
}

fn run_evaluate(
    dataset: &Path,
    limit: usize,
    workers: usize,
    settings: &Settings,
    thresholds: GradeThresholds,
) -> Result<(), Box<dyn std::error::Error>> {
    if !dataset.is_dir() {
        return Err(format!("Dataset directory not found: {}", dataset.display()).into());
    }
    let workers = if workers == 0 {
        std::thread::available_parallelism().map_or(1, |n| n.get())
    } else {
        workers
    };

    let recognizer = build_recognizer(settings, workers.min(limit))?;
    let use_case = EvaluateDatasetUseCase::new(
        Box::new(FfmpegAudioReader),
        recognizer,
        WordAccuracyScorer::new(NormalizationMode::StripPunctuation),
        thresholds,
        workers,
    );

    let mut logger = StdoutEvaluationLogger::default();
    let summary = use_case.execute(dataset, limit, &mut logger)?;
    if summary.report.scored() == 0 {
        return Err("No dataset entries could be scored".into());
    }
    Ok(())
}

/// `workers` is the number of recognizer calls that will run at once.
fn build_recognizer(
    settings: &Settings,
    workers: usize,
) -> Result<Box<dyn SpeechRecognizer>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {WHISPER_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        WHISPER_MODEL_NAME,
        WHISPER_MODEL_URL,
        settings.model_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    let recognizer = WhisperRecognizer::new(&model_path)?
        .with_language(&settings.language)
        .with_threads(threads_per_worker(workers));
    log::debug!("{recognizer:?}");
    Ok(Box::new(recognizer))
}

fn run_config(settings: &Settings, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    if save {
        let path = settings.save()?;
        println!("Saved to {}", path.display());
    } else if let Some(path) = Settings::config_path() {
        println!("Settings file: {}", path.display());
    }
    Ok(())
}

fn print_alignment(alignment: &Alignment, expected: &str, scorer: &WordAccuracyScorer) {
    let expected_words = pronounce_core::normalize(expected, scorer.mode());
    for m in alignment.matches() {
        match m.expected_index {
            Some(i) => println!(
                "  {:<16} -> {:<16} {:.2}",
                m.transcribed, expected_words[i], m.similarity
            ),
            None => println!("  {:<16} -> (extra)", m.transcribed),
        }
    }
    let missed: Vec<&str> = alignment
        .missed_expected()
        .into_iter()
        .map(|i| expected_words[i].as_str())
        .collect();
    if !missed.is_empty() {
        println!("  Missed: {}", missed.join(", "));
    }
}

fn normalization_mode(normalization: Normalization) -> NormalizationMode {
    match normalization {
        Normalization::Basic => NormalizationMode::Basic,
        Normalization::Strict => NormalizationMode::StripPunctuation,
    }
}

fn validate_input(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech recognition model... {pct}%");
    } else {
        eprint!("\rDownloading speech recognition model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_score_subcommand_parses() {
        let cli = parse(&["pronounce", "score", "hello world", "hello word", "--strict"]);
        match cli.command {
            Command::Score {
                expected,
                transcribed,
                strict,
            } => {
                assert_eq!(expected, "hello world");
                assert_eq!(transcribed, "hello word");
                assert!(strict);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_global_thresholds_override_settings() {
        let cli = parse(&[
            "pronounce",
            "evaluate",
            "--accuracy-threshold",
            "60",
            "--limit",
            "5",
        ]);
        let settings = apply_overrides(Settings::default(), &cli);
        assert_eq!(settings.accuracy_threshold, 60.0);
        assert_eq!(settings.perfect_threshold, 99.99);
    }

    #[test]
    fn test_evaluate_flags_default_to_none() {
        let cli = parse(&["pronounce", "evaluate"]);
        match cli.command {
            Command::Evaluate {
                dataset,
                limit,
                workers,
            } => {
                assert!(dataset.is_none());
                assert!(limit.is_none());
                assert!(workers.is_none());
            }
            _ => panic!("expected evaluate command"),
        }
    }

    #[test]
    fn test_config_subcommand_parses_save_flag() {
        let cli = parse(&["pronounce", "config", "--save", "--perfect-threshold", "95"]);
        assert!(matches!(cli.command, Command::Config { save: true }));
        assert_eq!(apply_overrides(Settings::default(), &cli).perfect_threshold, 95.0);
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["pronounce"]).is_err());
    }

    #[test]
    fn test_validate_input_missing_file() {
        let err = validate_input(Path::new("/nonexistent/attempt.wav")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_normalization_mode_mapping() {
        assert_eq!(normalization_mode(Normalization::Basic), NormalizationMode::Basic);
        assert_eq!(
            normalization_mode(Normalization::Strict),
            NormalizationMode::StripPunctuation
        );
    }
}
