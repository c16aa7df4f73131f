use crate::audio::wav_format;
use crate::catalog::CommandSpec;
use crate::convert::{Converter, remove_stale_scratch};
use crate::error::BatchError;
use crate::probe::MediaProber;
use crate::transcode::{TargetFormat, Transcoder};
use crate::tts::SpeechSynthesizer;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

const RULE: &str = "============================================================";

pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct ProducedFile {
    pub filename: String,
    pub description: String,
    pub text: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub files: Vec<ProducedFile>,
}

pub fn print_banner(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "VoiceBell Test Audio Generator")?;
    writeln!(out, "{RULE}")?;
    writeln!(out)
}

/// Converts every catalog entry in order. The first failing entry aborts the run;
/// files already written for earlier entries stay on disk.
///
/// `stop` is polled before each entry. Once it is set the run ends with
/// [`BatchError::Interrupted`], after the current entry's scratch files are dropped.
pub fn run_all<S, T, P>(
    converter: &Converter<S, T, P>,
    catalog: &[CommandSpec],
    output_dir: &Path,
    stop: &AtomicBool,
    out: &mut impl Write,
) -> Result<BatchReport, BatchError>
where
    S: SpeechSynthesizer,
    T: Transcoder,
    P: MediaProber,
{
    fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let swept = remove_stale_scratch(output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    if swept > 0 {
        warn!("Removed {} leftover scratch file(s) from an earlier run", swept);
    }
    writeln!(out, "Output directory: {}/", output_dir.display())?;
    writeln!(out)?;
    info!("Generating {} fixtures into {}", catalog.len(), output_dir.display());

    let mut files = Vec::with_capacity(catalog.len());
    for (i, cmd) in catalog.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            return Err(BatchError::Interrupted);
        }
        let path = output_dir.join(cmd.filename);
        writeln!(out, "[{}/{}] {}", i + 1, catalog.len(), cmd.description)?;
        writeln!(out, "Generating: {}", path.display())?;
        writeln!(out, "  Text: \"{}\"", cmd.text)?;

        let audio = match converter.convert(cmd.text, &path) {
            Ok(audio) => audio,
            // A Ctrl-C also reaches the child processes, so a failure here is usually the interrupt.
            Err(_) if stop.load(Ordering::SeqCst) => return Err(BatchError::Interrupted),
            Err(source) => {
                let detail = chain(&source);
                error!("Failed to generate {}: {}", cmd.filename, detail);
                writeln!(out, "  ✗ {detail}")?;
                return Err(BatchError::Item {
                    filename: cmd.filename.to_string(),
                    source,
                });
            }
        };

        let size_kb = kilobytes(audio.size_bytes);
        match audio.duration_seconds {
            Some(secs) => writeln!(out, "  ✓ Created: {size_kb:.1} KB, {secs:.1}s")?,
            None => writeln!(out, "  ✓ Created: {size_kb:.1} KB")?,
        }
        writeln!(out)?;

        files.push(ProducedFile {
            filename: cmd.filename.to_string(),
            description: cmd.description.to_string(),
            text: cmd.text.to_string(),
            path,
            size_bytes: audio.size_bytes,
            duration_seconds: audio.duration_seconds,
        });
    }

    Ok(BatchReport {
        output_dir: output_dir.to_path_buf(),
        files,
    })
}

/// Checks each produced file's WAV header against `format`.
pub fn verify_outputs(report: &BatchReport, format: TargetFormat) -> Result<(), BatchError> {
    for file in &report.files {
        let found = wav_format(&file.path).map_err(|source| BatchError::Inspect {
            path: file.path.clone(),
            source,
        })?;
        if found.sample_rate != format.sample_rate || found.channels != format.channels {
            return Err(BatchError::FormatMismatch {
                path: file.path.clone(),
                expected_rate: format.sample_rate,
                expected_channels: format.channels,
                found_rate: found.sample_rate,
                found_channels: found.channels,
            });
        }
    }
    info!("Verified {} files", report.files.len());
    Ok(())
}

pub fn write_manifest(report: &BatchReport) -> Result<PathBuf, BatchError> {
    let path = report.output_dir.join(MANIFEST_NAME);
    let data = serde_json::to_string_pretty(report).map_err(|e| BatchError::Manifest {
        path: path.clone(),
        source: e.into(),
    })?;
    fs::write(&path, data).map_err(|source| BatchError::Manifest {
        path: path.clone(),
        source,
    })?;
    info!("Manifest written to {}", path.display());
    Ok(path)
}

pub fn print_summary(report: &BatchReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "✓ All test audio files generated successfully!")?;
    writeln!(out)?;
    writeln!(out, "Files created:")?;
    for file in &report.files {
        writeln!(
            out,
            "  - {} ({:.1} KB)",
            file.filename,
            kilobytes(file.size_bytes)
        )?;
        writeln!(out, "    → {}", file.description)?;
    }
    writeln!(out)?;

    let dir = report.output_dir.display();
    let sample = report
        .files
        .first()
        .map(|f| f.filename.as_str())
        .unwrap_or("<file>.wav");
    writeln!(out, "{RULE}")?;
    writeln!(out, "How to use these files:")?;
    writeln!(out)?;
    writeln!(out, "1. Transfer to emulator:")?;
    writeln!(out, "   adb push {dir}/*.wav /sdcard/Download/")?;
    writeln!(out)?;
    writeln!(out, "2. Play through virtual microphone:")?;
    writeln!(out, "   adb shell am start -a android.intent.action.VIEW \\")?;
    writeln!(out, "     -d file:///sdcard/Download/{sample}")?;
    writeln!(out)?;
    writeln!(out, "3. Or use: ffplay, VLC, or any audio player that routes")?;
    writeln!(out, "   to the emulator's virtual microphone input")?;
    writeln!(out, "{RULE}")
}

/// Joins an error and its sources into one `a: b: c` line.
fn chain(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        next = cause.source();
    }
    line
}

fn kilobytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}
