use crate::error::TranscodeError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{error, info};

/// Sample layout the speech recognizer on the device expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl TargetFormat {
    pub const RECOGNIZER: TargetFormat = TargetFormat {
        sample_rate: 16_000,
        channels: 1,
    };
}

pub trait Transcoder {
    /// Re-encode `input` into `output` using `format`, replacing any existing `output`.
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: TargetFormat,
    ) -> Result<(), TranscodeError>;
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: TargetFormat,
    ) -> Result<(), TranscodeError> {
        (**self).transcode(input, output, format)
    }
}

pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn tool(&self) -> String {
        self.program.display().to_string()
    }
}

pub fn ffmpeg_args(input: &Path, output: &Path, format: TargetFormat) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.into(),
        "-ar".into(),
        format.sample_rate.to_string().into(),
        "-ac".into(),
        format.channels.to_string().into(),
        "-y".into(),
        output.into(),
    ]
}

impl Transcoder for Ffmpeg {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: TargetFormat,
    ) -> Result<(), TranscodeError> {
        info!(
            "Transcoding {} -> {} ({} Hz, {} ch)",
            input.display(),
            output.display(),
            format.sample_rate,
            format.channels
        );
        let result = Command::new(&self.program)
            .args(ffmpeg_args(input, output, format))
            .stdin(Stdio::null())
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TranscodeError::NotFound { tool: self.tool() });
            }
            Err(source) => {
                return Err(TranscodeError::Spawn {
                    tool: self.tool(),
                    source,
                });
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            error!("ffmpeg failed for {}: {}", input.display(), stderr);
            return Err(TranscodeError::Failed {
                tool: self.tool(),
                status: out.status,
                stderr,
            });
        }
        Ok(())
    }
}
