use crate::error::ProbeError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

pub trait MediaProber {
    /// Duration of the media file in seconds.
    fn duration(&self, path: &Path) -> Result<f64, ProbeError>;
}

pub struct Ffprobe {
    program: PathBuf,
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProber for Ffprobe {
    fn duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let tool = self.program.display().to_string();
        let out = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(ProbeError::Failed {
                tool,
                status: out.status,
            });
        }
        let stdout = String::from_utf8_lossy(&out.stdout);
        debug!("ffprobe duration for {}: {}", path.display(), stdout.trim());
        parse_duration(&stdout)
    }
}

pub fn parse_duration(raw: &str) -> Result<f64, ProbeError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(ProbeError::Unparsable(trimmed.to_string())),
    }
}
