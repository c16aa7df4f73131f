use crate::error::ConvertError;
use crate::probe::MediaProber;
use crate::transcode::{TargetFormat, Transcoder};
use crate::tts::SpeechSynthesizer;
use std::fs;
use std::path::Path;
use tempfile::{Builder, TempPath};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub size_bytes: u64,
    /// `None` when probing failed.
    pub duration_seconds: Option<f64>,
}

/// Renders one piece of text into a WAV file in the target format.
///
/// The intermediate MP3 and the staged WAV live next to the output as scoped
/// temporaries. Both are gone once `convert` returns, whatever the outcome, and the
/// output path is only replaced after a successful transcode.
pub struct Converter<S, T, P> {
    synthesizer: S,
    transcoder: T,
    prober: P,
    format: TargetFormat,
}

impl<S, T, P> Converter<S, T, P>
where
    S: SpeechSynthesizer,
    T: Transcoder,
    P: MediaProber,
{
    pub fn new(synthesizer: S, transcoder: T, prober: P, format: TargetFormat) -> Self {
        Self {
            synthesizer,
            transcoder,
            prober,
            format,
        }
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    pub fn convert(&self, text: &str, output: &Path) -> Result<AudioInfo, ConvertError> {
        if text.trim().is_empty() {
            return Err(ConvertError::EmptyText);
        }
        let is_wav = output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if !is_wav {
            return Err(ConvertError::InvalidOutputPath(output.to_path_buf()));
        }

        let dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let speech = scratch_file(dir, &stem, SPEECH_TAG, SPEECH_SUFFIX)?;
        self.synthesizer.synthesize(text, &speech)?;
        debug!("Synthesized speech into {}", speech.display());

        let staged = scratch_file(dir, &stem, STAGED_TAG, STAGED_SUFFIX)?;
        self.transcoder.transcode(&speech, &staged, self.format)?;

        staged.persist(output).map_err(|e| ConvertError::Io {
            path: output.to_path_buf(),
            source: e.error,
        })?;
        drop(speech);

        let size_bytes = fs::metadata(output)
            .map_err(|source| ConvertError::Io {
                path: output.to_path_buf(),
                source,
            })?
            .len();
        let duration_seconds = match self.prober.duration(output) {
            Ok(secs) => Some(secs),
            Err(e) => {
                debug!("Duration unknown for {}: {}", output.display(), e);
                None
            }
        };
        info!(
            "Wrote {} ({} bytes, duration {:?})",
            output.display(),
            size_bytes,
            duration_seconds
        );
        Ok(AudioInfo {
            size_bytes,
            duration_seconds,
        })
    }
}

const SPEECH_TAG: &str = "_temp";
const SPEECH_SUFFIX: &str = ".mp3";
const STAGED_TAG: &str = "_staged";
const STAGED_SUFFIX: &str = ".wav";

/// Matches the names `scratch_file` hands out: `.{stem}{tag}.{random}{suffix}`.
pub fn is_scratch_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('.') else {
        return false;
    };
    [(SPEECH_TAG, SPEECH_SUFFIX), (STAGED_TAG, STAGED_SUFFIX)]
        .iter()
        .any(|(tag, suffix)| rest.ends_with(suffix) && rest.contains(&format!("{tag}.")))
}

/// Deletes scratch files a killed run left in `dir`. Returns how many were removed.
pub fn remove_stale_scratch(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_scratch_name) || !entry.file_type()?.is_file() {
            continue;
        }
        debug!("Removing stale scratch file {}", entry.path().display());
        fs::remove_file(entry.path())?;
        removed += 1;
    }
    Ok(removed)
}

fn scratch_file(dir: &Path, stem: &str, tag: &str, suffix: &str) -> Result<TempPath, ConvertError> {
    Builder::new()
        .prefix(&format!(".{stem}{tag}."))
        .suffix(suffix)
        .tempfile_in(dir)
        .map(|f| f.into_temp_path())
        .map_err(|source| ConvertError::Io {
            path: dir.to_path_buf(),
            source,
        })
}
