use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("cannot synthesize empty text")]
    EmptyText,

    #[error("speech service request failed")]
    Http(#[from] reqwest::Error),

    #[error("failed to write synthesized audio")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The transcoder binary is not installed or not on PATH.
    #[error("`{tool}` was not found")]
    NotFound { tool: String },

    #[error("failed to run `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Never shown to the user; a failed probe only drops the duration from the report.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` exited with {status}")]
    Failed { tool: String, status: ExitStatus },

    #[error("unparsable duration {0:?}")]
    Unparsable(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("output path {} must end in .wav", .0.display())]
    InvalidOutputPath(PathBuf),

    #[error("speech synthesis failed")]
    Synthesis(#[from] SynthesisError),

    #[error("error converting audio")]
    Transcode(#[from] TranscodeError),

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, ConvertError::Transcode(TranscodeError::NotFound { .. }))
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to prepare output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to generate {filename}")]
    Item {
        filename: String,
        #[source]
        source: ConvertError,
    },

    #[error(
        "{} is {found_rate} Hz / {found_channels} ch, expected {expected_rate} Hz / {expected_channels} ch",
        path.display()
    )]
    FormatMismatch {
        path: PathBuf,
        expected_rate: u32,
        expected_channels: u16,
        found_rate: u32,
        found_channels: u16,
    },

    #[error("failed to read {}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("failed to write manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("interrupted")]
    Interrupted,

    #[error("failed to write progress report")]
    Report(#[from] io::Error),
}

impl BatchError {
    /// True when a required external tool is absent, as opposed to a tool that ran and failed.
    pub fn is_missing_dependency(&self) -> bool {
        match self {
            BatchError::Item { source, .. } => source.is_missing_dependency(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_mentions_each_cause_once() {
        let err = BatchError::Item {
            filename: "a.wav".to_string(),
            source: ConvertError::Transcode(TranscodeError::NotFound {
                tool: "./nope".to_string(),
            }),
        };
        let rendered = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(
            rendered,
            "failed to generate a.wav: error converting audio: `./nope` was not found"
        );
    }

    #[test]
    fn io_cause_is_not_repeated_in_the_message() {
        let err = ConvertError::Io {
            path: PathBuf::from("out/a.wav"),
            source: io::Error::other("disk full"),
        };
        assert_eq!(err.to_string(), "i/o error on out/a.wav");
        let rendered = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(rendered.matches("disk full").count(), 1);
    }
}
