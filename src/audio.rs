use hound::WavReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
}

/// Reads the WAV header of `path`.
pub fn wav_format(path: &Path) -> Result<WavFormat, hound::Error> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.duration();
    Ok(WavFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_seconds: frames as f64 / spec.sample_rate as f64,
    })
}
