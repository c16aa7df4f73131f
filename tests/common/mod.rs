#![allow(dead_code)]

use hound::{SampleFormat, WavSpec, WavWriter};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use voice_fixtures::audio::wav_format;
use voice_fixtures::convert::Converter;
use voice_fixtures::error::{ProbeError, SynthesisError, TranscodeError};
use voice_fixtures::probe::MediaProber;
use voice_fixtures::transcode::{TargetFormat, Transcoder};
use voice_fixtures::tts::SpeechSynthesizer;

/// Writes the text itself as the "compressed" audio so the transcoder can see what it got.
#[derive(Default)]
pub struct FakeTts {
    pub offline: bool,
}

impl SpeechSynthesizer for FakeTts {
    fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SynthesisError> {
        if self.offline {
            return Err(SynthesisError::Io(io::Error::other("network unreachable")));
        }
        fs::write(dest, format!("mp3:{text}"))?;
        Ok(())
    }
}

/// Produces a short silent WAV. Fails for input whose text equals `fail_on`.
pub struct FakeFfmpeg {
    pub fail_on: Option<&'static str>,
    /// Overrides the requested format, to simulate a misbehaving transcoder.
    pub force: Option<TargetFormat>,
    /// Raised right before failing, like a Ctrl-C that also killed ffmpeg.
    pub interrupt: Option<Arc<AtomicBool>>,
    pub calls: Cell<usize>,
    pub inputs: RefCell<Vec<PathBuf>>,
    /// Whether the output path already existed when each call started.
    pub output_existed: RefCell<Vec<bool>>,
}

impl Default for FakeFfmpeg {
    fn default() -> Self {
        Self {
            fail_on: None,
            force: None,
            interrupt: None,
            calls: Cell::new(0),
            inputs: Default::default(),
            output_existed: Default::default(),
        }
    }
}

impl FakeFfmpeg {
    pub fn failing_on(text: &'static str) -> Self {
        Self {
            fail_on: Some(text),
            ..Self::default()
        }
    }
}

impl Transcoder for FakeFfmpeg {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: TargetFormat,
    ) -> Result<(), TranscodeError> {
        self.calls.set(self.calls.get() + 1);
        self.inputs.borrow_mut().push(input.to_path_buf());
        self.output_existed.borrow_mut().push(output.exists());
        let payload = fs::read_to_string(input).expect("speech file exists during transcode");
        if Some(payload.trim_start_matches("mp3:")) == self.fail_on {
            if let Some(flag) = &self.interrupt {
                flag.store(true, Ordering::SeqCst);
            }
            return Err(failed("Invalid data found when processing input"));
        }

        let format = self.force.unwrap_or(format);
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(output, spec).expect("create wav");
        for _ in 0..(format.sample_rate / 4) * format.channels as u32 {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
        Ok(())
    }
}

#[cfg(unix)]
fn failed(stderr: &str) -> TranscodeError {
    use std::os::unix::process::ExitStatusExt;
    TranscodeError::Failed {
        tool: "ffmpeg".to_string(),
        status: std::process::ExitStatus::from_raw(1 << 8),
        stderr: stderr.to_string(),
    }
}

#[cfg(not(unix))]
fn failed(stderr: &str) -> TranscodeError {
    TranscodeError::Spawn {
        tool: "ffmpeg".to_string(),
        source: io::Error::other(stderr.to_string()),
    }
}

/// Reads the duration from the WAV header, or fails when `broken` is set.
#[derive(Default)]
pub struct FakeProbe {
    pub broken: bool,
}

impl MediaProber for FakeProbe {
    fn duration(&self, path: &Path) -> Result<f64, ProbeError> {
        if self.broken {
            return Err(ProbeError::Unparsable("N/A".to_string()));
        }
        wav_format(path)
            .map(|f| f.duration_seconds)
            .map_err(|e| ProbeError::Unparsable(e.to_string()))
    }
}

pub fn converter<'a>(
    tts: FakeTts,
    ffmpeg: &'a FakeFfmpeg,
    probe: FakeProbe,
) -> Converter<FakeTts, &'a FakeFfmpeg, FakeProbe> {
    Converter::new(tts, ffmpeg, probe, TargetFormat::RECOGNIZER)
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Minimal HTTP/1.1 endpoint standing in for the translate TTS service. Answers every
/// request with `status` and the next body from `bodies`, then closes the connection.
pub struct TtsServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl TtsServer {
    pub fn start(status: u16, bodies: Vec<&'static [u8]>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let url = format!("http://{}/translate_tts", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for (i, stream) in listener.incoming().enumerate() {
                let Ok(mut stream) = stream else { continue };
                let line = read_request_line(&mut stream);
                seen.lock().unwrap().push(line);
                let body = bodies.get(i % bodies.len().max(1)).copied().unwrap_or(&[]);
                let reason = if status < 400 { "OK" } else { "Internal Server Error" };
                let head = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        Self { url, requests }
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request_line(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
