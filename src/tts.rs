use crate::error::SynthesisError;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Longest piece of text the translate endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([^.!?]+[.!?]+)|([^.!?]+$)").expect("sentence pattern"));

/// Turns text into compressed speech audio on disk.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SynthesisError>;
}

/// Google Translate's TTS endpoint. Writes MP3.
pub struct GoogleTts {
    client: Client,
    url: String,
    lang: String,
    slow: bool,
}

impl GoogleTts {
    pub fn new(url: &str, lang: &str, slow: bool) -> Result<Self, SynthesisError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            lang: lang.to_string(),
            slow,
        })
    }

    fn query(&self, chunk: &str, idx: usize, total: usize) -> Vec<(&'static str, String)> {
        let speed = if self.slow { "0.3" } else { "1" };
        vec![
            ("ie", "UTF-8".to_string()),
            ("client", "tw-ob".to_string()),
            ("tl", self.lang.clone()),
            ("q", chunk.to_string()),
            ("ttsspeed", speed.to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
        ]
    }
}

impl SpeechSynthesizer for GoogleTts {
    fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SynthesisError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        info!(
            "Requesting speech for {} ({} chunk(s), lang {})",
            dest.display(),
            chunks.len(),
            self.lang
        );

        let mut out = File::create(dest)?;
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("TTS chunk {}/{}: {}", idx + 1, chunks.len(), chunk);
            let bytes = self
                .client
                .get(&self.url)
                .query(&self.query(chunk, idx, chunks.len()))
                .header(USER_AGENT, BROWSER_AGENT)
                .send()?
                .error_for_status()?
                .bytes()?;
            if bytes.is_empty() {
                warn!("Speech service returned no audio for chunk {}", idx);
            }
            out.write_all(&bytes)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Splits text into pieces of at most `max_chars` characters, preferring sentence
/// boundaries, then whitespace, and only cutting inside a word when it alone is too long.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut sentences: Vec<&str> = SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        let whole = text.trim();
        if whole.is_empty() {
            return Vec::new();
        }
        sentences.push(whole);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for sentence in sentences {
        if sentence.chars().count() <= max_chars {
            pack(&mut chunks, &mut current, sentence, max_chars);
            continue;
        }
        for word in sentence.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                let piece: String = piece.iter().collect();
                pack(&mut chunks, &mut current, &piece, max_chars);
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn pack(chunks: &mut Vec<String>, current: &mut String, piece: &str, max_chars: usize) {
    if current.is_empty() {
        current.push_str(piece);
    } else if current.chars().count() + 1 + piece.chars().count() <= max_chars {
        current.push(' ');
        current.push_str(piece);
    } else {
        chunks.push(std::mem::take(current));
        current.push_str(piece);
    }
}
