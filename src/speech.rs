//! Text-to-speech and transport encoding
//!
//! The script is spoken through a [`SpeechSynthesizer`] and the resulting MP3
//! bytes are base64-encoded so they fit into a JSON string field.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::SpeechConfig;
use crate::error::PodcastError;

/// Longest text the translate TTS endpoint accepts per request
pub const MAX_CHUNK_CHARS: usize = 100;

/// Converts text in a language to audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, PodcastError>;
}

/// Google Translate TTS client producing MP3 audio
pub struct GoogleTranslateSpeech {
    client: Client,
    base_url: String,
}

impl GoogleTranslateSpeech {
    pub fn new(client: Client, config: &SpeechConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, PodcastError> {
        let response = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8".to_string()),
                ("client", "tw-ob".to_string()),
                ("tl", language.to_string()),
                ("q", chunk.to_string()),
                ("total", total.to_string()),
                ("idx", index.to_string()),
                ("textlen", chunk.chars().count().to_string()),
            ])
            .send()
            .await
            .map_err(|e| PodcastError::synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PodcastError::synthesis(format!(
                "chunk {}/{} returned {status}",
                index + 1,
                total
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PodcastError::synthesis(format!("failed to read audio: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateSpeech {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, PodcastError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(PodcastError::synthesis("nothing to speak"));
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        // MP3 frames are self-delimiting, so chunks concatenate into one stream
        for (index, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, index, total).await?);
        }

        debug!("Synthesized {} chunks into {} bytes", total, audio.len());
        Ok(audio)
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Words are never split unless a single word is longer than `max_chars`.
/// A chunk is closed early at sentence punctuation once it is half full.
#[must_use]
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        for piece in hard_split(word, max_chars) {
            let piece_len = piece.chars().count();
            let separator = usize::from(current_len > 0);

            if current_len + separator + piece_len > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(piece);
            current_len += piece_len;

            if ends_sentence(piece) && current_len * 2 >= max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with(['.', '!', '?', ';', ':'])
}

/// Cut an overlong word at character boundaries
fn hard_split(word: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in word.char_indices() {
        if count == max_chars {
            pieces.push(&word[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < word.len() {
        pieces.push(&word[start..]);
    }
    pieces
}

/// Base64 (standard alphabet, padded) for the JSON response
#[must_use]
pub fn encode_audio(audio: &[u8]) -> String {
    STANDARD.encode(audio)
}

/// Speaks a script and encodes the audio for transport
pub struct AudioEncoder {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
}

impl AudioEncoder {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: &SpeechConfig) -> Self {
        Self {
            synthesizer,
            language: config.language.clone(),
        }
    }

    #[instrument(skip(self, script), fields(language = %self.language))]
    pub async fn synthesize_and_encode(&self, script: &str) -> Result<String, PodcastError> {
        let audio = self.synthesizer.synthesize(script, &self.language).await?;
        if audio.is_empty() {
            return Err(PodcastError::synthesis("synthesizer returned no audio"));
        }
        info!("Encoded {} bytes of audio", audio.len());
        Ok(encode_audio(&audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_split_text_respects_limit() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(12);
        let chunks = split_text(&text, MAX_CHUNK_CHARS);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(
            chunks.join(" ").split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_split_text_prefers_sentence_ends() {
        let chunks = split_text("First sentence here. Second one follows!", 30);
        assert_eq!(chunks, vec!["First sentence here.", "Second one follows!"]);
    }

    #[test]
    fn test_split_text_cuts_long_words() {
        let word = "é".repeat(25);
        let chunks = split_text(&word, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].chars().count(), 5);
    }

    #[test]
    fn test_split_text_empty() {
        assert!(split_text("   \n ", MAX_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn test_encode_audio() {
        assert_eq!(encode_audio(b"ID3\x03"), "SUQzAw==");
        assert_eq!(encode_audio(&[]), "");
    }

    struct FixedSynthesizer(Vec<u8>);

    #[async_trait]
    impl SpeechSynthesizer for FixedSynthesizer {
        async fn synthesize(&self, _text: &str, language: &str) -> Result<Vec<u8>, PodcastError> {
            assert_eq!(language, "en");
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_audio_encoder() {
        let encoder = AudioEncoder::new(
            Arc::new(FixedSynthesizer(b"mp3-bytes".to_vec())),
            &SpeechConfig::default(),
        );
        let encoded = encoder.synthesize_and_encode("hello goodbye!").await.unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"mp3-bytes");

        let silent = AudioEncoder::new(
            Arc::new(FixedSynthesizer(Vec::new())),
            &SpeechConfig::default(),
        );
        assert!(silent.synthesize_and_encode("hello").await.is_err());
    }

    fn speech_for(server: &MockServer) -> GoogleTranslateSpeech {
        let config = SpeechConfig {
            base_url: server.uri(),
            language: "en".to_string(),
        };
        let http = crate::providers::http_client(Duration::from_secs(2)).unwrap();
        GoogleTranslateSpeech::new(http, &config)
    }

    #[tokio::test]
    async fn test_google_speech_concatenates_chunks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "0"))
            .and(query_param("tl", "en"))
            .and(query_param("client", "tw-ob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BBB".to_vec()))
            .mount(&mock_server)
            .await;

        let speech = speech_for(&mock_server);
        let text = format!("{} {}", "a".repeat(90), "b".repeat(90));
        let audio = speech.synthesize(&text, "en").await.unwrap();

        assert_eq!(audio, b"AAABBB");
    }

    #[tokio::test]
    async fn test_google_speech_fails_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let speech = speech_for(&mock_server);
        let err = speech.synthesize("hello", "en").await.unwrap_err();
        assert!(matches!(err, PodcastError::Synthesis { .. }));
    }

    #[tokio::test]
    async fn test_google_speech_rejects_empty_text() {
        let mock_server = MockServer::start().await;
        let speech = speech_for(&mock_server);
        assert!(speech.synthesize("  ", "en").await.is_err());
    }
}
