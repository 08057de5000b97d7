//! The podcast pipeline: prompt, script, audio

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono_tz::Tz;
use tracing::{info, instrument};

use crate::config::PodcastConfig;
use crate::error::PodcastError;
use crate::models::Coordinate;
use crate::narration::{NarrationGenerator, OpenAiChatClient};
use crate::prompt::{PromptAssembler, PromptDocument};
use crate::providers::{self, Providers};
use crate::speech::{AudioEncoder, GoogleTranslateSpeech};

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct PodcastEpisode {
    pub prompt: PromptDocument,
    pub script: String,
    /// Base64-encoded MP3
    pub audio: String,
}

pub struct PodcastService {
    assembler: PromptAssembler,
    narrator: NarrationGenerator,
    encoder: AudioEncoder,
    timezone: Tz,
}

impl PodcastService {
    pub fn new(
        assembler: PromptAssembler,
        narrator: NarrationGenerator,
        encoder: AudioEncoder,
        timezone: Tz,
    ) -> Self {
        Self {
            assembler,
            narrator,
            encoder,
            timezone,
        }
    }

    /// Wire the HTTP-backed adapters and clients from configuration
    pub fn from_config(config: &PodcastConfig) -> Result<Self> {
        let providers = Providers::from_config(config)?;
        let narration_client = providers::http_client(config.narration_timeout())?;
        let speech_client = providers::http_client(config.provider_timeout())?;

        Ok(Self::new(
            PromptAssembler::new(providers),
            NarrationGenerator::new(
                Arc::new(OpenAiChatClient::new(narration_client, &config.narration)),
                &config.narration,
            ),
            AudioEncoder::new(
                Arc::new(GoogleTranslateSpeech::new(speech_client, &config.speech)),
                &config.speech,
            ),
            config.timezone()?,
        ))
    }

    /// Run the whole pipeline for one coordinate
    #[instrument(skip(self), fields(coordinate = %coordinate.format_coordinates()))]
    pub async fn generate(&self, coordinate: &Coordinate) -> Result<PodcastEpisode, PodcastError> {
        coordinate.validate()?;
        let started = Instant::now();

        let prompt = self.assembler.build_prompt(coordinate, self.timezone).await;
        let script = self.narrator.generate(&prompt).await?;
        let audio = self.encoder.synthesize_and_encode(&script).await?;

        info!(
            "Generated podcast in {:.3}s",
            started.elapsed().as_secs_f64()
        );

        Ok(PodcastEpisode {
            prompt,
            script,
            audio,
        })
    }
}
