use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use stetho_domain::{AnalysisError, Waveform};

use crate::dsp::downmix;

/// Decoded audio with interleaved `f32` samples in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Averages the channels and validates the result as a [`Waveform`].
    pub fn to_waveform(&self) -> Result<Waveform, AnalysisError> {
        let mono = downmix(&self.samples, usize::from(self.channels))?;
        Waveform::new(mono, self.sample_rate)
    }
}

pub struct AudioDecoder;

impl AudioDecoder {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
        let path_ref = path.as_ref();
        let file =
            File::open(path_ref).with_context(|| format!("open audio file {:?}", path_ref))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }
        Self::decode(mss, &hint).with_context(|| format!("decode audio file {:?}", path_ref))
    }

    pub fn decode(mss: MediaSourceStream, hint: &Hint) -> Result<DecodedAudio> {
        let probed = symphonia::default::get_probe().format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| anyhow::anyhow!("track does not declare a sample rate"))?;
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }
            match decoder.decode(&packet) {
                Ok(buffer) => {
                    let spec = *buffer.spec();
                    channels = spec.channels.count() as u16;
                    let mut out = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
                    out.copy_interleaved_ref(buffer);
                    samples.extend_from_slice(out.samples());
                }
                Err(SymphError::DecodeError(reason)) => {
                    warn!(reason, "skipping undecodable packet");
                }
                Err(err) => return Err(err.into()),
            }
        }

        debug!(sample_rate, channels, samples = samples.len(), "decoded audio");
        Ok(DecodedAudio {
            sample_rate,
            channels,
            samples,
        })
    }
}
