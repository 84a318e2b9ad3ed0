use byteorder::{ByteOrder, LittleEndian};
use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use thiserror::Error;

use crate::codec::{DecodeError, bytes_from_base64};

/// Sample rate of the speech service's raw PCM output
pub const SPEECH_SAMPLE_RATE: u32 = 24000;
/// The speech service always returns mono audio
pub const SPEECH_CHANNELS: u16 = 1;

#[derive(Error, Debug)]
pub enum AudioDecodeError {
    #[error("audio payload is empty")]
    Empty,
    #[error("audio payload is not valid base64: {0}")]
    Base64(#[from] DecodeError),
    #[error("audio payload has an odd byte length ({0}), expected 16-bit samples")]
    OddLength(usize),
}

/// Mono PCM normalized to [-1.0, 1.0), ready for playback as-is
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    /// Render as a 16-bit PCM WAV file
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                let scaled = (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32);
                writer.write_sample(scaled as i16)?;
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}

/// Decode a base64 payload of 16-bit signed little-endian mono PCM at 24kHz
///
/// There is no format detection: the speech service contract fixes the
/// encoding, rate and channel count.
pub fn decode_pcm16(audio_data: &str) -> Result<DecodedAudio, AudioDecodeError> {
    if audio_data.trim().is_empty() {
        return Err(AudioDecodeError::Empty);
    }

    let bytes = bytes_from_base64(audio_data)?;
    if bytes.is_empty() {
        return Err(AudioDecodeError::Empty);
    }
    if bytes.len() % 2 != 0 {
        return Err(AudioDecodeError::OddLength(bytes.len()));
    }

    let mut pcm = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(&bytes, &mut pcm);

    let samples = pcm.iter().map(|&s| s as f32 / 32768.0).collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: SPEECH_SAMPLE_RATE,
        channels: SPEECH_CHANNELS,
    })
}
