//! Audio file I/O for Soundshift
//!
//! WAV input is read with hound; MP3, FLAC, M4A and AAC go through
//! symphonia. Output is either WAV (hound) or FLAC (flacenc), always at the
//! source frame rate, channel count and sample width.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::{Fill, FrameBuf, MemSource};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::engine::buffer::{AudioBuffer, DEFAULT_SAMPLE_WIDTH, MAX_SAMPLE_WIDTH, MIN_SAMPLE_WIDTH};
use crate::error::{Result, SoundshiftError};

/// Widest sample the FLAC encoder accepts, in bits
const FLAC_MAX_BITS: u16 = 24;

// ============================================================================
// Formats
// ============================================================================

/// Input container recognised by its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Mp3,
    Wav,
    Flac,
    M4a,
    Aac,
}

impl InputFormat {
    /// Extensions accepted as input, lowercase
    pub fn supported_extensions() -> &'static [&'static str] {
        &["mp3", "wav", "flac", "m4a", "aac"]
    }

    /// Detect the input format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "mp3" => InputFormat::Mp3,
            "wav" => InputFormat::Wav,
            "flac" => InputFormat::Flac,
            "m4a" => InputFormat::M4a,
            "aac" => InputFormat::Aac,
            _ => return None,
        })
    }
}

/// Output container and codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Flac,
    Wav,
}

impl OutputFormat {
    /// File extension written for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Flac => "flac",
            OutputFormat::Wav => "wav",
        }
    }

    /// Whether the codec makes use of a target bitrate
    pub fn uses_bitrate(&self) -> bool {
        false
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decode an audio file into an [`AudioBuffer`]
///
/// # Arguments
/// * `path` - Path to an MP3, WAV, FLAC, M4A or AAC file
///
/// # Errors
/// * `UnsupportedFormat` - the extension is not a supported input
/// * `Io` - the file cannot be opened
/// * `Decode` - the file is corrupt, has no audio track, or holds no samples
pub fn decode(path: &Path) -> Result<AudioBuffer> {
    let format = InputFormat::from_path(path).ok_or_else(|| SoundshiftError::UnsupportedFormat {
        format: path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<none>".to_string()),
    })?;

    let buffer = match format {
        InputFormat::Wav => decode_wav(path)?,
        _ => decode_with_symphonia(path)?,
    };

    if buffer.is_empty() {
        return Err(SoundshiftError::decode(path, "file contains no samples"));
    }

    debug!(
        "Decoded {}: {} frames, {} ch, {}-bit, {} Hz",
        path.display(),
        buffer.num_frames(),
        buffer.num_channels(),
        buffer.bits_per_sample(),
        buffer.frame_rate()
    );

    Ok(buffer)
}

fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    // Only opening the file is a filesystem failure; anything hound reports
    // after that means the stream itself is bad.
    let file = File::open(path)?;
    let reader = WavReader::new(BufReader::new(file)).map_err(|e| SoundshiftError::decode(path, e))?;
    let spec = reader.spec();

    let (samples, sample_width) = match spec.sample_format {
        SampleFormat::Int => {
            let width = spec.bits_per_sample.div_ceil(8);
            let samples = reader
                .into_samples::<i32>()
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| SoundshiftError::decode(path, e))?;
            (samples, width)
        }
        SampleFormat::Float => {
            // Float WAV is brought into 16-bit integer PCM.
            let samples = reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v * 32767.0).round().clamp(-32768.0, 32767.0) as i32))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| SoundshiftError::decode(path, e))?;
            (samples, DEFAULT_SAMPLE_WIDTH)
        }
    };

    AudioBuffer::new(samples, spec.channels, sample_width, spec.sample_rate)
}

fn decode_with_symphonia(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SoundshiftError::decode(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SoundshiftError::decode(path, "no supported audio track"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| SoundshiftError::decode(path, e))?;

    // Lossy codecs report no bit depth; they come out as 16-bit like a CD.
    let sample_width = params
        .bits_per_sample
        .map(|bits| bits.div_ceil(8) as u16)
        .unwrap_or(DEFAULT_SAMPLE_WIDTH)
        .clamp(MIN_SAMPLE_WIDTH, MAX_SAMPLE_WIDTH);
    let shift = 32 - u32::from(sample_width) * 8;

    let mut channels = params.channels.map(|c| c.count() as u16);
    let mut frame_rate = params.sample_rate;
    let mut samples: Vec<i32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(SoundshiftError::decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(SoundshiftError::decode(path, e)),
        };

        let spec = *decoded.spec();
        channels.get_or_insert(spec.channels.count() as u16);
        frame_rate.get_or_insert(spec.rate);

        let mut packet_samples = SampleBuffer::<i32>::new(decoded.capacity() as u64, spec);
        packet_samples.copy_interleaved_ref(decoded);
        samples.extend(packet_samples.samples().iter().map(|s| s >> shift));
    }

    let channels = channels.ok_or_else(|| SoundshiftError::decode(path, "unknown channel count"))?;
    let frame_rate = frame_rate.ok_or_else(|| SoundshiftError::decode(path, "unknown sample rate"))?;

    AudioBuffer::new(samples, channels, sample_width, frame_rate)
}

// ============================================================================
// Encode
// ============================================================================

/// Encode an [`AudioBuffer`] to a file
///
/// The buffer's frame rate, channel count and sample width are written
/// unchanged. `bitrate` is advisory: lossless codecs ignore it.
///
/// The file is written next to `path` under a temporary name and moved into
/// place once complete, so a failed encode leaves nothing behind.
///
/// # Errors
/// * `Encode` - the target codec cannot store this sample format
/// * `Io` - the file cannot be written
pub fn encode(buffer: &AudioBuffer, path: &Path, format: OutputFormat, bitrate: Option<&str>) -> Result<()> {
    if let Some(bitrate) = bitrate {
        if !format.uses_bitrate() {
            debug!("Ignoring bitrate {} for lossless {} output", bitrate, format);
        }
    }

    let staging = staging_path(path);
    let written = match format {
        OutputFormat::Wav => encode_wav(buffer, &staging, path),
        OutputFormat::Flac => encode_flac(buffer, &staging, path),
    }
    .and_then(|()| fs::rename(&staging, path).map_err(SoundshiftError::from));

    if written.is_err() && staging.exists() {
        if let Err(e) = fs::remove_file(&staging) {
            warn!("Could not remove partial output {}: {}", staging.display(), e);
        }
    }
    written
}

/// Sibling path an output is written to before it is complete
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".part");
    path.with_file_name(name)
}

fn encode_wav(buffer: &AudioBuffer, staging: &Path, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels(),
        sample_rate: buffer.frame_rate(),
        bits_per_sample: buffer.bits_per_sample(),
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(staging, spec).map_err(|e| hound_error(path, e))?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(|e| hound_error(path, e))?;
    }
    writer.finalize().map_err(|e| hound_error(path, e))?;

    Ok(())
}

fn encode_flac(buffer: &AudioBuffer, staging: &Path, path: &Path) -> Result<()> {
    let bits = buffer.bits_per_sample();
    if bits > FLAC_MAX_BITS {
        return Err(SoundshiftError::encode(
            path,
            format!("{}-bit samples cannot be stored as FLAC (max {}-bit)", bits, FLAC_MAX_BITS),
        ));
    }

    let channels = buffer.num_channels() as usize;
    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| flac_error(path, e))?;
    let block_size = config.block_size;

    let source = MemSource::from_samples(
        buffer.samples(),
        channels,
        bits as usize,
        buffer.frame_rate() as usize,
    );
    let stream = flacenc::encode_with_fixed_block_size(&config, source, block_size)
        .map_err(|e| flac_error(path, e))?;

    let mut sink = ByteSink::new();
    stream.write(&mut sink).map_err(|e| flac_error(path, e))?;
    let mut bytes = sink.into_inner();

    // The encoder zero-pads the last block to full size. Swap that frame for
    // one holding only the remaining frames so the decoded length is exact.
    let tail_frames = buffer.num_frames() % block_size;
    if tail_frames > 0 {
        let last = stream
            .frame_count()
            .checked_sub(1)
            .and_then(|n| stream.frame(n).map(|frame| (n, frame.count_bits() / 8)));
        let (frame_number, padded_len) =
            last.ok_or_else(|| SoundshiftError::encode(path, "encoder produced no frames"))?;
        bytes.truncate(bytes.len().saturating_sub(padded_len));

        let tail = encode_flac_tail(buffer, tail_frames, frame_number, &stream)
            .map_err(|reason| SoundshiftError::encode(path, reason))?;
        bytes.extend_from_slice(&tail);
    }

    fs::write(staging, &bytes)?;
    Ok(())
}

/// Encode the final `tail_frames` frames of `buffer` as one short FLAC frame
fn encode_flac_tail(
    buffer: &AudioBuffer,
    tail_frames: usize,
    frame_number: usize,
    stream: &flacenc::component::Stream,
) -> std::result::Result<Vec<u8>, String> {
    let channels = buffer.num_channels() as usize;

    // Predictors need more history than a very short block holds.
    let mut tail_config = flacenc::config::Encoder::default();
    if tail_frames < flacenc::constant::MIN_BLOCK_SIZE {
        tail_config.subframe_coding.use_fixed = false;
        tail_config.subframe_coding.use_lpc = false;
    }
    let tail_config = tail_config.into_verified().map_err(|(_, e)| format!("{:?}", e))?;

    let mut framebuf = FrameBuf::with_size(channels, tail_config.block_size).map_err(|e| format!("{:?}", e))?;
    framebuf.resize(tail_frames);
    let start = (buffer.num_frames() - tail_frames) * channels;
    framebuf
        .fill_interleaved(&buffer.samples()[start..])
        .map_err(|e| format!("{:?}", e))?;

    let frame = flacenc::encode_fixed_size_frame(&tail_config, &framebuf, frame_number, stream.stream_info())
        .map_err(|e| format!("{:?}", e))?;

    let mut sink = ByteSink::new();
    frame.write(&mut sink).map_err(|e| format!("{:?}", e))?;
    Ok(sink.into_inner())
}

/// flacenc errors only implement `Debug`
fn flac_error(path: &Path, err: impl fmt::Debug) -> SoundshiftError {
    SoundshiftError::encode(path, format!("{:?}", err))
}

/// Route hound's filesystem failures to `Io`, format problems to `Encode`
fn hound_error(path: &Path, err: hound::Error) -> SoundshiftError {
    match err {
        hound::Error::IoError(e) => SoundshiftError::Io(e),
        other => SoundshiftError::encode(path, other),
    }
}

// ============================================================================
// Tests
// ============================================================================
