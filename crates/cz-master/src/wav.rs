//! WAV encoding for 16-bit mono PCM.

use std::io::{self, Write};

const CHANNELS: u16 = 1;
const BYTES_PER_SAMPLE: u16 = 2;
/// RIFF payload ahead of the sample data: "WAVE", the fmt chunk and the data chunk header.
const HEADER_PAYLOAD: u32 = 4 + (8 + FMT_CHUNK_LEN) + 8;
const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Write `samples` as a 16-bit mono PCM WAV stream at `sample_rate`.
pub fn write_wav(w: &mut impl Write, samples: &[f32], sample_rate: u32) -> io::Result<()> {
    let data_len = samples.len() as u32 * BYTES_PER_SAMPLE as u32;
    write_riff_header(w, data_len)?;
    write_fmt_chunk(w, sample_rate)?;
    write_data_chunk(w, samples, data_len)
}

/// Encode a whole buffer into an in-memory WAV file.
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44 + samples.len() * BYTES_PER_SAMPLE as usize);
    write_wav(&mut buf, samples, sample_rate).expect("Vec<u8> write cannot fail");
    buf
}

/// Full-scale 16-bit value for a float sample; out-of-range input clips.
pub fn to_pcm16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// "RIFF" tag, the size of everything after it, then the "WAVE" form type.
fn write_riff_header(w: &mut impl Write, data_len: u32) -> io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(HEADER_PAYLOAD + data_len).to_le_bytes())?;
    w.write_all(b"WAVE")
}

/// Format chunk for uncompressed mono 16-bit samples.
fn write_fmt_chunk(w: &mut impl Write, sample_rate: u32) -> io::Result<()> {
    let block_align = CHANNELS * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate * block_align as u32;
    w.write_all(b"fmt ")?;
    w.write_all(&FMT_CHUNK_LEN.to_le_bytes())?;
    for field in [FORMAT_PCM, CHANNELS] {
        w.write_all(&field.to_le_bytes())?;
    }
    for field in [sample_rate, byte_rate] {
        w.write_all(&field.to_le_bytes())?;
    }
    for field in [block_align, BYTES_PER_SAMPLE * 8] {
        w.write_all(&field.to_le_bytes())?;
    }
    Ok(())
}

/// "data" chunk: length, then every sample as little-endian PCM16.
fn write_data_chunk(w: &mut impl Write, samples: &[f32], data_len: u32) -> io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_len.to_le_bytes())?;
    for &sample in samples {
        w.write_all(&to_pcm16(sample).to_le_bytes())?;
    }
    Ok(())
}
