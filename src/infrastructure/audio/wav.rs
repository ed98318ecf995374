//! WAV merging by decode and re-encode.
//!
//! Concatenating RIFF files byte for byte leaves the first header's data size
//! in place, so players stop after the first chunk. Samples are decoded and
//! written out again under a single header instead.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

/// Concatenate the audio of `buffers`, in order, into one WAV file
pub fn merge_wav(buffers: &[Vec<u8>]) -> Result<Vec<u8>, String> {
    let mut spec: Option<WavSpec> = None;
    let mut samples: Vec<i32> = Vec::new();

    for (index, buffer) in buffers.iter().enumerate() {
        let reader = WavReader::new(Cursor::new(buffer.as_slice()))
            .map_err(|e| format!("failed to parse WAV chunk {}: {}", index, e))?;
        let chunk_spec = reader.spec();

        if chunk_spec.sample_format != SampleFormat::Int {
            return Err(format!("WAV chunk {} is not integer PCM", index));
        }
        match spec {
            None => spec = Some(chunk_spec),
            Some(expected) if expected != chunk_spec => {
                return Err(format!(
                    "WAV chunk {} has format {:?}, expected {:?}",
                    index, chunk_spec, expected
                ));
            }
            Some(_) => {}
        }

        for sample in reader.into_samples::<i32>() {
            samples.push(sample.map_err(|e| format!("failed to read WAV chunk {}: {}", index, e))?);
        }
    }

    let spec = spec.ok_or_else(|| "no audio to merge".to_string())?;
    tracing::debug!(
        chunks = buffers.len(),
        samples = samples.len(),
        sample_rate = spec.sample_rate,
        "Merging WAV chunks"
    );
    write_samples(spec, samples.into_iter())
}

/// Encode 16-bit samples as a WAV file
pub fn encode_wav(spec: WavSpec, samples: &[i16]) -> Result<Vec<u8>, String> {
    write_samples(spec, samples.iter().map(|s| *s as i32))
}

fn write_samples(spec: WavSpec, samples: impl Iterator<Item = i32>) -> Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| format!("failed to write WAV: {}", e))?;
        for sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| format!("failed to write WAV sample: {}", e))?;
        }
        writer
            .finalize()
            .map_err(|e| format!("failed to finalize WAV: {}", e))?;
    }
    Ok(cursor.into_inner())
}
