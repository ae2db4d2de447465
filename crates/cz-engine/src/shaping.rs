//! Sample-stream shaping: soft limiting, silence padding, delay and mixing.

/// Soft-clip one sample against `threshold`.
///
/// Samples at or below the threshold pass through untouched; louder ones
/// are bent through `threshold * tanh(x / threshold)`, which never reaches
/// the threshold. NaN becomes silence.
pub fn soft_limit(sample: f32, threshold: f32) -> f32 {
    if sample.is_nan() {
        return 0.0;
    }
    if sample.abs() > threshold {
        threshold * libm::tanhf(sample / threshold)
    } else {
        sample
    }
}

/// Soft-limit a whole buffer in place.
pub fn limit(buffer: &mut [f32], threshold: f32) {
    for s in buffer.iter_mut() {
        *s = soft_limit(*s, threshold);
    }
}

/// Extend `buffer` with trailing silence up to `len` samples, or cut it
/// down to `len` if it is longer.
pub fn pad_to(buffer: &mut Vec<f32>, len: usize) {
    buffer.resize(len, 0.0);
}

/// Copy of `buffer` preceded by `offset` samples of silence.
pub fn delay(buffer: &[f32], offset: usize) -> Vec<f32> {
    let mut out = vec![0.0; offset + buffer.len()];
    out[offset..].copy_from_slice(buffer);
    out
}

/// Sum `source` into `dest` starting at `offset`, growing `dest` as needed.
pub fn mix_into(dest: &mut Vec<f32>, source: &[f32], offset: usize) {
    let end = offset + source.len();
    if dest.len() < end {
        dest.resize(end, 0.0);
    }
    for (d, s) in dest[offset..end].iter_mut().zip(source) {
        *d += *s;
    }
}

/// Sum equal-length layers into one buffer of `len` samples.
pub fn mix_layers(layers: &[Vec<f32>], len: usize) -> Vec<f32> {
    let mut out = vec![0.0; len];
    for layer in layers {
        for (o, s) in out.iter_mut().zip(layer) {
            *o += *s;
        }
    }
    out
}
