//! Utilities for native pixel data buffers:
//! planar configuration transposes,
//! byte order normalization,
//! and conversion between sample values and their byte representation.
//!
//! Native pixel data is handled as little endian bytes
//! with samples of one or two bytes each.
use byteordered::Endianness;

/// Planar configuration value of color-by-pixel (interleaved) data.
pub const COLOR_BY_PIXEL: u16 = 0;
/// Planar configuration value of color-by-plane data.
pub const COLOR_BY_PLANE: u16 = 1;

/// Convert color-by-pixel data into color-by-plane data.
///
/// `data` holds pixels of `components` samples
/// of `bytes_per_sample` bytes each.
/// Trailing bytes which do not form a complete pixel are copied as is.
pub fn to_color_by_plane(data: &[u8], components: usize, bytes_per_sample: usize) -> Vec<u8> {
    let pixel_size = components * bytes_per_sample;
    if components <= 1 || pixel_size == 0 {
        return data.to_vec();
    }
    let pixels = data.len() / pixel_size;
    let plane_size = pixels * bytes_per_sample;
    let mut out = vec![0; data.len()];
    for (p, pixel) in data.chunks_exact(pixel_size).enumerate() {
        for (c, sample) in pixel.chunks_exact(bytes_per_sample).enumerate() {
            let at = c * plane_size + p * bytes_per_sample;
            out[at..at + bytes_per_sample].copy_from_slice(sample);
        }
    }
    let tail = pixels * pixel_size;
    out[tail..].copy_from_slice(&data[tail..]);
    out
}

/// Convert color-by-plane data into color-by-pixel data.
///
/// This is the inverse of [`to_color_by_plane`].
pub fn to_color_by_pixel(data: &[u8], components: usize, bytes_per_sample: usize) -> Vec<u8> {
    let pixel_size = components * bytes_per_sample;
    if components <= 1 || pixel_size == 0 {
        return data.to_vec();
    }
    let pixels = data.len() / pixel_size;
    let plane_size = pixels * bytes_per_sample;
    let mut out = vec![0; data.len()];
    for (p, pixel) in out.chunks_exact_mut(pixel_size).enumerate() {
        for (c, sample) in pixel.chunks_exact_mut(bytes_per_sample).enumerate() {
            let at = c * plane_size + p * bytes_per_sample;
            sample.copy_from_slice(&data[at..at + bytes_per_sample]);
        }
    }
    let tail = pixels * pixel_size;
    out[tail..].copy_from_slice(&data[tail..]);
    out
}

/// Convert native pixel data in the given byte order
/// into little endian, in place.
///
/// Only cells of more than 8 bits spanning whole bytes are affected.
pub fn normalize_byte_order(data: &mut [u8], byte_order: Endianness, bits_allocated: u16) {
    if byte_order != Endianness::Big || bits_allocated <= 8 || bits_allocated % 8 != 0 {
        return;
    }
    if bits_allocated == 16 {
        swap_words(data);
    } else {
        for cell in data.chunks_exact_mut(usize::from(bits_allocated / 8)) {
            cell.reverse();
        }
    }
}

/// Swap the bytes of every 16-bit word, in place.
pub fn swap_words(data: &mut [u8]) {
    for word in data.chunks_exact_mut(2) {
        word.swap(0, 1);
    }
}

/// Read little endian samples of `bytes_per_sample` bytes each.
pub fn samples_from_bytes(data: &[u8], bytes_per_sample: usize) -> Vec<u16> {
    if bytes_per_sample == 1 {
        data.iter().map(|v| u16::from(*v)).collect()
    } else {
        data.chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect()
    }
}

/// Write samples as little endian bytes of `bytes_per_sample` bytes each,
/// appending them to `out`.
pub fn samples_to_bytes(samples: &[u16], bytes_per_sample: usize, out: &mut Vec<u8>) {
    if bytes_per_sample == 1 {
        out.extend(samples.iter().map(|v| *v as u8));
    } else {
        for v in samples {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
}
