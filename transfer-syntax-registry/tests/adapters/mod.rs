//! Utility module for testing pixel data codecs.
#![allow(dead_code)]

use dicom_codec_core::{tags, InMemDataSet, PrimitiveValue};

/// The image pixel module of a test image.
#[derive(Debug, Clone)]
pub(crate) struct TestImage {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub pixel_representation: u16,
    pub planar_configuration: u16,
    pub photometric_interpretation: &'static str,
    pub number_of_frames: u32,
}

impl TestImage {
    /// A single frame monochrome image.
    pub fn monochrome(rows: u16, columns: u16, bits_allocated: u16, bits_stored: u16) -> Self {
        TestImage {
            rows,
            columns,
            samples_per_pixel: 1,
            bits_allocated,
            bits_stored,
            pixel_representation: 0,
            planar_configuration: 0,
            photometric_interpretation: "MONOCHROME2",
            number_of_frames: 1,
        }
    }

    /// A single frame 8-bit RGB image.
    pub fn rgb(rows: u16, columns: u16, planar_configuration: u16) -> Self {
        TestImage {
            rows,
            columns,
            samples_per_pixel: 3,
            bits_allocated: 8,
            bits_stored: 8,
            pixel_representation: 0,
            planar_configuration,
            photometric_interpretation: "RGB",
            number_of_frames: 1,
        }
    }

    pub fn frames(mut self, number_of_frames: u32) -> Self {
        self.number_of_frames = number_of_frames;
        self
    }

    pub fn samples_per_frame(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns) * usize::from(self.samples_per_pixel)
    }

    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_allocated / 8)
    }

    /// Build a data set with this image module and the given native pixel data.
    pub fn dataset(&self, pixel_data: Vec<u8>) -> InMemDataSet {
        let mut dataset = InMemDataSet::from_element_iter([
            (tags::ROWS, PrimitiveValue::from(self.rows)),
            (tags::COLUMNS, PrimitiveValue::from(self.columns)),
            (tags::SAMPLES_PER_PIXEL, PrimitiveValue::from(self.samples_per_pixel)),
            (tags::BITS_ALLOCATED, PrimitiveValue::from(self.bits_allocated)),
            (tags::BITS_STORED, PrimitiveValue::from(self.bits_stored)),
            (tags::HIGH_BIT, PrimitiveValue::from(self.bits_stored - 1)),
            (
                tags::PIXEL_REPRESENTATION,
                PrimitiveValue::from(self.pixel_representation),
            ),
            (
                tags::PHOTOMETRIC_INTERPRETATION,
                PrimitiveValue::from(self.photometric_interpretation),
            ),
            (
                tags::SOP_CLASS_UID,
                PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.7"),
            ),
            (
                tags::SOP_INSTANCE_UID,
                PrimitiveValue::from("2.25.1234567890"),
            ),
            (tags::PIXEL_DATA, PrimitiveValue::from(pixel_data)),
        ]);
        if self.samples_per_pixel > 1 {
            dataset.put(
                tags::PLANAR_CONFIGURATION,
                PrimitiveValue::from(self.planar_configuration),
            );
        }
        if self.number_of_frames > 1 {
            dataset.put(
                tags::NUMBER_OF_FRAMES,
                PrimitiveValue::from(self.number_of_frames.to_string()),
            );
        }
        dataset
    }

    /// Generate pixel data for all frames,
    /// with sample values produced by `f(frame, index)`
    /// and masked to the bits stored.
    pub fn generate(&self, f: impl Fn(usize, usize) -> u32) -> Vec<u8> {
        let mask = (1_u32 << self.bits_stored) - 1;
        let bytes = self.bytes_per_sample();
        let mut out = Vec::new();
        for frame in 0..self.number_of_frames as usize {
            for i in 0..self.samples_per_frame() {
                let value = f(frame, i) & mask;
                out.extend_from_slice(&value.to_le_bytes()[..bytes]);
            }
        }
        out
    }
}

/// Read the little endian samples of native pixel data.
pub(crate) fn samples(data: &[u8], bytes_per_sample: usize) -> Vec<u32> {
    data.chunks_exact(bytes_per_sample)
        .map(|c| {
            let mut value = [0; 4];
            value[..bytes_per_sample].copy_from_slice(c);
            u32::from_le_bytes(value)
        })
        .collect()
}

/// A pseudo-random but deterministic sequence of values.
pub(crate) fn noise(seed: usize) -> u32 {
    let mut x = (seed as u32).wrapping_mul(0x9E37_79B9) ^ 0x5bd1_e995;
    x ^= x >> 15;
    x = x.wrapping_mul(0x2c1b_3c6d);
    x ^= x >> 12;
    x
}
