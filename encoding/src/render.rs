//! Rendering of stored pixel values out of native pixel data cells.
//!
//! A pixel cell of _Bits Allocated_ bits holds the stored value
//! in the bits `HighBit - BitsStored + 1 ..= HighBit`.
//! The remaining bits are unused or hold embedded overlay planes.
//! Encoders which must not carry these bits into the compressed bitstream
//! render the stored values first,
//! and move embedded overlays into separate _Overlay Data_ attributes
//! with [`extract_embedded_overlays`].
use dicom_codec_core::ops::{AttributeAction, AttributeOp};
use dicom_codec_core::{tags, PrimitiveValue, Tag};
use snafu::{ensure, OptionExt};
use tracing::{debug, warn};

use crate::codec::PixelDataObject;
use crate::error::{codec_error, Result};

/// The first overlay repeating group.
const FIRST_OVERLAY_GROUP: u16 = 0x6000;
/// The last overlay repeating group.
const LAST_OVERLAY_GROUP: u16 = 0x601E;

/// The layout of native pixel data,
/// as described by the image pixel module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    /// Rows
    pub rows: u16,
    /// Columns
    pub cols: u16,
    /// Samples per Pixel
    pub samples_per_pixel: u16,
    /// Bits Allocated
    pub bits_allocated: u16,
    /// Bits Stored
    pub bits_stored: u16,
    /// High Bit
    pub high_bit: u16,
    /// whether samples are signed (Pixel Representation of 1)
    pub signed: bool,
    /// Planar Configuration
    pub planar_configuration: u16,
}

impl PixelLayout {
    /// Read the pixel data layout from the image pixel module of an object.
    ///
    /// _High Bit_ defaults to `BitsStored - 1`,
    /// _Pixel Representation_ and _Planar Configuration_ default to 0.
    pub fn from_object(obj: &dyn PixelDataObject) -> Result<Self> {
        let rows = obj
            .rows()
            .context(codec_error::MissingAttributeSnafu { name: "Rows" })?;
        let cols = obj
            .cols()
            .context(codec_error::MissingAttributeSnafu { name: "Columns" })?;
        let samples_per_pixel = obj.samples_per_pixel().context(
            codec_error::MissingAttributeSnafu {
                name: "SamplesPerPixel",
            },
        )?;
        let bits_allocated = obj.bits_allocated().context(
            codec_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            },
        )?;
        let bits_stored = obj
            .bits_stored()
            .context(codec_error::MissingAttributeSnafu { name: "BitsStored" })?;
        let high_bit = obj
            .high_bit()
            .unwrap_or_else(|| bits_stored.saturating_sub(1));
        let signed = obj.pixel_representation().unwrap_or(0) == 1;
        let planar_configuration = if samples_per_pixel > 1 {
            obj.planar_configuration().unwrap_or(0)
        } else {
            0
        };
        Ok(PixelLayout {
            rows,
            cols,
            samples_per_pixel,
            bits_allocated,
            bits_stored,
            high_bit,
            signed,
            planar_configuration,
        })
    }

    /// The number of pixels in a frame.
    pub fn pixels_per_frame(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    /// The number of samples in a frame.
    pub fn samples_per_frame(&self) -> usize {
        self.pixels_per_frame() * usize::from(self.samples_per_pixel)
    }

    /// The number of bytes of a frame of native pixel data,
    /// with cells packed at _Bits Allocated_ bits.
    pub fn frame_size_in_bytes(&self) -> usize {
        (self.samples_per_frame() * usize::from(self.bits_allocated) + 7) / 8
    }

    /// The sample precision of the rendered values: 8 or 16 bits.
    pub fn rendered_bits(&self) -> u16 {
        if self.bits_stored > 8 {
            16
        } else {
            8
        }
    }

    fn check(&self) -> Result<()> {
        ensure!(
            (1..=16).contains(&self.bits_stored),
            codec_error::UnsupportedBitDepthSnafu {
                bits: self.bits_stored
            }
        );
        ensure!(
            (1..=32).contains(&self.bits_allocated)
                && self.high_bit < self.bits_allocated
                && self.high_bit + 1 >= self.bits_stored,
            codec_error::UnsupportedGeometrySnafu {
                reason: format!(
                    "high bit {} does not fit {} bits stored in {} bits allocated",
                    self.high_bit, self.bits_stored, self.bits_allocated
                ),
            }
        );
        Ok(())
    }
}

/// Read the pixel cell at the given index,
/// where cells are packed at `bits_allocated` bits each
/// in little endian bit order.
fn read_cell(data: &[u8], index: usize, bits_allocated: u16) -> u32 {
    let bit_offset = index * usize::from(bits_allocated);
    let first = bit_offset / 8;
    let shift = bit_offset % 8;
    let mut acc: u64 = 0;
    for (i, byte) in data.iter().skip(first).take(5).enumerate() {
        acc |= u64::from(*byte) << (8 * i);
    }
    let mask = (1_u64 << bits_allocated) - 1;
    ((acc >> shift) & mask) as u32
}

/// Render the stored values of one frame of native pixel data
/// (in little endian),
/// as color-by-pixel samples of [`rendered_bits`](PixelLayout::rendered_bits) bits.
///
/// Signed values are sign extended to the rendered precision,
/// so that the two's complement bit pattern is preserved.
pub fn render_stored_values(data: &[u8], layout: &PixelLayout, frame: usize) -> Result<Vec<u16>> {
    layout.check()?;
    let frame_cells = layout.samples_per_frame();
    let required = ((frame + 1) * frame_cells * usize::from(layout.bits_allocated) + 7) / 8;
    ensure!(
        data.len() >= required,
        codec_error::BufferTooSmallSnafu {
            required,
            available: data.len(),
        }
    );

    let shift = layout.high_bit + 1 - layout.bits_stored;
    let mask: u32 = (1 << layout.bits_stored) - 1;
    let sign_bit: u32 = 1 << (layout.bits_stored - 1);
    let out_mask: u32 = (1 << layout.rendered_bits()) - 1;
    let pixels = layout.pixels_per_frame();
    let components = usize::from(layout.samples_per_pixel);
    let base = frame * frame_cells;

    let mut out = Vec::with_capacity(frame_cells);
    for p in 0..pixels {
        for c in 0..components {
            let cell_index = if layout.planar_configuration == 1 {
                base + c * pixels + p
            } else {
                base + p * components + c
            };
            let cell = read_cell(data, cell_index, layout.bits_allocated);
            let mut value = (cell >> shift) & mask;
            if layout.signed && value & sign_bit != 0 {
                value |= !mask;
            }
            out.push((value & out_mask) as u16);
        }
    }
    Ok(out)
}

fn overlay_int(obj: &dyn PixelDataObject, tag: Tag) -> Option<i32> {
    obj.primitive(tag).and_then(PrimitiveValue::to_int)
}

/// Extract the overlay planes embedded in the unused bits of the pixel cells.
///
/// An overlay plane is considered embedded
/// if it declares its rows and columns but has no _Overlay Data_.
/// For each of these, the returned operations
/// provide the overlay data as a separate attribute
/// and describe it as 1 bit allocated at bit position 0.
///
/// `data` is the native pixel data of all frames, in little endian.
pub fn extract_embedded_overlays(
    obj: &dyn PixelDataObject,
    data: &[u8],
    layout: &PixelLayout,
    frames: usize,
) -> Vec<AttributeOp> {
    let mut ops = Vec::new();
    for group in (FIRST_OVERLAY_GROUP..=LAST_OVERLAY_GROUP).step_by(2) {
        let (Some(rows), Some(cols)) = (
            overlay_int(obj, tags::OVERLAY_ROWS.with_group(group)),
            overlay_int(obj, tags::OVERLAY_COLUMNS.with_group(group)),
        ) else {
            continue;
        };
        if obj.element(tags::OVERLAY_DATA.with_group(group)).is_some() {
            continue;
        }
        let Some(bit_position) = overlay_int(obj, tags::OVERLAY_BIT_POSITION.with_group(group))
        else {
            warn!(
                "Overlay in group {:04X} has no data and no bit position, ignoring",
                group
            );
            continue;
        };
        if bit_position < 0 || bit_position >= i32::from(layout.bits_allocated) {
            warn!(
                "Overlay in group {:04X} has an invalid bit position {}, ignoring",
                group, bit_position
            );
            continue;
        }

        let overlay_frames = overlay_int(obj, tags::NUMBER_OF_FRAMES_IN_OVERLAY.with_group(group))
            .unwrap_or(1)
            .max(1) as usize;
        let frame_origin = overlay_int(obj, tags::IMAGE_FRAME_ORIGIN.with_group(group))
            .unwrap_or(1)
            .max(1) as usize;
        let (origin_row, origin_col) = overlay_origin(obj, group);

        let rows = rows.max(0) as usize;
        let cols = cols.max(0) as usize;
        let total_bits = overlay_frames * rows * cols;
        let mut packed = vec![0_u8; (total_bits + 7) / 8];
        if packed.len() % 2 != 0 {
            packed.push(0);
        }

        let frame_cells = layout.samples_per_frame();
        let image_rows = i64::from(layout.rows);
        let image_cols = i64::from(layout.cols);
        let mut k = 0;
        for f in 0..overlay_frames {
            let image_frame = frame_origin - 1 + f;
            for y in 0..rows {
                for x in 0..cols {
                    let iy = y as i64 + origin_row - 1;
                    let ix = x as i64 + origin_col - 1;
                    if image_frame < frames
                        && (0..image_rows).contains(&iy)
                        && (0..image_cols).contains(&ix)
                    {
                        let index = image_frame * frame_cells
                            + (iy * image_cols + ix) as usize
                                * usize::from(layout.samples_per_pixel);
                        let cell = read_cell(data, index, layout.bits_allocated);
                        if (cell >> bit_position) & 1 != 0 {
                            packed[k / 8] |= 1 << (k % 8);
                        }
                    }
                    k += 1;
                }
            }
        }

        debug!(
            "Extracted embedded overlay in group {:04X} ({}x{}, {} frames)",
            group, cols, rows, overlay_frames
        );
        ops.push(AttributeOp::new(
            tags::OVERLAY_DATA.with_group(group),
            AttributeAction::Set(packed.into()),
        ));
        ops.push(AttributeOp::new(
            tags::OVERLAY_BITS_ALLOCATED.with_group(group),
            AttributeAction::Set(1_u16.into()),
        ));
        ops.push(AttributeOp::new(
            tags::OVERLAY_BIT_POSITION.with_group(group),
            AttributeAction::Set(0_u16.into()),
        ));
    }
    ops
}

/// Read the overlay origin (row, column), defaulting to (1, 1).
fn overlay_origin(obj: &dyn PixelDataObject, group: u16) -> (i64, i64) {
    let values: Vec<i64> = obj
        .primitive(tags::OVERLAY_ORIGIN.with_group(group))
        .map(|v| {
            v.to_multi_str()
                .iter()
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();
    match values.as_slice() {
        [row, col, ..] => (*row, *col),
        _ => (1, 1),
    }
}
