//! Construction of encapsulated pixel data.
//!
//! Compressed frames are appended one at a time,
//! possibly split into several fragments of a maximum size,
//! while the size of each frame's fragments is recorded
//! in an [`OffsetList`] for building the basic offset table afterwards.
use std::convert::TryFrom;

use dicom_codec_core::value::{InMemFragment, C};
use dicom_codec_core::PixelFragmentSequence;
use snafu::OptionExt;

use crate::error::{codec_error, Result};
use crate::fragments::ITEM_HEADER_LENGTH;

/// Fragment sizes of 4 GiB or more cannot be expressed in an item length,
/// and are treated as unlimited.
const MAX_FRAGMENT_SIZE_KB: u32 = 0x40_0000;

/// Policy for padding a compressed bitstream of odd length
/// to the even length required by pixel data fragments.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BitstreamPadding {
    /// Insert a fill byte `FF` before the final end of image marker,
    /// so that the bitstream ends with `FF FF D9`.
    /// Some strict decoders do not accept trailing data after the marker.
    #[default]
    ExtendedEoi,
    /// Append a zero byte after the end of image marker,
    /// so that the bitstream ends with `FF D9 00`.
    Plain,
}

/// Pad a compressed bitstream to an even length
/// in accordance to the given policy.
///
/// Bitstreams of even length are left untouched.
/// The extended end of image marker is only used
/// when the bitstream actually ends with an end of image marker.
pub fn pad_bitstream(data: &mut Vec<u8>, padding: BitstreamPadding) {
    if data.len() % 2 == 0 {
        return;
    }
    match padding {
        BitstreamPadding::ExtendedEoi if data.ends_with(&[0xFF, 0xD9]) => {
            let at = data.len() - 2;
            data.insert(at, 0xFF);
        }
        _ => data.push(0),
    }
}

/// The list of the total encoded size of each frame,
/// item headers of its fragments included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OffsetList {
    sizes: Vec<u64>,
}

impl OffsetList {
    /// Create an empty offset list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the encoded size of the next frame.
    pub fn push(&mut self, size: u64) {
        self.sizes.push(size);
    }

    /// The number of frames recorded.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether no frames were recorded.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Build the basic offset table:
    /// the offset of each frame's first fragment item,
    /// relative to the first fragment item.
    ///
    /// Fails with [`MemoryExhausted`](crate::error::CodecError::MemoryExhausted)
    /// if an offset does not fit in 32 bits.
    pub fn to_offset_table(&self) -> Result<C<u32>> {
        let mut table = C::with_capacity(self.sizes.len());
        let mut offset: u64 = 0;
        for size in &self.sizes {
            let entry = u32::try_from(offset)
                .ok()
                .context(codec_error::MemoryExhaustedSnafu {
                    size: usize::try_from(offset).unwrap_or(usize::MAX),
                })?;
            table.push(entry);
            offset += size;
        }
        Ok(table)
    }
}

/// Builder of encapsulated pixel data,
/// one compressed frame at a time.
///
/// # Example
///
/// ```
/// # use dicom_codec::encapsulation::EncapsulatedPixelDataBuilder;
/// let mut builder = EncapsulatedPixelDataBuilder::new(0);
/// builder.push_frame(vec![0xFF, 0xD8, 0xFF, 0xD9]);
/// builder.push_frame(vec![0xFF, 0xD8, 0x00, 0x00, 0xFF, 0xD9]);
/// let sequence = builder.build(true)?;
/// assert_eq!(sequence.fragments().len(), 2);
/// assert_eq!(sequence.offset_table(), &[0, 12]);
/// # Ok::<(), dicom_codec::CodecError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EncapsulatedPixelDataBuilder {
    fragment_size: usize,
    fragments: C<InMemFragment>,
    offsets: OffsetList,
}

impl EncapsulatedPixelDataBuilder {
    /// Create a new builder with the given maximum fragment size in kibibytes.
    /// A size of 0 means that each frame is stored in a single fragment.
    pub fn new(fragment_size_kb: u32) -> Self {
        let fragment_size = if fragment_size_kb >= MAX_FRAGMENT_SIZE_KB {
            0
        } else {
            fragment_size_kb as usize * 1024
        };
        EncapsulatedPixelDataBuilder {
            fragment_size,
            fragments: C::new(),
            offsets: OffsetList::new(),
        }
    }

    /// Append a compressed frame,
    /// splitting it into fragments of the maximum fragment size.
    ///
    /// Fragments of odd length are padded with a zero byte.
    /// The bitstream should be padded beforehand
    /// (see [`pad_bitstream`]) so that no padding is needed here.
    pub fn push_frame(&mut self, data: Vec<u8>) {
        let chunk_size = if self.fragment_size == 0 {
            data.len().max(1)
        } else {
            self.fragment_size
        };

        let mut frame_size = 0;
        if data.len() <= chunk_size {
            frame_size += self.push_fragment(data);
        } else {
            for chunk in data.chunks(chunk_size) {
                frame_size += self.push_fragment(chunk.to_vec());
            }
        }
        self.offsets.push(frame_size);
    }

    fn push_fragment(&mut self, mut fragment: Vec<u8>) -> u64 {
        if fragment.len() % 2 != 0 {
            fragment.push(0);
        }
        let size = fragment.len() as u64 + u64::from(ITEM_HEADER_LENGTH);
        self.fragments.push(fragment);
        size
    }

    /// The number of frames pushed so far.
    pub fn frame_count(&self) -> usize {
        self.offsets.len()
    }

    /// The list of encoded frame sizes recorded so far.
    pub fn offsets(&self) -> &OffsetList {
        &self.offsets
    }

    /// Finish the pixel sequence,
    /// with a basic offset table if requested.
    pub fn build(self, create_offset_table: bool) -> Result<PixelFragmentSequence<InMemFragment>> {
        let table = if create_offset_table {
            self.offsets.to_offset_table()?
        } else {
            C::new()
        };
        Ok(PixelFragmentSequence::new(table, self.fragments))
    }
}

/// Retrieve the total length of the compressed data in a pixel sequence,
/// excluding item headers.
pub fn compressed_length(sequence: &PixelFragmentSequence<InMemFragment>) -> usize {
    sequence.fragments().iter().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::fragments::FragmentFrameMapper;

    #[test]
    fn padding_policies() {
        let odd = vec![0xFF, 0xD8, 0x12, 0xFF, 0xD9];

        let mut data = odd.clone();
        pad_bitstream(&mut data, BitstreamPadding::ExtendedEoi);
        assert_eq!(data.len(), 6);
        assert!(data.ends_with(&[0xFF, 0xFF, 0xD9]));

        let mut data = odd.clone();
        pad_bitstream(&mut data, BitstreamPadding::Plain);
        assert_eq!(data.len(), 6);
        assert!(data.ends_with(&[0xFF, 0xD9, 0x00]));

        // even data is left alone
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xD9];
        pad_bitstream(&mut data, BitstreamPadding::ExtendedEoi);
        assert_eq!(data, vec![0xFF, 0xD8, 0xFF, 0xD9]);

        // no marker at the end: plain padding
        let mut data = vec![1, 2, 3];
        pad_bitstream(&mut data, BitstreamPadding::ExtendedEoi);
        assert_eq!(data, vec![1, 2, 3, 0]);
    }

    #[test]
    fn split_into_fragments() {
        let mut builder = EncapsulatedPixelDataBuilder::new(1);
        // 2.5 KiB frame
        builder.push_frame(vec![0xAB; 2560]);
        builder.push_frame(vec![0xCD; 100]);
        assert_eq!(builder.frame_count(), 2);
        let seq = builder.build(true).unwrap();

        let lengths: Vec<_> = seq.fragments().iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![1024, 1024, 512, 100]);
        assert_eq!(seq.offset_table(), &[0, 2560 + 3 * 8]);

        // the offset table locates the frames
        let mapper = FragmentFrameMapper::new(&seq, 2);
        assert_eq!(mapper.frame_fragments(0, 0).unwrap(), 1..4);
        assert_eq!(mapper.frame_fragments(1, 0).unwrap(), 4..5);
        assert_eq!(compressed_length(&seq), 2660);
    }

    #[test]
    fn odd_fragments_are_padded() {
        let mut builder = EncapsulatedPixelDataBuilder::new(0);
        builder.push_frame(vec![1, 2, 3]);
        let seq = builder.build(false).unwrap();
        assert_eq!(seq.fragments()[0], vec![1, 2, 3, 0]);
        assert!(seq.offset_table().is_empty());
    }

    #[test]
    fn huge_fragment_size_is_unlimited() {
        let mut builder = EncapsulatedPixelDataBuilder::new(u32::MAX);
        builder.push_frame(vec![0; 4096]);
        let seq = builder.build(true).unwrap();
        assert_eq!(seq.fragments().len(), 1);
    }

    #[test]
    fn offset_table_overflow() {
        let mut offsets = OffsetList::new();
        offsets.push(u64::from(u32::MAX));
        offsets.push(16);
        assert!(offsets.to_offset_table().is_ok());
        offsets.push(16);
        assert!(matches!(
            offsets.to_offset_table(),
            Err(CodecError::MemoryExhausted { size })
                if size as u64 == u64::from(u32::MAX) + 16
        ));
    }
}
