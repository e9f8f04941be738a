//! Mapping between the frames of an image
//! and the fragments of its encapsulated pixel data.
//!
//! Fragments are addressed by their item index in the pixel sequence:
//! item 0 is the basic offset table,
//! so the first fragment holding compressed data has the index 1.
//! This is also the numbering of the start fragment hints
//! given to and returned by frame level decoding.
use std::ops::Range;

use dicom_codec_core::PixelFragmentSequence;
use snafu::{ensure, OptionExt};
use tracing::debug;

use crate::error::{codec_error, Result};

/// The size of the item header preceding every fragment:
/// item tag and item length.
pub const ITEM_HEADER_LENGTH: u32 = 8;

/// Determines which fragments of a pixel sequence belong to which frame.
///
/// The mapper holds no state besides the pixel sequence and frame count,
/// so every query is derived from its arguments alone.
/// When the frames are requested out of order
/// without a usable offset table,
/// the caller should supply the start fragment
/// returned by the previous query.
#[derive(Debug, Clone, Copy)]
pub struct FragmentFrameMapper<'a, P> {
    sequence: &'a PixelFragmentSequence<P>,
    frames: u32,
    ignore_offset_table: bool,
}

impl<'a, P> FragmentFrameMapper<'a, P>
where
    P: AsRef<[u8]>,
{
    /// Create a fragment mapper for the given pixel sequence
    /// of an image with the given number of frames.
    pub fn new(sequence: &'a PixelFragmentSequence<P>, frames: u32) -> Self {
        FragmentFrameMapper {
            sequence,
            frames,
            ignore_offset_table: false,
        }
    }

    /// Set whether the basic offset table should be disregarded,
    /// such as when it is known to be unreliable.
    pub fn ignore_offset_table(mut self, ignore: bool) -> Self {
        self.ignore_offset_table = ignore;
        self
    }

    /// The number of items in the sequence,
    /// counting the offset table.
    fn item_count(&self) -> u32 {
        self.sequence.item_count() as u32
    }

    /// Retrieve a fragment by its item index (starting at 1).
    fn item(&self, index: u32) -> Option<&[u8]> {
        let index = (index as usize).checked_sub(1)?;
        self.sequence.fragments().get(index).map(AsRef::as_ref)
    }

    /// Retrieve the offset table if it can be used
    /// to locate the frames.
    fn usable_offset_table(&self) -> Option<&[u32]> {
        let table = self.sequence.offset_table();
        if self.ignore_offset_table || table.len() != self.frames as usize {
            None
        } else {
            Some(table)
        }
    }

    /// Find the fragment whose item starts at the given byte offset,
    /// relative to the first fragment item.
    fn item_at_offset(&self, offset: u32) -> Option<u32> {
        let mut byte_count: u64 = 0;
        let mut index = 1;
        while byte_count < u64::from(offset) && index < self.item_count() {
            byte_count += self.item(index).map_or(0, |f| f.len() as u64) + u64::from(ITEM_HEADER_LENGTH);
            index += 1;
        }
        if byte_count == u64::from(offset) {
            Some(index)
        } else {
            None
        }
    }

    /// Determine the number of fragments of the given frame,
    /// starting at the fragment `start_fragment`.
    ///
    /// Returns 0 if the number of fragments cannot be determined.
    pub fn fragment_count(&self, frame: u32, start_fragment: u32) -> u32 {
        let items = self.item_count();
        if start_fragment == 0 || start_fragment >= items {
            return 0;
        }

        // single frame, or the last frame: all remaining fragments
        if self.frames <= 1 || frame + 1 == self.frames {
            return items - start_fragment;
        }

        // one fragment per frame
        if self.frames + 1 == items {
            return 1;
        }

        if let Some(table) = self.usable_offset_table() {
            let next_offset = table[frame as usize + 1];
            if let Some(index) = self.item_at_offset(next_offset) {
                if index > start_fragment {
                    return index - start_fragment;
                }
            }
        }

        // look for the start of the next frame in the bitstream
        for index in (start_fragment + 1)..items {
            if self.item(index).map_or(false, starts_new_frame) {
                return index - start_fragment;
            }
        }

        debug!(
            "Could not determine the fragments of frame #{} from fragment #{}",
            frame, start_fragment
        );
        0
    }

    /// Determine the fragment at which the given frame starts,
    /// without knowledge of the previous frames.
    ///
    /// The first frame, one fragment per frame
    /// and a usable offset table are resolved directly.
    /// Otherwise, the fragments of the preceding frames
    /// are counted from the first frame onwards.
    pub fn start_fragment(&self, frame: u32) -> Option<u32> {
        let items = self.item_count();
        if frame >= self.frames || items < 2 {
            return None;
        }
        if frame == 0 {
            return Some(1);
        }
        if self.frames + 1 == items {
            return Some(frame + 1);
        }
        if let Some(table) = self.usable_offset_table() {
            if let Some(index) = self
                .item_at_offset(table[frame as usize])
                .filter(|index| *index < items)
            {
                return Some(index);
            }
        }

        let mut start = 1;
        for f in 0..frame {
            match self.fragment_count(f, start) {
                0 => return None,
                count => start += count,
            }
        }
        Some(start).filter(|index| *index < items)
    }

    /// Determine the half-open range of fragment indices
    /// which hold the compressed data of the given frame.
    ///
    /// A `start_fragment` of 0 means that the first fragment of the frame
    /// is not known and shall be determined automatically.
    pub fn frame_fragments(&self, frame: u32, start_fragment: u32) -> Result<Range<u32>> {
        ensure!(
            frame < self.frames.max(1),
            codec_error::FrameRangeOutOfBoundsSnafu { frame }
        );
        let start = if start_fragment == 0 {
            self.start_fragment(frame)
                .context(codec_error::CannotDetermineFragmentCountSnafu { frame })?
        } else {
            start_fragment
        };
        let count = self.fragment_count(frame, start);
        ensure!(
            count > 0,
            codec_error::CannotDetermineFragmentCountSnafu { frame }
        );
        Ok(start..start + count)
    }

    /// Concatenate the given range of fragments
    /// into a single contiguous bitstream.
    pub fn concat(&self, range: Range<u32>) -> Vec<u8> {
        let size: usize = range
            .clone()
            .filter_map(|i| self.item(i))
            .map(<[u8]>::len)
            .sum();
        let mut out = Vec::with_capacity(size);
        for index in range {
            if let Some(fragment) = self.item(index) {
                out.extend_from_slice(fragment);
            }
        }
        out
    }
}

/// Check whether the fragment begins with a JPEG family start of image
/// marker followed by a frame, comment or application segment marker.
fn starts_new_frame(fragment: &[u8]) -> bool {
    match fragment {
        [0xFF, 0xD8, 0xFF, marker, ..] => {
            *marker == 0xF7 || *marker == 0xFE || (*marker & 0xF0) == 0xE0
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn jls_fragment(len: usize) -> Vec<u8> {
        let mut fragment = vec![0xFF, 0xD8, 0xFF, 0xF7];
        fragment.resize(len, 0x11);
        fragment
    }

    fn continuation(len: usize) -> Vec<u8> {
        vec![0x22; len]
    }

    /// 3 frames: 2 fragments, 1 fragment, 2 fragments
    fn three_frames(with_table: bool) -> PixelFragmentSequence<Vec<u8>> {
        let fragments = vec![
            jls_fragment(10),
            continuation(6),
            jls_fragment(8),
            jls_fragment(4),
            continuation(2),
        ];
        let table = if with_table {
            vec![0_u32, 10 + 8 + 6 + 8, 10 + 8 + 6 + 8 + 8 + 8]
        } else {
            vec![]
        };
        PixelFragmentSequence::new(table, fragments)
    }

    #[rstest(with_table => [true, false])]
    fn sequential_mapping(with_table: bool) {
        let seq = three_frames(with_table);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        assert_eq!(mapper.frame_fragments(0, 1).unwrap(), 1..3);
        assert_eq!(mapper.frame_fragments(1, 3).unwrap(), 3..4);
        assert_eq!(mapper.frame_fragments(2, 4).unwrap(), 4..6);
    }

    #[test]
    fn random_access_with_offset_table() {
        let seq = three_frames(true);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        // automatic start agrees with sequential traversal
        let mut start = 1;
        for frame in 0..3 {
            let sequential = mapper.frame_fragments(frame, start).unwrap();
            assert_eq!(mapper.frame_fragments(frame, 0).unwrap(), sequential);
            start = sequential.end;
        }
    }

    #[test]
    fn random_access_without_offset_table_walks_from_first_frame() {
        let seq = three_frames(false);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        assert_eq!(mapper.start_fragment(1), Some(3));
        assert_eq!(mapper.start_fragment(2), Some(4));
        let mut start = 1;
        for frame in 0..3 {
            let sequential = mapper.frame_fragments(frame, start).unwrap();
            assert_eq!(mapper.frame_fragments(frame, 0).unwrap(), sequential);
            start = sequential.end;
        }
    }

    #[test]
    fn random_access_fails_when_walk_is_interrupted() {
        let seq: PixelFragmentSequence<Vec<u8>> = PixelFragmentSequence::new_fragments(vec![
            jls_fragment(4),
            continuation(4),
            continuation(4),
            continuation(4),
        ]);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        assert_eq!(mapper.start_fragment(1), None);
        assert!(matches!(
            mapper.frame_fragments(2, 0),
            Err(crate::CodecError::CannotDetermineFragmentCount { frame: 2 })
        ));
        assert!(matches!(
            mapper.frame_fragments(0, 0),
            Err(crate::CodecError::CannotDetermineFragmentCount { frame: 0 })
        ));
    }

    #[test]
    fn one_fragment_per_frame_agrees_with_marker_scan() {
        let seq: PixelFragmentSequence<Vec<u8>> =
            PixelFragmentSequence::new_fragments(vec![jls_fragment(6), jls_fragment(12), jls_fragment(4)]);
        let fast = FragmentFrameMapper::new(&seq, 3);
        for frame in 0..3 {
            assert_eq!(fast.fragment_count(frame, frame + 1), 1);
        }

        // break the fast path with a trailing empty fragment,
        // leaving the marker scan to decide
        let mut fragments = seq.fragments().to_vec();
        fragments.push(vec![]);
        let seq = PixelFragmentSequence::new_fragments(fragments);
        let scan = FragmentFrameMapper::new(&seq, 3).ignore_offset_table(true);
        for frame in 0..2 {
            assert_eq!(scan.fragment_count(frame, frame + 1), 1);
        }
    }

    #[test]
    fn ignored_offset_table_falls_back_to_markers() {
        let mut seq = three_frames(true);
        // corrupt the offset table
        seq.offset_table_mut()[1] = 1000;
        let mapper = FragmentFrameMapper::new(&seq, 3);
        assert_eq!(mapper.fragment_count(0, 1), 2);
        let mapper = mapper.ignore_offset_table(true);
        assert_eq!(mapper.fragment_count(0, 1), 2);
        assert_eq!(mapper.start_fragment(1), Some(3));
    }

    #[test]
    fn undeterminable_frame() {
        // no markers, no offset table, more fragments than frames
        let seq: PixelFragmentSequence<Vec<u8>> =
            PixelFragmentSequence::new_fragments(vec![continuation(4), continuation(4), continuation(4)]);
        let mapper = FragmentFrameMapper::new(&seq, 2);
        assert_eq!(mapper.fragment_count(0, 1), 0);
        // the last frame takes the remaining fragments
        assert_eq!(mapper.fragment_count(1, 2), 2);
    }

    #[test]
    fn frame_out_of_range() {
        let seq = three_frames(true);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        assert!(matches!(
            mapper.frame_fragments(3, 0),
            Err(crate::CodecError::FrameRangeOutOfBounds { frame: 3 })
        ));
    }

    #[test]
    fn concatenation() {
        let seq = three_frames(false);
        let mapper = FragmentFrameMapper::new(&seq, 3);
        let data = mapper.concat(1..3);
        assert_eq!(data.len(), 16);
        assert_eq!(&data[..4], &[0xFF, 0xD8, 0xFF, 0xF7]);
        assert_eq!(&data[10..], &[0x22; 6]);
    }

    #[test]
    fn marker_detection() {
        assert!(starts_new_frame(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]));
        assert!(starts_new_frame(&[0xFF, 0xD8, 0xFF, 0xFE]));
        assert!(!starts_new_frame(&[0xFF, 0xD8, 0xFF, 0xC0]));
        assert!(!starts_new_frame(&[0xFF, 0xD8, 0xFF]));
    }
}
