//! Reading the frame and scan headers of a JPEG-LS bitstream.
//!
//! CharLS decodes a whole frame at once,
//! so the headers are inspected beforehand
//! to validate the frame against the image attributes
//! and to know the sample layout of the decoded buffer.
use std::io::{Cursor, Read};

use byteordered::ByteOrdered;
use dicom_codec::error::{CodecError, Result};

const MARKER_START: u8 = 0xFF;
const START_OF_IMAGE: u8 = 0xD8;
const END_OF_IMAGE: u8 = 0xD9;
const START_OF_FRAME_JPEGLS: u8 = 0xF7;
const START_OF_SCAN: u8 = 0xDA;

/// How the components of a color image are interleaved in the scans.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Interleave {
    /// One scan per component, decoded color-by-plane.
    None,
    /// Line interleaved, decoded color-by-pixel.
    Line,
    /// Sample interleaved, decoded color-by-pixel.
    Sample,
}

impl Interleave {
    /// Whether the decoded samples are laid out color-by-plane.
    pub(crate) fn is_planar(self) -> bool {
        self == Interleave::None
    }
}

/// The frame properties declared in a JPEG-LS bitstream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u8,
    pub component_count: u8,
    pub interleave: Interleave,
    pub near: u8,
}

impl StreamInfo {
    /// The size of each decoded sample in bytes.
    pub(crate) fn bytes_per_sample(&self) -> usize {
        if self.bits_per_sample > 8 {
            2
        } else {
            1
        }
    }

    /// The size of the decoded frame in bytes.
    pub(crate) fn frame_size(&self) -> usize {
        self.width as usize
            * self.height as usize
            * usize::from(self.component_count)
            * self.bytes_per_sample()
    }
}

fn invalid(reason: &str) -> CodecError {
    CodecError::InvalidCompressedData {
        source: reason.into(),
    }
}

/// Read the headers of a JPEG-LS bitstream up to the first scan.
pub(crate) fn read_stream_info(data: &[u8]) -> Result<StreamInfo> {
    let mut reader = ByteOrdered::be(Cursor::new(data));
    let truncated = |_| invalid("truncated JPEG-LS header");

    let mut soi = [0_u8; 2];
    reader.read_exact(&mut soi).map_err(truncated)?;
    if soi != [MARKER_START, START_OF_IMAGE] {
        return Err(invalid("missing JPEG-LS start of image marker"));
    }

    let mut frame: Option<(u8, u32, u32, u8)> = None;
    loop {
        if reader.read_u8().map_err(truncated)? != MARKER_START {
            return Err(invalid("expected a JPEG marker"));
        }
        let mut marker = reader.read_u8().map_err(truncated)?;
        // fill bytes
        while marker == MARKER_START {
            marker = reader.read_u8().map_err(truncated)?;
        }
        match marker {
            END_OF_IMAGE => return Err(invalid("JPEG-LS stream has no scan")),
            0xD0..=0xD7 | START_OF_IMAGE => continue,
            _ => {}
        }

        let length = reader.read_u16().map_err(truncated)?;
        if length < 2 {
            return Err(invalid("bad JPEG marker segment length"));
        }
        match marker {
            START_OF_FRAME_JPEGLS => {
                let precision = reader.read_u8().map_err(truncated)?;
                let height = reader.read_u16().map_err(truncated)?;
                let width = reader.read_u16().map_err(truncated)?;
                let components = reader.read_u8().map_err(truncated)?;
                if !(2..=16).contains(&precision) || components == 0 {
                    return Err(invalid("bad JPEG-LS frame header"));
                }
                skip(&mut reader, usize::from(length).saturating_sub(8))?;
                frame = Some((precision, u32::from(width), u32::from(height), components));
            }
            START_OF_SCAN => {
                let (bits_per_sample, width, height, component_count) =
                    frame.ok_or_else(|| invalid("JPEG-LS scan before the frame header"))?;
                let scan_components = reader.read_u8().map_err(truncated)?;
                skip(&mut reader, usize::from(scan_components) * 2)?;
                let near = reader.read_u8().map_err(truncated)?;
                let interleave = match reader.read_u8().map_err(truncated)? {
                    0 => Interleave::None,
                    1 => Interleave::Line,
                    2 => Interleave::Sample,
                    _ => return Err(invalid("bad JPEG-LS interleave mode")),
                };
                return Ok(StreamInfo {
                    width,
                    height,
                    bits_per_sample,
                    component_count,
                    interleave,
                    near,
                });
            }
            _ => skip(&mut reader, usize::from(length) - 2)?,
        }
    }
}

fn skip<R: Read>(reader: &mut R, count: usize) -> Result<()> {
    let skipped = std::io::copy(&mut reader.take(count as u64), &mut std::io::sink())
        .map_err(|_| invalid("truncated JPEG marker segment"))?;
    if skipped as usize != count {
        return Err(invalid("truncated JPEG marker segment"));
    }
    Ok(())
}
