//! Constants of the DICOM attributes read or written by pixel data codecs.
//!
//! Overlay plane attributes are declared in the first repeating group (6000);
//! use [`Tag::with_group`] to address the other overlay planes.
use crate::header::Tag;

/// Image Type (0008,0008) CS 2-n General Image
#[rustfmt::skip]
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
/// SOP Class UID (0008,0016) UI 1 SOP Common
#[rustfmt::skip]
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
/// SOP Instance UID (0008,0018) UI 1 SOP Common
#[rustfmt::skip]
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
/// Conversion Type (0008,0064) CS 1 SC Equipment
#[rustfmt::skip]
pub const CONVERSION_TYPE: Tag = Tag(0x0008, 0x0064);
/// Referenced SOP Class UID (0008,1150) UI 1 Image Reference
#[rustfmt::skip]
pub const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
/// Referenced SOP Instance UID (0008,1155) UI 1 Image Reference
#[rustfmt::skip]
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
/// Derivation Description (0008,2111) ST 1 General Image
#[rustfmt::skip]
pub const DERIVATION_DESCRIPTION: Tag = Tag(0x0008, 0x2111);
/// Source Image Sequence (0008,2112) SQ 1 General Image
#[rustfmt::skip]
pub const SOURCE_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x2112);
/// Code Value (0008,0100) SH 1 Code Sequence Macro
#[rustfmt::skip]
pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
/// Coding Scheme Designator (0008,0102) SH 1 Code Sequence Macro
#[rustfmt::skip]
pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
/// Code Meaning (0008,0104) LO 1 Code Sequence Macro
#[rustfmt::skip]
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
/// Derivation Code Sequence (0008,9215) SQ 1 General Image
#[rustfmt::skip]
pub const DERIVATION_CODE_SEQUENCE: Tag = Tag(0x0008, 0x9215);
/// Samples per Pixel (0028,0002) US 1 Image Pixel
#[rustfmt::skip]
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// Photometric Interpretation (0028,0004) CS 1 Image Pixel
#[rustfmt::skip]
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// Planar Configuration (0028,0006) US 1 Image Pixel
#[rustfmt::skip]
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
/// Number of Frames (0028,0008) IS 1 Multi-frame
#[rustfmt::skip]
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// Rows (0028,0010) US 1 Image Pixel
#[rustfmt::skip]
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011) US 1 Image Pixel
#[rustfmt::skip]
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// Bits Allocated (0028,0100) US 1 Image Pixel
#[rustfmt::skip]
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// Bits Stored (0028,0101) US 1 Image Pixel
#[rustfmt::skip]
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// High Bit (0028,0102) US 1 Image Pixel
#[rustfmt::skip]
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
/// Pixel Representation (0028,0103) US 1 Image Pixel
#[rustfmt::skip]
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
/// Lossy Image Compression (0028,2110) CS 1 General Image
#[rustfmt::skip]
pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);
/// Lossy Image Compression Ratio (0028,2112) DS 1-n General Image
#[rustfmt::skip]
pub const LOSSY_IMAGE_COMPRESSION_RATIO: Tag = Tag(0x0028, 0x2112);
/// Lossy Image Compression Method (0028,2114) CS 1-n General Image
#[rustfmt::skip]
pub const LOSSY_IMAGE_COMPRESSION_METHOD: Tag = Tag(0x0028, 0x2114);
/// Purpose of Reference Code Sequence (0040,A170) SQ 1 Image Reference
#[rustfmt::skip]
pub const PURPOSE_OF_REFERENCE_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA170);
/// Overlay Rows (6000,0010) US 1 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_ROWS: Tag = Tag(0x6000, 0x0010);
/// Overlay Columns (6000,0011) US 1 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_COLUMNS: Tag = Tag(0x6000, 0x0011);
/// Number of Frames in Overlay (6000,0015) IS 1 Multi-frame Overlay, repeating group 6000-601E
#[rustfmt::skip]
pub const NUMBER_OF_FRAMES_IN_OVERLAY: Tag = Tag(0x6000, 0x0015);
/// Overlay Origin (6000,0050) SS 2 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_ORIGIN: Tag = Tag(0x6000, 0x0050);
/// Image Frame Origin (6000,0051) US 1 Multi-frame Overlay, repeating group 6000-601E
#[rustfmt::skip]
pub const IMAGE_FRAME_ORIGIN: Tag = Tag(0x6000, 0x0051);
/// Overlay Bits Allocated (6000,0100) US 1 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_BITS_ALLOCATED: Tag = Tag(0x6000, 0x0100);
/// Overlay Bit Position (6000,0102) US 1 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_BIT_POSITION: Tag = Tag(0x6000, 0x0102);
/// Overlay Data (6000,3000) OB or OW 1 Overlay Plane, repeating group 6000-601E
#[rustfmt::skip]
pub const OVERLAY_DATA: Tag = Tag(0x6000, 0x3000);
/// Pixel Data (7FE0,0010) OB or OW 1 Image Pixel
#[rustfmt::skip]
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
