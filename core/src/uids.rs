//! Unique identifiers of the transfer syntaxes and SOP classes
//! known to the pixel data codecs.

/// Transfer Syntax: Implicit VR Little Endian: Default Transfer Syntax for DICOM
#[rustfmt::skip]
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
/// Transfer Syntax: Explicit VR Little Endian
#[rustfmt::skip]
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
/// Transfer Syntax: Explicit VR Big Endian (Retired)
#[rustfmt::skip]
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
/// Transfer Syntax: JPEG-LS Lossless Image Compression
#[rustfmt::skip]
pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";
/// Transfer Syntax: JPEG-LS Lossy (Near-Lossless) Image Compression
#[rustfmt::skip]
pub const JPEG_LS_NEAR_LOSSLESS: &str = "1.2.840.10008.1.2.4.81";

/// SOP Class: Hardcopy Color Image Storage SOP Class (Retired)
#[rustfmt::skip]
pub const HARDCOPY_COLOR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.1.30";
/// SOP Class: Ultrasound Multi-frame Image Storage
#[rustfmt::skip]
pub const ULTRASOUND_MULTI_FRAME_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.3.1";
/// SOP Class: Ultrasound Image Storage
#[rustfmt::skip]
pub const ULTRASOUND_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.6.1";
/// SOP Class: Secondary Capture Image Storage
#[rustfmt::skip]
pub const SECONDARY_CAPTURE_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.7";

/// Root of UUID-derived unique identifiers (ISO/IEC 9834-8)
#[rustfmt::skip]
pub const UUID_ROOT: &str = "2.25";
