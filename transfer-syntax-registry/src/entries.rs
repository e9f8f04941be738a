//! A list of known transfer syntax specifiers.
//!
//! - **Fully implemented** means that the default codec registry
//!   provides built-in support for encoding and decoding pixel data
//!   in this transfer syntax.
//!   For native transfer syntaxes, no codec is needed.
//! - **Stub descriptors** serve to provide information about
//!   the transfer syntax,
//!   but no codec for them is registered by default.
//!   Codecs for these transfer syntaxes
//!   may be registered by independently developed crates.

use byteordered::Endianness;
use dicom_codec::TransferSyntax as Ts;

// -- the three base transfer syntaxes, fully supported --

/// **Fully implemented:** Implicit VR Little Endian: Default Transfer Syntax for DICOM
pub const IMPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new_native(
    "1.2.840.10008.1.2",
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
);

/// **Fully implemented:** Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new_native(
    "1.2.840.10008.1.2.1",
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
);

/// **Fully implemented:** Explicit VR Big Endian
pub const EXPLICIT_VR_BIG_ENDIAN: Ts = Ts::new_native(
    "1.2.840.10008.1.2.2",
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
);

// -- JPEG-LS, fully supported with the `jpegls` feature --

/// **Fully implemented:** JPEG-LS Lossless Image Compression
pub const JPEG_LS_LOSSLESS_IMAGE_COMPRESSION: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.80",
    "JPEG-LS Lossless Image Compression",
    false,
);

/// **Fully implemented:** JPEG-LS Lossy (Near-Lossless) Image Compression
pub const JPEG_LS_LOSSY_IMAGE_COMPRESSION: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.81",
    "JPEG-LS Lossy (Near-Lossless) Image Compression",
    true,
);

// -- stub transfer syntaxes, known but without a built-in codec --

/// **Stub descriptor:** RLE Lossless
pub const RLE_LOSSLESS: Ts = Ts::new_encapsulated("1.2.840.10008.1.2.5", "RLE Lossless", false);

/// **Stub descriptor:** JPEG Baseline (Process 1):
/// Default Transfer Syntax for Lossy JPEG 8-bit Image Compression
pub const JPEG_BASELINE: Ts =
    Ts::new_encapsulated("1.2.840.10008.1.2.4.50", "JPEG Baseline (Process 1)", true);

/// **Stub descriptor:** JPEG Extended (Process 2 & 4)
pub const JPEG_EXTENDED: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.51",
    "JPEG Extended (Process 2 & 4)",
    true,
);

/// **Stub descriptor:** JPEG Lossless, Non-Hierarchical (Process 14)
pub const JPEG_LOSSLESS_NON_HIERARCHICAL: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.57",
    "JPEG Lossless, Non-Hierarchical (Process 14)",
    false,
);

/// **Stub descriptor:** JPEG Lossless, Non-Hierarchical, First-Order Prediction
/// (Process 14 [Selection Value 1]):
/// Default Transfer Syntax for Lossless JPEG Image Compression
pub const JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.70",
    "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
    false,
);

/// **Stub descriptor:** JPEG 2000 Image Compression (Lossless Only)
pub const JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.90",
    "JPEG 2000 Image Compression (Lossless Only)",
    false,
);

/// **Stub descriptor:** JPEG 2000 Image Compression
pub const JPEG_2000_IMAGE_COMPRESSION: Ts = Ts::new_encapsulated(
    "1.2.840.10008.1.2.4.91",
    "JPEG 2000 Image Compression",
    true,
);

/// All transfer syntaxes known to this crate.
static KNOWN: [Ts; 12] = [
    IMPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_BIG_ENDIAN,
    JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
    JPEG_LS_LOSSY_IMAGE_COMPRESSION,
    RLE_LOSSLESS,
    JPEG_BASELINE,
    JPEG_EXTENDED,
    JPEG_LOSSLESS_NON_HIERARCHICAL,
    JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION,
    JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY,
    JPEG_2000_IMAGE_COMPRESSION,
];

/// Obtain a transfer syntax specifier by UID.
///
/// A trailing null character, as found in padded UID values, is ignored.
pub fn get(uid: &str) -> Option<&'static Ts> {
    let uid = uid.strip_suffix('\0').unwrap_or(uid);
    KNOWN.iter().find(|ts| ts.uid() == uid)
}

/// Retrieve the default transfer syntax.
pub fn default() -> Ts {
    IMPLICIT_VR_LITTLE_ENDIAN
}
