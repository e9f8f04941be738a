//! Parameter objects of the JPEG-LS codecs.
use dicom_codec::params::{CodecParameter, RepresentationParameter};
use dicom_codec::encapsulation::BitstreamPadding;

/// The near-lossless deviation used when none is specified.
pub const DEFAULT_NEAR: u16 = 2;

/// Representation parameter of the JPEG-LS transfer syntaxes.
///
/// The default requests the lossless process,
/// with a deviation of [`DEFAULT_NEAR`] should the near-lossless process be chosen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegLsRepresentationParameter {
    near: u16,
    lossless_process: bool,
}

impl Default for JpegLsRepresentationParameter {
    fn default() -> Self {
        JpegLsRepresentationParameter {
            near: DEFAULT_NEAR,
            lossless_process: true,
        }
    }
}

impl JpegLsRepresentationParameter {
    /// Create a representation parameter.
    pub fn new(near: u16, lossless_process: bool) -> Self {
        JpegLsRepresentationParameter {
            near,
            lossless_process,
        }
    }

    /// The lossless process.
    pub fn lossless() -> Self {
        Self::new(0, true)
    }

    /// The near-lossless process with the given maximum deviation.
    pub fn near_lossless(near: u16) -> Self {
        Self::new(near, false)
    }

    /// The maximum deviation of each sample in the near-lossless process.
    pub fn near(&self) -> u16 {
        self.near
    }

    /// Whether the lossless process is requested,
    /// even under the near-lossless transfer syntax.
    pub fn use_lossless_process(&self) -> bool {
        self.lossless_process
    }
}

impl RepresentationParameter for JpegLsRepresentationParameter {
    fn is_lossless(&self) -> bool {
        self.lossless_process
    }
}

/// When to assign a new SOP Instance UID to the data set.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UidCreation {
    /// Only when the compression is lossy.
    #[default]
    Default,
    /// Always, including when decoding.
    Always,
    /// Never, unless converting to secondary capture.
    Never,
}

/// How the planar configuration of decoded color images is chosen.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PlanarConfigurationPolicy {
    /// Keep the value declared in the data set,
    /// or choose automatically if it is missing or invalid.
    #[default]
    Restore,
    /// Choose from the SOP class and photometric interpretation.
    Auto,
    /// Always decode color-by-pixel.
    ColorByPixel,
    /// Always decode color-by-plane.
    ColorByPlane,
}

/// Configuration of the JPEG-LS decoder and encoder.
///
/// A `Default` parameter yields lossless encoding
/// with one fragment per frame and a basic offset table.
/// The coding thresholds and the interleave mode of color images
/// are left to CharLS, which derives them from the sample precision
/// and the near-lossless deviation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct JpegLsCodecParameter {
    /// Maximum fragment size in kibibytes, 0 for unlimited.
    pub fragment_size: u32,
    /// Whether to write a basic offset table.
    pub create_offset_table: bool,
    /// When to assign a new SOP Instance UID.
    pub uid_creation: UidCreation,
    /// Whether to convert the instance to Secondary Capture Image Storage.
    pub convert_to_secondary_capture: bool,
    /// Planar configuration of decoded color images.
    pub planar_configuration: PlanarConfigurationPolicy,
    /// Whether to disregard the basic offset table when decoding.
    pub ignore_offset_table: bool,
    /// Whether lossless encoding should always render the stored pixel values
    /// rather than compress the pixel cells as they are.
    pub prefer_cooked: bool,
    /// How compressed frames of odd length are padded.
    pub padding: BitstreamPadding,
    /// Assume that every frame is held in exactly one fragment
    /// and tolerate frames which fail to decode.
    pub force_single_fragment_per_frame: bool,
}

impl Default for JpegLsCodecParameter {
    fn default() -> Self {
        JpegLsCodecParameter {
            fragment_size: 0,
            create_offset_table: true,
            uid_creation: UidCreation::Default,
            convert_to_secondary_capture: false,
            planar_configuration: PlanarConfigurationPolicy::Restore,
            ignore_offset_table: false,
            prefer_cooked: false,
            padding: BitstreamPadding::ExtendedEoi,
            force_single_fragment_per_frame: false,
        }
    }
}

impl JpegLsCodecParameter {
    /// Set the maximum fragment size in kibibytes.
    pub fn with_fragment_size(mut self, fragment_size: u32) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    /// Set the UID creation policy.
    pub fn with_uid_creation(mut self, uid_creation: UidCreation) -> Self {
        self.uid_creation = uid_creation;
        self
    }

    /// Set the planar configuration policy of decoded images.
    pub fn with_planar_configuration(mut self, policy: PlanarConfigurationPolicy) -> Self {
        self.planar_configuration = policy;
        self
    }

    /// Set the bitstream padding policy.
    pub fn with_padding(mut self, padding: BitstreamPadding) -> Self {
        self.padding = padding;
        self
    }
}

impl CodecParameter for JpegLsCodecParameter {}
