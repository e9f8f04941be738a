//! Error type of pixel data codecs and the codec registry.
use snafu::Snafu;

/// A boxed error, used as the source of errors
/// coming from the underlying bitstream libraries.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The possible error conditions when decoding, encoding
/// or transcoding pixel data through a codec.
///
/// Users of this type are free to handle errors based on their variant,
/// but should not make decisions based on the display message,
/// since that is not considered part of the API
/// and may change on any new release.
///
/// Implementers of codecs
/// are recommended to choose the most fitting error variant
/// for the tested condition.
/// When no suitable variant is available,
/// the [`Custom`](CodecError::Custom) variant may be used.
/// See also [`snafu`] for guidance on using context selectors.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum CodecError {
    /// A custom error occurred in the codec,
    /// reported as a dynamic error value with a message.
    ///
    /// The [`whatever!`](snafu::whatever) macro can be used
    /// to easily create an error of this kind.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(BoxedError, Some)))]
        source: Option<BoxedError>,
    },

    /// No codec is registered for the transfer syntax.
    #[snafu(display("No codec registered for transfer syntax {uid}"))]
    UnsupportedTransferSyntax {
        /// the transfer syntax UID
        uid: String,
    },

    /// The codec registered for the transfer syntax
    /// refuses this conversion.
    #[snafu(display("Conversion from {from} to {to} is not supported"))]
    UnsupportedConversion {
        /// the source transfer syntax UID
        from: String,
        /// the target transfer syntax UID
        to: String,
    },

    /// Another codec with the same transfer syntax and role
    /// is already registered.
    #[snafu(display("A codec for transfer syntax {uid} is already registered"))]
    DuplicateRegistration {
        /// the transfer syntax UID
        uid: String,
    },

    /// The codec is not registered.
    #[snafu(display("Codec not found in the registry"))]
    NotFound,

    /// The operation is not implemented by this codec,
    /// such as decoding with an encoder.
    #[snafu(display("Illegal call to `{operation}`"))]
    IllegalCall {
        /// the name of the operation
        operation: &'static str,
    },

    /// A parameter object of an unexpected type was given to the codec.
    #[snafu(display("Illegal {kind} parameter given to the codec"))]
    IllegalParameter {
        /// the kind of parameter (representation or codec)
        kind: &'static str,
    },

    /// A required attribute is missing
    /// from the DICOM object representing the image.
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingAttribute {
        /// the attribute keyword
        name: &'static str,
    },

    /// The image geometry is not supported by the codec.
    #[snafu(display("Unsupported image geometry: {reason}"))]
    UnsupportedGeometry {
        /// a short description of the offending property
        reason: String,
    },

    /// The bit depth of the image is outside of the supported range.
    #[snafu(display("Unsupported bit depth {bits}"))]
    UnsupportedBitDepth {
        /// the number of bits per sample
        bits: u16,
    },

    /// Signed samples are not supported in this mode.
    #[snafu(display("Unsupported pixel representation"))]
    UnsupportedPixelRepresentation,

    /// The photometric interpretation is not supported in this mode.
    #[snafu(display("Unsupported photometric interpretation `{pi}`"))]
    UnsupportedPhotometricInterpretation {
        /// the photometric interpretation
        pi: String,
    },

    /// The image cannot be handled by any of the codec's strategies.
    #[snafu(display("Unsupported type of image"))]
    UnsupportedImageType,

    /// The compressed bitstream is malformed.
    #[snafu(display("Invalid compressed data"))]
    InvalidCompressedData {
        /// the error reported by the bitstream decoder
        source: BoxedError,
    },

    /// The decoded bitstream does not match the image attributes.
    #[snafu(display("Image data mismatch: {reason}"))]
    ImageDataMismatch {
        /// a short description of the mismatching property
        reason: String,
    },

    /// The fragments belonging to the frame could not be determined.
    #[snafu(display("Cannot determine the fragments of frame #{frame}"))]
    CannotDetermineFragmentCount {
        /// the frame index
        frame: u32,
    },

    /// The given buffer cannot hold the data.
    #[snafu(display("Buffer too small: {required} bytes required, {available} available"))]
    BufferTooSmall {
        /// the number of bytes required
        required: usize,
        /// the number of bytes available
        available: usize,
    },

    /// Memory for the pixel data could not be allocated.
    #[snafu(display("Could not allocate {size} bytes"))]
    MemoryExhausted {
        /// the requested size in bytes
        size: usize,
    },

    /// The requested frame is outside the object's frame range.
    #[snafu(display("Frame #{frame} is out of bounds"))]
    FrameRangeOutOfBounds {
        /// the frame index
        frame: u32,
    },

    /// The input pixel data is not encapsulated.
    NotEncapsulated,

    /// The input pixel data is encapsulated, but native pixel data is required.
    NotNative,
}

impl CodecError {
    /// Whether this error reports a malformed or inconsistent bitstream,
    /// which may be tolerated when decoding fragments leniently.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidCompressedData { .. } | CodecError::ImageDataMismatch { .. }
        )
    }
}

/// The result of a codec operation.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;
