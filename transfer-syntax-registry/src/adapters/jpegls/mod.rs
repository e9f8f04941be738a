//! Support for JPEG-LS image decoding and encoding,
//! through the [CharLS](https://github.com/team-charls/charls) bindings.
//!
//! Two transfer syntaxes are covered:
//! _JPEG-LS Lossless Image Compression_ (1.2.840.10008.1.2.4.80)
//! and _JPEG-LS Lossy (Near-Lossless) Image Compression_ (1.2.840.10008.1.2.4.81).
//! Each of them has its own [decoder](JpegLsDecoder) and [encoder](JpegLsEncoder),
//! which are registered separately.
//!
//! # Example
//!
//! ```
//! use dicom_codec_registry::CodecRegistry;
//! use dicom_codec_registry::adapters::jpegls::{self, JpegLsCodecParameter};
//!
//! let registry = CodecRegistry::new();
//! jpegls::register_decoders(&registry, JpegLsCodecParameter::default())?;
//! jpegls::register_encoders(&registry, JpegLsCodecParameter::default())?;
//! assert_eq!(registry.len(), 4);
//! assert_eq!(jpegls::cleanup(&registry), 4);
//! # Ok::<(), dicom_codec::CodecError>(())
//! ```
use std::sync::Arc;

use dicom_codec::error::{codec_error, Result};
use dicom_codec::params::{downcast_codec, downcast_representation, CodecParameter, RepresentationParameter};
use snafu::OptionExt;

use crate::{entries, CodecRegistry};

pub mod decoder;
pub mod encoder;
pub mod params;
mod stream;

pub use self::decoder::JpegLsDecoder;
pub use self::encoder::JpegLsEncoder;
pub use self::params::{
    JpegLsCodecParameter, JpegLsRepresentationParameter, PlanarConfigurationPolicy, UidCreation,
};

/// Obtain the JPEG-LS codec parameter from a type-erased one.
pub(crate) fn codec_parameter(param: &dyn CodecParameter) -> Result<&JpegLsCodecParameter> {
    downcast_codec::<JpegLsCodecParameter>(param)
        .context(codec_error::IllegalParameterSnafu { kind: "codec" })
}

/// Obtain the JPEG-LS representation parameter from a type-erased one.
pub(crate) fn representation_parameter(
    param: &dyn RepresentationParameter,
) -> Result<&JpegLsRepresentationParameter> {
    downcast_representation::<JpegLsRepresentationParameter>(param)
        .context(codec_error::IllegalParameterSnafu {
            kind: "representation",
        })
}

/// Register the JPEG-LS decoders of both transfer syntaxes.
pub fn register_decoders(registry: &CodecRegistry, param: JpegLsCodecParameter) -> Result<()> {
    let param: Arc<dyn CodecParameter> = Arc::new(param);
    registry.register(
        Arc::new(JpegLsDecoder::lossless()),
        Arc::new(JpegLsRepresentationParameter::lossless()),
        Arc::clone(&param),
    )?;
    registry.register(
        Arc::new(JpegLsDecoder::near_lossless()),
        Arc::new(JpegLsRepresentationParameter::default()),
        param,
    )
}

/// Register the JPEG-LS encoders of both transfer syntaxes.
///
/// The near-lossless encoder defaults to a deviation of [`params::DEFAULT_NEAR`].
pub fn register_encoders(registry: &CodecRegistry, param: JpegLsCodecParameter) -> Result<()> {
    let param: Arc<dyn CodecParameter> = Arc::new(param);
    registry.register(
        Arc::new(JpegLsEncoder::lossless()),
        Arc::new(JpegLsRepresentationParameter::lossless()),
        Arc::clone(&param),
    )?;
    registry.register(
        Arc::new(JpegLsEncoder::near_lossless()),
        Arc::new(JpegLsRepresentationParameter::near_lossless(
            params::DEFAULT_NEAR,
        )),
        param,
    )
}

/// Remove all JPEG-LS codecs from the registry,
/// returning the number of registrations removed.
pub fn cleanup(registry: &CodecRegistry) -> usize {
    registry.deregister_transfer_syntax(entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION.uid())
        + registry.deregister_transfer_syntax(entries::JPEG_LS_LOSSY_IMAGE_COMPRESSION.uid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_codec::params::NoCodecParameter;
    use dicom_codec::CodecError;

    #[test]
    fn foreign_parameters_are_rejected() {
        let err = codec_parameter(&NoCodecParameter).unwrap_err();
        assert!(matches!(err, CodecError::IllegalParameter { kind: "codec" }));
        assert!(codec_parameter(&JpegLsCodecParameter::default()).is_ok());
    }
}
