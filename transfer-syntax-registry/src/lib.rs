#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]
//! This crate contains the DICOM pixel data codec registry.
//!
//! The codec registry maps a DICOM transfer syntax
//! into the codecs able to decode pixel data from it
//! or encode pixel data into it,
//! each registered together with
//! a default [representation parameter](dicom_codec::RepresentationParameter)
//! and a [codec parameter](dicom_codec::CodecParameter).
//!
//! The registry is safe to use from multiple threads.
//! Decoding and encoding calls run in parallel with each other,
//! whereas registration changes wait until all calls in flight are complete,
//! so that a codec is never removed while in use.
//!
//! A process wide registry is available via [`get_registry`],
//! with all codecs enabled through Cargo features already registered:
//!
//! - `jpegls` (default): [JPEG-LS](adapters::jpegls) lossless and near-lossless,
//!   through the CharLS bindings (`charls`).
//!   Enable `charls-vcpkg` to build CharLS with vcpkg.
//! - `rayon` (default): encode the frames of multi-frame images in parallel.
//!
//! # Example
//!
//! ```
//! # use dicom_codec_registry::{entries, get_registry};
//! let registry = get_registry();
//! # #[cfg(feature = "charls")]
//! assert!(registry.can_change_coding(
//!     &entries::EXPLICIT_VR_LITTLE_ENDIAN,
//!     &entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
//! ));
//! ```
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dicom_codec::codec::{Codec, CodecRole, DecodedFrame, DecodedImage, EncodeOutput, PixelDataObject};
use dicom_codec::error::{codec_error, Result};
use dicom_codec::params::{CodecParameter, NoRepresentationParameter, RepresentationParameter};
use dicom_codec::TransferSyntax;
use dicom_codec_core::value::InMemFragment;
use dicom_codec_core::PixelFragmentSequence;
use lazy_static::lazy_static;
use snafu::{ensure, OptionExt};
use tracing::debug;

pub mod adapters;
pub mod entries;
pub mod transcode;

pub use dicom_codec;
pub use transcode::change_transfer_syntax;

/// A codec registered with its parameters.
#[derive(Debug, Clone)]
struct Registration {
    codec: Arc<dyn Codec>,
    default_param: Arc<dyn RepresentationParameter>,
    codec_param: Arc<dyn CodecParameter>,
}

impl Registration {
    fn is(&self, codec: &Arc<dyn Codec>) -> bool {
        same_codec(&self.codec, codec)
    }

    fn supports(&self, ts: &TransferSyntax) -> bool {
        self.codec.transfer_syntax().matches_uid(ts.uid())
    }
}

fn same_codec(a: &Arc<dyn Codec>, b: &Arc<dyn Codec>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// A thread safe directory of pixel data codecs.
///
/// See the [crate level documentation](crate) for an overview.
#[derive(Debug, Default)]
pub struct CodecRegistry {
    registrations: RwLock<Vec<Registration>>,
}

impl CodecRegistry {
    /// Create an empty codec registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Registration>> {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Registration>> {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a codec,
    /// with the representation parameter to use when none is given
    /// and its codec parameter.
    ///
    /// Fails with [`DuplicateRegistration`](dicom_codec::CodecError::DuplicateRegistration)
    /// if another codec playing the same role
    /// for the same transfer syntax is already registered.
    /// A decoder and an encoder for the same transfer syntax
    /// may be registered separately.
    ///
    /// This call blocks until no other operation on the registry is in flight.
    pub fn register(
        &self,
        codec: Arc<dyn Codec>,
        default_param: Arc<dyn RepresentationParameter>,
        codec_param: Arc<dyn CodecParameter>,
    ) -> Result<()> {
        let mut registrations = self.write();
        let ts = *codec.transfer_syntax();
        let role = codec.role();
        ensure!(
            !registrations
                .iter()
                .any(|r| r.supports(&ts) && r.codec.role().overlaps(role)),
            codec_error::DuplicateRegistrationSnafu { uid: ts.uid() }
        );
        debug!("Registering {:?} codec for {}", role, ts);
        registrations.push(Registration {
            codec,
            default_param,
            codec_param,
        });
        Ok(())
    }

    /// Remove a registered codec.
    ///
    /// The codec is identified by reference,
    /// so the same `Arc` given to [`register`](Self::register)
    /// (or a clone of it) must be passed.
    /// Fails with [`NotFound`](dicom_codec::CodecError::NotFound)
    /// if the codec is not registered.
    ///
    /// This call blocks until all decoding and encoding calls in flight are complete.
    pub fn deregister(&self, codec: &Arc<dyn Codec>) -> Result<()> {
        let mut registrations = self.write();
        let index = registrations
            .iter()
            .position(|r| r.is(codec))
            .context(codec_error::NotFoundSnafu)?;
        let removed = registrations.remove(index);
        debug!(
            "Deregistered {:?} codec for {}",
            removed.codec.role(),
            removed.codec.transfer_syntax()
        );
        Ok(())
    }

    /// Remove all codecs of the given transfer syntax,
    /// returning how many were removed.
    pub fn deregister_transfer_syntax(&self, uid: &str) -> usize {
        let mut registrations = self.write();
        let before = registrations.len();
        registrations.retain(|r| !r.codec.transfer_syntax().matches_uid(uid));
        before - registrations.len()
    }

    /// Replace the codec parameter of a registered codec.
    ///
    /// Calls in flight keep using the previous parameter;
    /// calls made after this one returns see the new parameter.
    /// Fails with [`NotFound`](dicom_codec::CodecError::NotFound)
    /// if the codec is not registered.
    pub fn update_parameter(
        &self,
        codec: &Arc<dyn Codec>,
        codec_param: Arc<dyn CodecParameter>,
    ) -> Result<()> {
        let mut registrations = self.write();
        let registration = registrations
            .iter_mut()
            .find(|r| r.is(codec))
            .context(codec_error::NotFoundSnafu)?;
        registration.codec_param = codec_param;
        Ok(())
    }

    /// Obtain the codec parameter of a registered codec.
    pub fn codec_parameter(&self, codec: &Arc<dyn Codec>) -> Option<Arc<dyn CodecParameter>> {
        self.read()
            .iter()
            .find(|r| r.is(codec))
            .map(|r| Arc::clone(&r.codec_param))
    }

    /// Remove all registered codecs.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// The number of registered codecs.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Decode all frames of encapsulated pixel data.
    ///
    /// If `from_param` is `None`,
    /// the default representation parameter of the decoder is used.
    /// Fails with [`UnsupportedTransferSyntax`](dicom_codec::CodecError::UnsupportedTransferSyntax)
    /// if no decoder is registered for `from`.
    pub fn decode(
        &self,
        from: &TransferSyntax,
        from_param: Option<&dyn RepresentationParameter>,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        dataset: &dyn PixelDataObject,
    ) -> Result<DecodedImage> {
        let registrations = self.read();
        let r = find_decoder(&registrations, from)?;
        let from_param = from_param.unwrap_or(&*r.default_param);
        r.codec
            .decode(from_param, pixel_sequence, &*r.codec_param, dataset)
    }

    /// Decode a single frame of encapsulated pixel data into `buffer`.
    ///
    /// A `start_fragment` of 0 means that the first fragment of the frame
    /// is not known and must be determined by the codec,
    /// which is only reliable when frames are decoded in increasing order
    /// or the offset table is usable.
    /// The returned [`DecodedFrame`] holds the fragment to start from
    /// when decoding the next frame.
    #[allow(clippy::too_many_arguments)]
    pub fn decode_frame(
        &self,
        from: &TransferSyntax,
        from_param: Option<&dyn RepresentationParameter>,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        dataset: &dyn PixelDataObject,
        frame: u32,
        start_fragment: u32,
        buffer: &mut [u8],
    ) -> Result<DecodedFrame> {
        let registrations = self.read();
        let r = find_decoder(&registrations, from)?;
        let from_param = from_param.unwrap_or(&*r.default_param);
        r.codec.decode_frame(
            from_param,
            pixel_sequence,
            &*r.codec_param,
            dataset,
            frame,
            start_fragment,
            buffer,
        )
    }

    /// Encode native pixel data into the transfer syntax `to`.
    ///
    /// If `to_param` is `None`,
    /// the default representation parameter of the encoder is used.
    /// Fails with [`UnsupportedTransferSyntax`](dicom_codec::CodecError::UnsupportedTransferSyntax)
    /// if no encoder is registered for `to`,
    /// or with [`UnsupportedConversion`](dicom_codec::CodecError::UnsupportedConversion)
    /// if the encoder does not convert from `from`.
    pub fn encode(
        &self,
        from: &TransferSyntax,
        pixel_data: &[u8],
        to: &TransferSyntax,
        to_param: Option<&dyn RepresentationParameter>,
        dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput> {
        let registrations = self.read();
        let r = registrations
            .iter()
            .find(|r| r.supports(to) && r.codec.role().encodes())
            .context(codec_error::UnsupportedTransferSyntaxSnafu { uid: to.uid() })?;
        ensure!(
            r.codec.can_change_coding(from, to),
            codec_error::UnsupportedConversionSnafu {
                from: from.uid(),
                to: to.uid(),
            }
        );
        let to_param = to_param.unwrap_or(&*r.default_param);
        r.codec
            .encode(from, pixel_data, to_param, &*r.codec_param, dataset)
    }

    /// Convert encapsulated pixel data from one compressed representation
    /// into another one, without an intermediate dataset level decode.
    ///
    /// Fails like [`encode`](Self::encode),
    /// and with [`IllegalCall`](dicom_codec::CodecError::IllegalCall)
    /// if the codec found does not implement transcoding.
    pub fn transcode(
        &self,
        from: &TransferSyntax,
        from_param: Option<&dyn RepresentationParameter>,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        to: &TransferSyntax,
        to_param: Option<&dyn RepresentationParameter>,
        dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput> {
        let registrations = self.read();
        ensure!(
            registrations.iter().any(|r| r.supports(to)),
            codec_error::UnsupportedTransferSyntaxSnafu { uid: to.uid() }
        );
        let r = registrations
            .iter()
            .find(|r| r.supports(to) && r.codec.can_change_coding(from, to))
            .context(codec_error::UnsupportedConversionSnafu {
                from: from.uid(),
                to: to.uid(),
            })?;
        let from_param = from_param.unwrap_or(&NoRepresentationParameter);
        let to_param = to_param.unwrap_or(&*r.default_param);
        r.codec.transcode(
            from,
            from_param,
            pixel_sequence,
            to_param,
            &*r.codec_param,
            dataset,
        )
    }

    /// Check whether some registered codec
    /// converts pixel data from `from` to `to`.
    pub fn can_change_coding(&self, from: &TransferSyntax, to: &TransferSyntax) -> bool {
        self.read()
            .iter()
            .any(|r| r.codec.can_change_coding(from, to))
    }

    /// Determine the photometric interpretation
    /// which the pixel data will have once decoded.
    pub fn determine_decompressed_color_model(
        &self,
        from: &TransferSyntax,
        from_param: Option<&dyn RepresentationParameter>,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        dataset: &dyn PixelDataObject,
    ) -> Result<String> {
        let registrations = self.read();
        let r = find_decoder(&registrations, from)?;
        let from_param = from_param.unwrap_or(&*r.default_param);
        r.codec.determine_decompressed_color_model(
            from_param,
            pixel_sequence,
            &*r.codec_param,
            dataset,
        )
    }
}

fn find_decoder<'a>(
    registrations: &'a [Registration],
    from: &TransferSyntax,
) -> Result<&'a Registration> {
    registrations
        .iter()
        .find(|r| r.supports(from) && r.codec.role().decodes())
        .context(codec_error::UnsupportedTransferSyntaxSnafu { uid: from.uid() })
}

lazy_static! {
    static ref REGISTRY: CodecRegistry = initialize_codecs();
}

/// Retrieve the global codec registry.
///
/// On first use, the registry is populated
/// with the codecs enabled through Cargo features.
pub fn get_registry() -> &'static CodecRegistry {
    &REGISTRY
}

/// Remove all codecs from the global codec registry.
///
/// Blocks until all calls in flight are complete.
/// Codecs may be registered again afterwards.
pub fn shutdown() {
    debug!("Shutting down the codec registry");
    REGISTRY.clear();
}

fn initialize_codecs() -> CodecRegistry {
    let registry = CodecRegistry::new();

    #[cfg(feature = "charls")]
    {
        use crate::adapters::jpegls;
        if let Err(e) = jpegls::register_decoders(&registry, Default::default()) {
            tracing::warn!("Could not register JPEG-LS decoders: {}", e);
        }
        if let Err(e) = jpegls::register_encoders(&registry, Default::default()) {
            tracing::warn!("Could not register JPEG-LS encoders: {}", e);
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_codec::params::NoCodecParameter;
    use dicom_codec::CodecError;

    #[derive(Debug)]
    struct Dummy(TransferSyntax, CodecRole);

    impl Codec for Dummy {
        fn transfer_syntax(&self) -> &TransferSyntax {
            &self.0
        }

        fn role(&self) -> CodecRole {
            self.1
        }

        fn can_change_coding(&self, _from: &TransferSyntax, _to: &TransferSyntax) -> bool {
            false
        }

        fn decode(
            &self,
            _from_param: &dyn RepresentationParameter,
            _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
            _codec_param: &dyn CodecParameter,
            _dataset: &dyn PixelDataObject,
        ) -> Result<DecodedImage> {
            codec_error::IllegalCallSnafu { operation: "decode" }.fail()
        }

        fn decode_frame(
            &self,
            _from_param: &dyn RepresentationParameter,
            _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
            _codec_param: &dyn CodecParameter,
            _dataset: &dyn PixelDataObject,
            _frame: u32,
            _start_fragment: u32,
            _buffer: &mut [u8],
        ) -> Result<DecodedFrame> {
            codec_error::IllegalCallSnafu {
                operation: "decode_frame",
            }
            .fail()
        }

        fn encode(
            &self,
            _from: &TransferSyntax,
            _pixel_data: &[u8],
            _to_param: &dyn RepresentationParameter,
            _codec_param: &dyn CodecParameter,
            _dataset: &dyn PixelDataObject,
        ) -> Result<EncodeOutput> {
            codec_error::IllegalCallSnafu { operation: "encode" }.fail()
        }

        fn transcode(
            &self,
            _from: &TransferSyntax,
            _from_param: &dyn RepresentationParameter,
            _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
            _to_param: &dyn RepresentationParameter,
            _codec_param: &dyn CodecParameter,
            _dataset: &dyn PixelDataObject,
        ) -> Result<EncodeOutput> {
            codec_error::IllegalCallSnafu {
                operation: "transcode",
            }
            .fail()
        }

        fn determine_decompressed_color_model(
            &self,
            _from_param: &dyn RepresentationParameter,
            _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
            _codec_param: &dyn CodecParameter,
            _dataset: &dyn PixelDataObject,
        ) -> Result<String> {
            Ok("MONOCHROME2".to_string())
        }
    }

    fn register(registry: &CodecRegistry, codec: &Arc<dyn Codec>) -> Result<()> {
        registry.register(
            Arc::clone(codec),
            Arc::new(NoRepresentationParameter),
            Arc::new(NoCodecParameter),
        )
    }

    #[test]
    fn roles_of_the_same_transfer_syntax() {
        let registry = CodecRegistry::new();
        let ts = entries::RLE_LOSSLESS;
        let decoder: Arc<dyn Codec> = Arc::new(Dummy(ts, CodecRole::Decoder));
        let encoder: Arc<dyn Codec> = Arc::new(Dummy(ts, CodecRole::Encoder));
        let both: Arc<dyn Codec> = Arc::new(Dummy(ts, CodecRole::Both));

        register(&registry, &decoder).unwrap();
        register(&registry, &encoder).unwrap();
        assert!(matches!(
            register(&registry, &both),
            Err(CodecError::DuplicateRegistration { .. })
        ));
        assert_eq!(registry.len(), 2);

        registry.deregister(&decoder).unwrap();
        assert!(matches!(
            registry.deregister(&decoder),
            Err(CodecError::NotFound)
        ));
        assert_eq!(registry.deregister_transfer_syntax(ts.uid()), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_dispatches_to_decoder() {
        let registry = CodecRegistry::new();
        let ts = entries::RLE_LOSSLESS;
        let decoder: Arc<dyn Codec> = Arc::new(Dummy(ts, CodecRole::Decoder));
        register(&registry, &decoder).unwrap();

        let seq = PixelFragmentSequence::new_fragments(vec![vec![0; 4]]);
        let dataset = dicom_codec_core::InMemDataSet::new();
        assert_eq!(
            registry
                .determine_decompressed_color_model(&ts, None, &seq, &dataset)
                .unwrap(),
            "MONOCHROME2"
        );
        assert!(matches!(
            registry.determine_decompressed_color_model(
                &entries::JPEG_BASELINE,
                None,
                &seq,
                &dataset
            ),
            Err(CodecError::UnsupportedTransferSyntax { .. })
        ));
    }
}
