//! Changing the transfer syntax of the pixel data in a data set.
//!
//! This is the data set level entry point into the codec registry:
//! it picks the registry operation to use
//! for the given pair of transfer syntaxes,
//! replaces the pixel data
//! and applies the attribute operations requested by the codec.
use dicom_codec::codec::{DecodedImage, EncodeOutput};
use dicom_codec::error::{codec_error, CodecError, Result};
use dicom_codec::params::RepresentationParameter;
use dicom_codec::pixel::normalize_byte_order;
use dicom_codec::TransferSyntax;
use dicom_codec_core::ops::{ApplyOp, AttributeOp};
use dicom_codec_core::{tags, InMemDataSet, PrimitiveValue};
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info};

use crate::{entries, CodecRegistry};

/// Convert the pixel data of `dataset` from transfer syntax `from` to `to`,
/// updating the remaining attributes accordingly.
///
/// - Native to encapsulated pixel data is [encoded](CodecRegistry::encode).
/// - Encapsulated to native pixel data is [decoded](CodecRegistry::decode).
/// - Between two encapsulated transfer syntaxes,
///   [transcoding](CodecRegistry::transcode) is attempted first.
///   If no codec transcodes directly,
///   the pixel data is decoded into _Explicit VR Little Endian_
///   and then encoded.
/// - Between two native transfer syntaxes,
///   only the byte order of the pixel cells may change.
///
/// `to_param` selects the target representation,
/// or the default one of the target codec if `None`.
pub fn change_transfer_syntax(
    registry: &CodecRegistry,
    dataset: &mut InMemDataSet,
    from: &TransferSyntax,
    to: &TransferSyntax,
    to_param: Option<&dyn RepresentationParameter>,
) -> Result<()> {
    if from.uid() == to.uid() {
        return Ok(());
    }
    info!("Changing transfer syntax from {} to {}", from, to);

    match (from.is_encapsulated(), to.is_encapsulated()) {
        (false, false) => change_byte_order(dataset, from, to),
        (false, true) => encode(registry, dataset, from, to, to_param),
        (true, false) => decode(registry, dataset, from, to),
        (true, true) => {
            let pixel_sequence = dataset
                .pixel_sequence()
                .context(codec_error::NotEncapsulatedSnafu)?;
            match registry.transcode(from, None, pixel_sequence, to, to_param, &*dataset) {
                Ok(output) => replace_encapsulated(dataset, output),
                Err(CodecError::UnsupportedConversion { .. })
                | Err(CodecError::IllegalCall { .. }) => {
                    debug!("No direct transcoding, decoding first");
                    let native = entries::EXPLICIT_VR_LITTLE_ENDIAN;
                    decode(registry, dataset, from, &native)?;
                    encode(registry, dataset, &native, to, to_param)
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn apply_ops(dataset: &mut InMemDataSet, ops: Vec<AttributeOp>) -> Result<()> {
    dataset
        .apply_all(ops)
        .whatever_context("Could not update the data set")
}

fn native_pixel_data(dataset: &InMemDataSet) -> Result<&[u8]> {
    let value = dataset
        .primitive(tags::PIXEL_DATA)
        .context(codec_error::MissingAttributeSnafu { name: "PixelData" })?;
    value.as_bytes().context(codec_error::NotNativeSnafu)
}

fn encode(
    registry: &CodecRegistry,
    dataset: &mut InMemDataSet,
    from: &TransferSyntax,
    to: &TransferSyntax,
    to_param: Option<&dyn RepresentationParameter>,
) -> Result<()> {
    let output = {
        let pixel_data = native_pixel_data(dataset)?;
        registry.encode(from, pixel_data, to, to_param, &*dataset)?
    };
    replace_encapsulated(dataset, output)
}

fn replace_encapsulated(dataset: &mut InMemDataSet, output: EncodeOutput) -> Result<()> {
    let EncodeOutput {
        pixel_sequence,
        ops,
        remove_old_representation,
    } = output;
    if remove_old_representation {
        dataset.remove(tags::PIXEL_DATA);
    }
    apply_ops(dataset, ops)?;
    dataset.put(tags::PIXEL_DATA, pixel_sequence);
    Ok(())
}

fn decode(
    registry: &CodecRegistry,
    dataset: &mut InMemDataSet,
    from: &TransferSyntax,
    to: &TransferSyntax,
) -> Result<()> {
    let DecodedImage {
        mut pixels,
        photometric_interpretation,
        ops,
        ..
    } = {
        let pixel_sequence = dataset
            .pixel_sequence()
            .context(codec_error::NotEncapsulatedSnafu)?;
        registry.decode(from, None, pixel_sequence, &*dataset)?
    };

    let bits_allocated = dataset.int::<u16>(tags::BITS_ALLOCATED).unwrap_or(8);
    normalize_byte_order(&mut pixels, to.endianness(), bits_allocated);

    dataset.remove(tags::PIXEL_DATA);
    apply_ops(dataset, ops)?;
    dataset.put(
        tags::PHOTOMETRIC_INTERPRETATION,
        PrimitiveValue::from(photometric_interpretation),
    );
    dataset.put(tags::PIXEL_DATA, PrimitiveValue::from(pixels));
    Ok(())
}

fn change_byte_order(
    dataset: &mut InMemDataSet,
    from: &TransferSyntax,
    to: &TransferSyntax,
) -> Result<()> {
    if from.endianness() == to.endianness() {
        return Ok(());
    }
    let bits_allocated = dataset
        .int::<u16>(tags::BITS_ALLOCATED)
        .context(codec_error::MissingAttributeSnafu {
            name: "BitsAllocated",
        })?;
    let mut pixels = native_pixel_data(dataset)?.to_vec();
    // reversing the bytes of each cell works in both directions
    normalize_byte_order(&mut pixels, byteordered::Endianness::Big, bits_allocated);
    dataset.put(tags::PIXEL_DATA, PrimitiveValue::from(pixels));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_byte_order_is_swapped() {
        let registry = CodecRegistry::new();
        let mut dataset = InMemDataSet::from_element_iter([
            (tags::BITS_ALLOCATED, PrimitiveValue::from(16_u16)),
            (tags::PIXEL_DATA, PrimitiveValue::from(vec![1_u8, 2, 3, 4])),
        ]);
        change_transfer_syntax(
            &registry,
            &mut dataset,
            &entries::EXPLICIT_VR_LITTLE_ENDIAN,
            &entries::EXPLICIT_VR_BIG_ENDIAN,
            None,
        )
        .unwrap();
        assert_eq!(
            native_pixel_data(&dataset).unwrap(),
            &[2, 1, 4, 3]
        );

        // same byte order, nothing to do
        change_transfer_syntax(
            &registry,
            &mut dataset,
            &entries::IMPLICIT_VR_LITTLE_ENDIAN,
            &entries::EXPLICIT_VR_LITTLE_ENDIAN,
            None,
        )
        .unwrap();
        assert_eq!(
            native_pixel_data(&dataset).unwrap(),
            &[2, 1, 4, 3]
        );
    }

    #[test]
    fn no_codec_for_target() {
        let registry = CodecRegistry::new();
        let mut dataset = InMemDataSet::from_element_iter([(
            tags::PIXEL_DATA,
            PrimitiveValue::from(vec![0_u8; 4]),
        )]);
        let err = change_transfer_syntax(
            &registry,
            &mut dataset,
            &entries::EXPLICIT_VR_LITTLE_ENDIAN,
            &entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedTransferSyntax { .. }));
    }
}
