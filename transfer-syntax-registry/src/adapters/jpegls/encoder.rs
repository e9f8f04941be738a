//! JPEG-LS encoder.
//!
//! Two strategies are available.
//! The _raw_ strategy compresses the pixel cells as they are,
//! with a sample precision equal to _Bits Allocated_,
//! and only supports 8 or 16 bits allocated.
//! The _cooked_ strategy first renders the stored pixel values,
//! moving embedded overlays out of the pixel cells,
//! and is the only one used for near-lossless compression.
//! Each strategy falls back to the other one
//! for some of the images which it cannot handle.
use charls::{CharLS, FrameInfo};
use dicom_codec::codec::{Codec, CodecRole, DecodedFrame, DecodedImage, EncodeOutput, PixelDataObject};
use dicom_codec::encapsulation::{pad_bitstream, EncapsulatedPixelDataBuilder};
use dicom_codec::error::{codec_error, Result};
use dicom_codec::params::{CodecParameter, RepresentationParameter};
use dicom_codec::pixel::{normalize_byte_order, samples_to_bytes, swap_words, to_color_by_pixel, to_color_by_plane};
use dicom_codec::render::{extract_embedded_overlays, render_stored_values, PixelLayout};
use dicom_codec::{uid, TransferSyntax};
use dicom_codec_core::ops::{AttributeAction, AttributeOp};
use dicom_codec_core::value::InMemFragment;
use dicom_codec_core::{tags, uids, InMemDataSet, PixelFragmentSequence, PrimitiveValue};
use snafu::{ensure, OptionExt, ResultExt};
use tracing::{debug, info};

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use super::params::{JpegLsCodecParameter, UidCreation};
use super::stream::read_stream_info;
use super::{codec_parameter, representation_parameter};
use crate::entries;

/// The photometric interpretations supported by the cooked strategy.
const COOKED_PHOTOMETRIC_INTERPRETATIONS: [&str; 4] =
    ["MONOCHROME1", "MONOCHROME2", "RGB", "YBR_FULL"];

/// Derivation Description is of VR ST.
const MAX_DERIVATION_DESCRIPTION_LENGTH: usize = 1024;

/// Encoder of pixel data into a JPEG-LS transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegLsEncoder {
    transfer_syntax: TransferSyntax,
}

impl JpegLsEncoder {
    /// Create an encoder for the given transfer syntax.
    pub const fn new(transfer_syntax: TransferSyntax) -> Self {
        JpegLsEncoder { transfer_syntax }
    }

    /// The encoder of _JPEG-LS Lossless Image Compression_.
    pub const fn lossless() -> Self {
        Self::new(entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION)
    }

    /// The encoder of _JPEG-LS Lossy (Near-Lossless) Image Compression_.
    pub const fn near_lossless() -> Self {
        Self::new(entries::JPEG_LS_LOSSY_IMAGE_COMPRESSION)
    }
}

/// The outcome of one of the encoding strategies.
#[derive(Debug)]
struct Compressed {
    pixel_sequence: PixelFragmentSequence<InMemFragment>,
    /// uncompressed size in bytes, ignoring padding bits
    uncompressed_size: f64,
    /// sum of the compressed frame sizes, before padding
    compressed_size: usize,
    ops: Vec<AttributeOp>,
}

impl Compressed {
    fn compression_ratio(&self) -> f64 {
        if self.compressed_size > 0 {
            self.uncompressed_size / self.compressed_size as f64
        } else {
            0.0
        }
    }
}

/// The shape of the frames handed to CharLS.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct FrameShape {
    cols: u16,
    rows: u16,
    bits_per_sample: u16,
    components: u16,
}

impl FrameShape {
    fn bytes_per_sample(&self) -> usize {
        if self.bits_per_sample > 8 {
            2
        } else {
            1
        }
    }

    fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            width: u32::from(self.cols),
            height: u32::from(self.rows),
            bits_per_sample: i32::from(self.bits_per_sample),
            component_count: i32::from(self.components),
        }
    }
}

/// Turn little endian samples into the native byte order expected by CharLS.
fn to_native_order(data: &mut [u8], bytes_per_sample: usize) {
    if bytes_per_sample == 2 && cfg!(target_endian = "big") {
        swap_words(data);
    }
}

/// Compress one frame of color-by-pixel samples in native byte order.
///
/// Should CharLS code the components of a color image in separate scans,
/// the frame is compressed again from color-by-plane samples.
fn compress_frame(shape: &FrameShape, near: u16, samples: &[u8]) -> Result<Vec<u8>> {
    let data = CharLS::default()
        .encode(shape.frame_info(), i32::from(near), samples)
        .whatever_context("JPEG-LS encoding failed")?;
    if shape.components == 1 {
        return Ok(data);
    }
    let planar = read_stream_info(&data)
        .map(|info| info.interleave.is_planar())
        .unwrap_or(false);
    if !planar {
        return Ok(data);
    }
    let planes = to_color_by_plane(
        samples,
        usize::from(shape.components),
        shape.bytes_per_sample(),
    );
    let data = CharLS::default()
        .encode(shape.frame_info(), i32::from(near), &planes)
        .whatever_context("JPEG-LS encoding failed")?;
    Ok(data)
}

/// Compress all frames with the same shape and deviation
/// and collect them into a pixel sequence.
fn compress_frames<F>(
    frames: usize,
    shape: &FrameShape,
    near: u16,
    param: &JpegLsCodecParameter,
    frame_samples: F,
) -> Result<(PixelFragmentSequence<InMemFragment>, usize)>
where
    F: Fn(usize) -> Result<Vec<u8>> + Sync,
{
    #[cfg(feature = "rayon")]
    let iter = (0..frames).into_par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = (0..frames).into_iter();

    let encoded: Vec<(Vec<u8>, usize)> = iter
        .map(|i| {
            info!("Encoding frame {} of {}", i + 1, frames);
            let samples = frame_samples(i)?;
            let mut data = compress_frame(shape, near, &samples)?;
            let size = data.len();
            pad_bitstream(&mut data, param.padding);
            Ok((data, size))
        })
        .collect::<Result<_>>()?;

    let mut builder = EncapsulatedPixelDataBuilder::new(param.fragment_size);
    let mut compressed_size = 0;
    for (data, size) in encoded {
        compressed_size += size;
        builder.push_frame(data);
    }
    let pixel_sequence = builder.build(param.create_offset_table)?;
    Ok((pixel_sequence, compressed_size))
}

fn number_of_frames(obj: &dyn PixelDataObject) -> usize {
    obj.number_of_frames().unwrap_or(1).max(1) as usize
}

/// Compress the pixel cells as they are.
fn encode_raw(
    from: &TransferSyntax,
    pixel_data: &[u8],
    param: &JpegLsCodecParameter,
    obj: &dyn PixelDataObject,
) -> Result<Compressed> {
    let bits_allocated = obj.bits_allocated().context(
        codec_error::MissingAttributeSnafu {
            name: "BitsAllocated",
        },
    )?;
    let bits_stored = obj
        .bits_stored()
        .context(codec_error::MissingAttributeSnafu { name: "BitsStored" })?;
    let samples_per_pixel = obj.samples_per_pixel().context(
        codec_error::MissingAttributeSnafu {
            name: "SamplesPerPixel",
        },
    )?;
    let cols = obj
        .cols()
        .context(codec_error::MissingAttributeSnafu { name: "Columns" })?;
    let rows = obj
        .rows()
        .context(codec_error::MissingAttributeSnafu { name: "Rows" })?;
    let pi = obj.photometric_interpretation().context(
        codec_error::MissingAttributeSnafu {
            name: "PhotometricInterpretation",
        },
    )?;

    if bits_allocated != 8 && bits_allocated != 16 {
        if COOKED_PHOTOMETRIC_INTERPRETATIONS.contains(&&*pi) {
            debug!(
                "{} bits allocated, falling back to the cooked encoder",
                bits_allocated
            );
            return encode_cooked(from, pixel_data, param, obj, 0);
        }
        return codec_error::UnsupportedImageTypeSnafu.fail();
    }
    ensure!(
        cols >= 1 && rows >= 1 && samples_per_pixel >= 1,
        codec_error::UnsupportedImageTypeSnafu
    );
    ensure!(
        samples_per_pixel == 1 || samples_per_pixel == 3,
        codec_error::UnsupportedImageTypeSnafu
    );
    let planar_configuration = if samples_per_pixel > 1 {
        obj.planar_configuration().unwrap_or(0)
    } else {
        0
    };
    ensure!(
        planar_configuration <= 1,
        codec_error::UnsupportedGeometrySnafu {
            reason: format!("planar configuration {}", planar_configuration),
        }
    );

    let frames = number_of_frames(obj);
    let bytes_per_sample = usize::from(bits_allocated / 8);
    let components = usize::from(samples_per_pixel);
    let frame_size = bytes_per_sample * usize::from(cols) * usize::from(rows) * components;
    let required = frame_size * frames;
    ensure!(
        pixel_data.len() >= required,
        codec_error::BufferTooSmallSnafu {
            required,
            available: pixel_data.len(),
        }
    );
    let mut data = pixel_data[..required].to_vec();
    normalize_byte_order(&mut data, from.endianness(), bits_allocated);
    to_native_order(&mut data, bytes_per_sample);

    let to_pixels = samples_per_pixel > 1 && planar_configuration == 1;
    if to_pixels {
        info!("Converting image from color-by-plane to color-by-pixel");
    }

    let shape = FrameShape {
        cols,
        rows,
        bits_per_sample: bits_allocated,
        components: samples_per_pixel,
    };
    let (pixel_sequence, compressed_size) = compress_frames(frames, &shape, 0, param, |i| {
        let frame = &data[i * frame_size..(i + 1) * frame_size];
        if to_pixels {
            Ok(to_color_by_pixel(frame, components, bytes_per_sample))
        } else {
            Ok(frame.to_vec())
        }
    })?;

    let uncompressed_size = f64::from(cols)
        * f64::from(rows)
        * f64::from(samples_per_pixel)
        * f64::from(bits_stored)
        * frames as f64
        / 8.0;

    Ok(Compressed {
        pixel_sequence,
        uncompressed_size,
        compressed_size,
        ops: Vec::new(),
    })
}

/// Compress the stored pixel values, after moving embedded overlays out.
fn encode_cooked(
    from: &TransferSyntax,
    pixel_data: &[u8],
    param: &JpegLsCodecParameter,
    obj: &dyn PixelDataObject,
    near: u16,
) -> Result<Compressed> {
    let pi = obj.photometric_interpretation().context(
        codec_error::MissingAttributeSnafu {
            name: "PhotometricInterpretation",
        },
    )?;
    let bits_allocated = obj.bits_allocated().context(
        codec_error::MissingAttributeSnafu {
            name: "BitsAllocated",
        },
    )?;

    if !COOKED_PHOTOMETRIC_INTERPRETATIONS.contains(&&*pi) {
        ensure!(
            near == 0,
            codec_error::UnsupportedPhotometricInterpretationSnafu { pi: pi.into_owned() }
        );
        debug!("Photometric interpretation {}, falling back to the raw encoder", pi);
        return encode_raw(from, pixel_data, param, obj);
    }

    let layout = PixelLayout::from_object(obj)?;
    if layout.signed {
        // JPEG-LS near-lossless coding assumes unsigned samples
        ensure!(near == 0, codec_error::UnsupportedPixelRepresentationSnafu);
        if pi == "RGB" || pi == "YBR_FULL" {
            ensure!(
                bits_allocated == 8 || bits_allocated == 16,
                codec_error::UnsupportedPixelRepresentationSnafu
            );
            debug!("Signed color image, falling back to the raw encoder");
            return encode_raw(from, pixel_data, param, obj);
        }
    }
    ensure!(
        layout.samples_per_pixel == 1 || layout.samples_per_pixel == 3,
        codec_error::UnsupportedImageTypeSnafu
    );
    ensure!(
        layout.rows >= 1 && layout.cols >= 1,
        codec_error::UnsupportedImageTypeSnafu
    );
    let depth = layout.bits_stored;
    ensure!(
        (1..=16).contains(&depth),
        codec_error::UnsupportedBitDepthSnafu { bits: depth }
    );

    let frames = number_of_frames(obj);
    let mut data = pixel_data.to_vec();
    normalize_byte_order(&mut data, from.endianness(), bits_allocated);

    let mut ops = extract_embedded_overlays(obj, &data, &layout, frames);

    // sign extended values occupy the whole rendered precision
    let rendered_bits = layout.rendered_bits();
    let shape = FrameShape {
        cols: layout.cols,
        rows: layout.rows,
        bits_per_sample: if layout.signed {
            rendered_bits
        } else {
            depth.max(2)
        },
        components: layout.samples_per_pixel,
    };
    let bytes_per_sample = shape.bytes_per_sample();

    let (pixel_sequence, compressed_size) = compress_frames(frames, &shape, near, param, |i| {
        let samples = render_stored_values(&data, &layout, i)?;
        let mut bytes = Vec::with_capacity(samples.len() * bytes_per_sample);
        samples_to_bytes(&samples, bytes_per_sample, &mut bytes);
        to_native_order(&mut bytes, bytes_per_sample);
        Ok(bytes)
    })?;

    ops.push(AttributeOp::new(
        tags::BITS_ALLOCATED,
        AttributeAction::Set(PrimitiveValue::from(rendered_bits)),
    ));
    ops.push(AttributeOp::new(
        tags::BITS_STORED,
        AttributeAction::Set(PrimitiveValue::from(depth)),
    ));
    ops.push(AttributeOp::new(
        tags::HIGH_BIT,
        AttributeAction::Set(PrimitiveValue::from(depth - 1)),
    ));

    let uncompressed_size = f64::from(layout.cols)
        * f64::from(layout.rows)
        * f64::from(depth)
        * frames as f64
        * f64::from(layout.samples_per_pixel)
        / 8.0;

    Ok(Compressed {
        pixel_sequence,
        uncompressed_size,
        compressed_size,
        ops,
    })
}

/// Operations which turn the data set into a new instance
/// derived from the current one.
fn new_instance_ops(obj: &dyn PixelDataObject) -> Vec<AttributeOp> {
    let mut ops = Vec::new();
    if let (Some(class_uid), Some(instance_uid)) =
        (obj.sop_class_uid(), obj.string(tags::SOP_INSTANCE_UID))
    {
        let purpose = InMemDataSet::from_element_iter([
            (tags::CODE_VALUE, PrimitiveValue::from("121320")),
            (tags::CODING_SCHEME_DESIGNATOR, PrimitiveValue::from("DCM")),
            (tags::CODE_MEANING, PrimitiveValue::from("Uncompressed predecessor")),
        ]);
        let mut item = InMemDataSet::from_element_iter([
            (tags::REFERENCED_SOP_CLASS_UID, PrimitiveValue::from(&*class_uid)),
            (tags::REFERENCED_SOP_INSTANCE_UID, PrimitiveValue::from(&*instance_uid)),
        ]);
        item.put(
            tags::PURPOSE_OF_REFERENCE_CODE_SEQUENCE,
            dicom_codec_core::DicomValue::Sequence(std::iter::once(purpose).collect()),
        );
        ops.push(AttributeOp::new(
            tags::SOURCE_IMAGE_SEQUENCE,
            AttributeAction::PushItem(item),
        ));
    }
    ops.push(AttributeOp::new(
        tags::SOP_INSTANCE_UID,
        AttributeAction::SetStr(uid::generate_uid().into()),
    ));
    ops
}

/// Set the first value of _Image Type_ to DERIVED.
fn image_type_op(obj: &dyn PixelDataObject) -> AttributeOp {
    let mut values: Vec<String> = obj
        .primitive(tags::IMAGE_TYPE)
        .map(|v| v.to_multi_str().into_owned())
        .unwrap_or_default();
    if values.is_empty() {
        values.push("DERIVED".to_string());
    } else {
        values[0] = "DERIVED".to_string();
    }
    AttributeOp::new(
        tags::IMAGE_TYPE,
        AttributeAction::SetStr(values.join("\\").into()),
    )
}

fn derivation_ops(obj: &dyn PixelDataObject, near: u16, ratio: f64) -> Vec<AttributeOp> {
    let mut description = format!(
        "near lossless JPEG-LS compression, factor {:.5} (NEAR={})",
        ratio, near
    );
    if let Some(old) = obj.string(tags::DERIVATION_DESCRIPTION) {
        description.push_str(" [");
        description.push_str(&old);
        description.push(']');
        if description.len() > MAX_DERIVATION_DESCRIPTION_LENGTH {
            let mut cut = MAX_DERIVATION_DESCRIPTION_LENGTH - 4;
            while !description.is_char_boundary(cut) {
                cut -= 1;
            }
            description.truncate(cut);
            description.push_str("...]");
        }
    }
    let code = InMemDataSet::from_element_iter([
        (tags::CODE_VALUE, PrimitiveValue::from("113040")),
        (tags::CODING_SCHEME_DESIGNATOR, PrimitiveValue::from("DCM")),
        (tags::CODE_MEANING, PrimitiveValue::from("Lossy Compression")),
    ]);
    vec![
        AttributeOp::new(
            tags::DERIVATION_DESCRIPTION,
            AttributeAction::SetStr(description.into()),
        ),
        AttributeOp::new(tags::DERIVATION_CODE_SEQUENCE, AttributeAction::PushItem(code)),
    ]
}

/// Record the lossy compression ratio and method,
/// keeping the method values aligned with the ratio values.
fn lossy_compression_ops(obj: &dyn PixelDataObject, ratio: f64) -> Vec<AttributeOp> {
    let count = |tag| {
        obj.primitive(tag)
            .map(|v| v.to_multi_str().len())
            .unwrap_or(0)
    };
    let ratios = count(tags::LOSSY_IMAGE_COMPRESSION_RATIO);
    let methods = count(tags::LOSSY_IMAGE_COMPRESSION_METHOD);

    let mut ops = vec![
        AttributeOp::new(
            tags::LOSSY_IMAGE_COMPRESSION,
            AttributeAction::SetStr("01".into()),
        ),
        AttributeOp::new(
            tags::LOSSY_IMAGE_COMPRESSION_RATIO,
            AttributeAction::PushStr(format!("{:.5}", ratio).into()),
        ),
    ];
    for _ in methods..ratios {
        ops.push(AttributeOp::new(
            tags::LOSSY_IMAGE_COMPRESSION_METHOD,
            AttributeAction::PushStr("".into()),
        ));
    }
    ops.push(AttributeOp::new(
        tags::LOSSY_IMAGE_COMPRESSION_METHOD,
        AttributeAction::PushStr("ISO_14495_1".into()),
    ));
    ops
}

fn secondary_capture_ops() -> Vec<AttributeOp> {
    vec![
        AttributeOp::new(
            tags::SOP_CLASS_UID,
            AttributeAction::SetStr(uids::SECONDARY_CAPTURE_IMAGE_STORAGE.into()),
        ),
        AttributeOp::new(
            tags::CONVERSION_TYPE,
            AttributeAction::SetStrIfMissing("WSD".into()),
        ),
    ]
}

impl Codec for JpegLsEncoder {
    fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    fn role(&self) -> CodecRole {
        CodecRole::Encoder
    }

    fn can_change_coding(&self, from: &TransferSyntax, to: &TransferSyntax) -> bool {
        from.is_native() && to.uid() == self.transfer_syntax.uid()
    }

    fn decode(
        &self,
        _from_param: &dyn RepresentationParameter,
        _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        _codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<DecodedImage> {
        codec_error::IllegalCallSnafu {
            operation: "decode",
        }
        .fail()
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
        from: &TransferSyntax,
        pixel_data: &[u8],
        to_param: &dyn RepresentationParameter,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput> {
        ensure!(from.is_native(), codec_error::NotNativeSnafu);
        let param = codec_parameter(codec_param)?;
        let rep = representation_parameter(to_param)?;

        let bits_stored = dataset
            .bits_stored()
            .context(codec_error::MissingAttributeSnafu { name: "BitsStored" })?;
        ensure!(
            (2..=16).contains(&bits_stored),
            codec_error::UnsupportedBitDepthSnafu { bits: bits_stored }
        );

        let lossless = !self.transfer_syntax.is_lossy() || rep.use_lossless_process();
        let compressed = if lossless {
            if param.prefer_cooked {
                encode_cooked(from, pixel_data, param, dataset, 0)?
            } else {
                encode_raw(from, pixel_data, param, dataset)?
            }
        } else {
            encode_cooked(from, pixel_data, param, dataset, rep.near())?
        };
        let ratio = compressed.compression_ratio();
        debug!(
            "Compressed {} bytes into {} bytes, ratio {:.3}",
            compressed.uncompressed_size, compressed.compressed_size, ratio
        );

        let Compressed {
            pixel_sequence,
            mut ops,
            ..
        } = compressed;

        if lossless {
            if param.convert_to_secondary_capture || param.uid_creation == UidCreation::Always {
                ops.extend(new_instance_ops(dataset));
            }
        } else {
            if param.convert_to_secondary_capture || param.uid_creation != UidCreation::Never {
                ops.extend(new_instance_ops(dataset));
            }
            ops.push(image_type_op(dataset));
            ops.extend(derivation_ops(dataset, rep.near(), ratio));
            ops.extend(lossy_compression_ops(dataset, ratio));
        }
        if param.convert_to_secondary_capture {
            ops.extend(secondary_capture_ops());
        }

        Ok(EncodeOutput {
            pixel_sequence,
            ops,
            remove_old_representation: true,
        })
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
        codec_error::IllegalCallSnafu {
            operation: "determine_decompressed_color_model",
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_shape_of_charls() {
        let shape = FrameShape {
            cols: 40,
            rows: 30,
            bits_per_sample: 12,
            components: 3,
        };
        assert_eq!(shape.bytes_per_sample(), 2);
        let info = shape.frame_info();
        assert_eq!(info.width, 40);
        assert_eq!(info.height, 30);
        assert_eq!(info.bits_per_sample, 12);
        assert_eq!(info.component_count, 3);
    }

    #[test]
    fn compression_ratio_is_recorded_with_aligned_method() {
        let obj = InMemDataSet::from_element_iter([
            (tags::LOSSY_IMAGE_COMPRESSION_RATIO, PrimitiveValue::from("2.5\\4")),
            (tags::LOSSY_IMAGE_COMPRESSION_METHOD, PrimitiveValue::from("ISO_10918_1")),
        ]);
        let ops = lossy_compression_ops(&obj, 3.0);
        let methods: Vec<_> = ops
            .iter()
            .filter(|op| op.tag == tags::LOSSY_IMAGE_COMPRESSION_METHOD)
            .map(|op| op.action.clone())
            .collect();
        assert_eq!(
            methods,
            vec![
                AttributeAction::PushStr("".into()),
                AttributeAction::PushStr("ISO_14495_1".into()),
            ]
        );
        assert!(ops.contains(&AttributeOp::new(
            tags::LOSSY_IMAGE_COMPRESSION_RATIO,
            AttributeAction::PushStr("3.00000".into())
        )));
    }

    #[test]
    fn long_derivation_description_is_cut() {
        let old = "x".repeat(2000);
        let obj = InMemDataSet::from_element_iter([(
            tags::DERIVATION_DESCRIPTION,
            PrimitiveValue::from(old.as_str()),
        )]);
        let ops = derivation_ops(&obj, 2, 4.0);
        match &ops[0].action {
            AttributeAction::SetStr(description) => {
                assert_eq!(description.len(), 1024);
                assert!(description.starts_with(
                    "near lossless JPEG-LS compression, factor 4.00000 (NEAR=2) [xxx"
                ));
                assert!(description.ends_with("...]"));
            }
            action => panic!("unexpected action {:?}", action),
        }
    }

    #[test]
    fn image_type_becomes_derived() {
        let obj = InMemDataSet::from_element_iter([(
            tags::IMAGE_TYPE,
            PrimitiveValue::from("ORIGINAL\\PRIMARY\\AXIAL"),
        )]);
        assert_eq!(
            image_type_op(&obj).action,
            AttributeAction::SetStr("DERIVED\\PRIMARY\\AXIAL".into())
        );
        assert_eq!(
            image_type_op(&InMemDataSet::new()).action,
            AttributeAction::SetStr("DERIVED".into())
        );
    }

    #[test]
    fn new_instance_references_predecessor() {
        let obj = InMemDataSet::from_element_iter([
            (tags::SOP_CLASS_UID, PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.7")),
            (tags::SOP_INSTANCE_UID, PrimitiveValue::from("1.2.3.4")),
        ]);
        let ops = new_instance_ops(&obj);
        assert_eq!(ops.len(), 2);
        match &ops[0].action {
            AttributeAction::PushItem(item) => {
                assert_eq!(
                    item.element_str(tags::REFERENCED_SOP_INSTANCE_UID).as_deref(),
                    Some("1.2.3.4")
                );
                let purpose = item.items(tags::PURPOSE_OF_REFERENCE_CODE_SEQUENCE).unwrap();
                assert_eq!(purpose[0].element_str(tags::CODE_VALUE).as_deref(), Some("121320"));
            }
            action => panic!("unexpected action {:?}", action),
        }
        match &ops[1].action {
            AttributeAction::SetStr(uid) => assert!(uid.starts_with("2.25.")),
            action => panic!("unexpected action {:?}", action),
        }
    }
}
