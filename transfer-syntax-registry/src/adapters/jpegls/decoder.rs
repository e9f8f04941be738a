//! JPEG-LS decoder.
use charls::CharLS;
use dicom_codec::codec::{Codec, CodecRole, DecodedFrame, DecodedImage, PixelDataObject};
use dicom_codec::error::{codec_error, CodecError, Result};
use dicom_codec::fragments::FragmentFrameMapper;
use dicom_codec::params::{CodecParameter, RepresentationParameter};
use dicom_codec::pixel::{
    samples_to_bytes, swap_words, to_color_by_pixel, to_color_by_plane, COLOR_BY_PIXEL,
    COLOR_BY_PLANE,
};
use dicom_codec::{uid, TransferSyntax};
use dicom_codec_core::ops::{AttributeAction, AttributeOp};
use dicom_codec_core::value::InMemFragment;
use dicom_codec_core::{tags, uids, PixelFragmentSequence, PrimitiveValue};
use snafu::{ensure, OptionExt};
use tracing::{debug, warn};

use super::params::{JpegLsCodecParameter, PlanarConfigurationPolicy, UidCreation};
use super::codec_parameter;
use super::stream::read_stream_info;
use crate::entries;

/// Decoder of pixel data in a JPEG-LS transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegLsDecoder {
    transfer_syntax: TransferSyntax,
}

impl JpegLsDecoder {
    /// Create a decoder for the given transfer syntax.
    pub const fn new(transfer_syntax: TransferSyntax) -> Self {
        JpegLsDecoder { transfer_syntax }
    }

    /// The decoder of _JPEG-LS Lossless Image Compression_.
    pub const fn lossless() -> Self {
        Self::new(entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION)
    }

    /// The decoder of _JPEG-LS Lossy (Near-Lossless) Image Compression_.
    pub const fn near_lossless() -> Self {
        Self::new(entries::JPEG_LS_LOSSY_IMAGE_COMPRESSION)
    }
}

/// The image properties needed for decoding.
#[derive(Debug, Copy, Clone)]
struct ImageGeometry {
    rows: u16,
    cols: u16,
    samples_per_pixel: u16,
    bytes_per_sample: usize,
    frames: u32,
    fragments: u32,
}

impl ImageGeometry {
    fn from_object(
        obj: &dyn PixelDataObject,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
    ) -> Result<Self> {
        let samples_per_pixel = obj.samples_per_pixel().context(
            codec_error::MissingAttributeSnafu {
                name: "SamplesPerPixel",
            },
        )?;
        ensure!(
            samples_per_pixel == 1 || samples_per_pixel == 3,
            codec_error::UnsupportedGeometrySnafu {
                reason: format!("{} samples per pixel", samples_per_pixel),
            }
        );
        let rows = obj
            .rows()
            .context(codec_error::MissingAttributeSnafu { name: "Rows" })?;
        let cols = obj
            .cols()
            .context(codec_error::MissingAttributeSnafu { name: "Columns" })?;
        ensure!(
            rows >= 1 && cols >= 1,
            codec_error::UnsupportedGeometrySnafu {
                reason: format!("{}x{} image", cols, rows),
            }
        );
        let bits_stored = obj
            .bits_stored()
            .context(codec_error::MissingAttributeSnafu { name: "BitsStored" })?;
        ensure!(
            (2..=16).contains(&bits_stored),
            codec_error::UnsupportedGeometrySnafu {
                reason: format!("{} bits stored", bits_stored),
            }
        );
        let bits_allocated = obj.bits_allocated().context(
            codec_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            },
        )?;
        let bytes_per_sample = if bits_stored > 8 || bits_allocated > 8 {
            2
        } else {
            1
        };

        // limit the number of frames to the number of fragments
        let fragments = pixel_sequence.fragments().len() as u32;
        let declared = i64::from(obj.number_of_frames().unwrap_or(0));
        let frames = declared.min(i64::from(fragments)).max(1) as u32;

        Ok(ImageGeometry {
            rows,
            cols,
            samples_per_pixel,
            bytes_per_sample,
            frames,
            fragments,
        })
    }

    fn frame_size(&self) -> usize {
        self.bytes_per_sample
            * usize::from(self.rows)
            * usize::from(self.cols)
            * usize::from(self.samples_per_pixel)
    }
}

/// Choose the planar configuration of a color image
/// from its SOP class and photometric interpretation.
///
/// Hardcopy color images and the ultrasound images in YBR_FULL
/// require color-by-plane.
pub fn auto_planar_configuration(sop_class_uid: &str, photometric_interpretation: &str) -> u16 {
    if sop_class_uid == uids::HARDCOPY_COLOR_IMAGE_STORAGE {
        return COLOR_BY_PLANE;
    }
    if photometric_interpretation == "YBR_FULL"
        && (sop_class_uid == uids::ULTRASOUND_MULTI_FRAME_IMAGE_STORAGE
            || sop_class_uid == uids::ULTRASOUND_IMAGE_STORAGE)
    {
        return COLOR_BY_PLANE;
    }
    COLOR_BY_PIXEL
}

fn target_planar_configuration(param: &JpegLsCodecParameter, obj: &dyn PixelDataObject) -> u16 {
    let auto = || {
        let sop_class = obj.sop_class_uid().unwrap_or_default();
        let pi = obj.photometric_interpretation().unwrap_or_default();
        auto_planar_configuration(&sop_class, &pi)
    };
    match param.planar_configuration {
        PlanarConfigurationPolicy::Restore => match obj.planar_configuration() {
            Some(value) if value <= 1 => value,
            _ => auto(),
        },
        PlanarConfigurationPolicy::Auto => auto(),
        PlanarConfigurationPolicy::ColorByPixel => COLOR_BY_PIXEL,
        PlanarConfigurationPolicy::ColorByPlane => COLOR_BY_PLANE,
    }
}

/// Decode the fragments of one frame into `out`,
/// returning the index of the fragment following the frame.
#[allow(clippy::too_many_arguments)]
fn decode_frame_into(
    mapper: &FragmentFrameMapper<'_, InMemFragment>,
    param: &JpegLsCodecParameter,
    geometry: &ImageGeometry,
    planar_configuration: u16,
    frame: u32,
    start_fragment: u32,
    out: &mut [u8],
) -> Result<u32> {
    let range = if param.force_single_fragment_per_frame {
        let start = if start_fragment == 0 {
            frame + 1
        } else {
            start_fragment
        };
        ensure!(
            start <= geometry.fragments,
            codec_error::CannotDetermineFragmentCountSnafu { frame }
        );
        start..start + 1
    } else {
        mapper.frame_fragments(frame, start_fragment)?
    };
    debug!("Decoding frame #{} from fragments {:?}", frame, range);
    let next_fragment = range.end;

    let data = mapper.concat(range);
    let info = read_stream_info(&data)?;
    debug!(
        "JPEG-LS bitstream of {} bits, NEAR={}, {:?} interleave",
        info.bits_per_sample, info.near, info.interleave
    );
    ensure!(
        info.width == u32::from(geometry.cols) && info.height == u32::from(geometry.rows),
        codec_error::ImageDataMismatchSnafu {
            reason: format!(
                "bitstream is {}x{}, image is {}x{}",
                info.width, info.height, geometry.cols, geometry.rows
            ),
        }
    );
    ensure!(
        u16::from(info.component_count) == geometry.samples_per_pixel,
        codec_error::ImageDataMismatchSnafu {
            reason: format!(
                "bitstream has {} components, image has {} samples per pixel",
                info.component_count, geometry.samples_per_pixel
            ),
        }
    );
    ensure!(
        info.bytes_per_sample() <= geometry.bytes_per_sample,
        codec_error::ImageDataMismatchSnafu {
            reason: format!(
                "bitstream precision of {} bits in {}-byte samples",
                info.bits_per_sample, geometry.bytes_per_sample
            ),
        }
    );

    let mut decoded = CharLS::default()
        .decode(&data)
        .map_err(|e| CodecError::InvalidCompressedData {
            source: e.to_string().into(),
        })?;
    drop(data);
    ensure!(
        decoded.len() == info.frame_size(),
        codec_error::ImageDataMismatchSnafu {
            reason: format!(
                "decoded {} bytes, expected {}",
                decoded.len(),
                info.frame_size()
            ),
        }
    );

    // CharLS yields samples in native byte order
    let mut bytes = if info.bytes_per_sample() == geometry.bytes_per_sample {
        if geometry.bytes_per_sample == 2 && cfg!(target_endian = "big") {
            swap_words(&mut decoded);
        }
        decoded
    } else {
        let mut widened = Vec::with_capacity(decoded.len() * 2);
        samples_to_bytes(
            &decoded.iter().map(|v| u16::from(*v)).collect::<Vec<_>>(),
            2,
            &mut widened,
        );
        widened
    };
    let frame_size = geometry.frame_size();
    ensure!(
        bytes.len() == frame_size,
        codec_error::ImageDataMismatchSnafu {
            reason: format!("decoded {} bytes, expected {}", bytes.len(), frame_size),
        }
    );

    if geometry.samples_per_pixel == 3 {
        let components = usize::from(geometry.samples_per_pixel);
        if planar_configuration == COLOR_BY_PLANE && !info.interleave.is_planar() {
            warn!("different planar configuration in JPEG-LS stream, converting to \"1\"");
            bytes = to_color_by_plane(&bytes, components, geometry.bytes_per_sample);
        } else if planar_configuration == COLOR_BY_PIXEL && info.interleave.is_planar() {
            warn!("different planar configuration in JPEG-LS stream, converting to \"0\"");
            bytes = to_color_by_pixel(&bytes, components, geometry.bytes_per_sample);
        }
    }

    out[..frame_size].copy_from_slice(&bytes);
    Ok(next_fragment)
}

impl Codec for JpegLsDecoder {
    fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    fn role(&self) -> CodecRole {
        CodecRole::Decoder
    }

    fn can_change_coding(&self, from: &TransferSyntax, to: &TransferSyntax) -> bool {
        from.uid() == self.transfer_syntax.uid() && !to.is_encapsulated()
    }

    fn decode(
        &self,
        _from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<DecodedImage> {
        let param = codec_parameter(codec_param)?;
        let geometry = ImageGeometry::from_object(dataset, pixel_sequence)?;
        let planar_configuration = if geometry.samples_per_pixel > 1 {
            target_planar_configuration(param, dataset)
        } else {
            COLOR_BY_PIXEL
        };

        let frame_size = geometry.frame_size();
        let mut total = frame_size * geometry.frames as usize;
        if total % 2 != 0 {
            total += 1;
        }
        let mut pixels: Vec<u8> = Vec::new();
        pixels
            .try_reserve_exact(total)
            .ok()
            .context(codec_error::MemoryExhaustedSnafu { size: total })?;
        pixels.resize(total, 0);

        let mapper = FragmentFrameMapper::new(pixel_sequence, geometry.frames)
            .ignore_offset_table(param.ignore_offset_table);
        let mut start_fragment = 1;
        for frame in 0..geometry.frames {
            debug!("Decoding JPEG-LS frame #{}", frame);
            let offset = frame as usize * frame_size;
            let out = &mut pixels[offset..offset + frame_size];
            match decode_frame_into(
                &mapper,
                param,
                &geometry,
                planar_configuration,
                frame,
                start_fragment,
                out,
            ) {
                Ok(next) => start_fragment = next,
                Err(e) if param.force_single_fragment_per_frame && e.is_data_error() => {
                    warn!("Frame #{} is incomplete: {}", frame, e);
                    start_fragment += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut ops = Vec::new();
        if dataset.number_of_frames().is_some() || geometry.frames > 1 {
            ops.push(AttributeOp::new(
                tags::NUMBER_OF_FRAMES,
                AttributeAction::SetStr(geometry.frames.to_string().into()),
            ));
        }
        if geometry.samples_per_pixel == 3 {
            ops.push(AttributeOp::new(
                tags::PLANAR_CONFIGURATION,
                AttributeAction::Set(PrimitiveValue::from(planar_configuration)),
            ));
        }
        if self.transfer_syntax.is_lossy() {
            ops.push(AttributeOp::new(
                tags::LOSSY_IMAGE_COMPRESSION,
                AttributeAction::SetStr("01".into()),
            ));
        }
        if param.uid_creation == UidCreation::Always {
            ops.push(AttributeOp::new(
                tags::SOP_INSTANCE_UID,
                AttributeAction::SetStr(uid::generate_uid().into()),
            ));
        }

        Ok(DecodedImage {
            pixels,
            photometric_interpretation: dataset
                .photometric_interpretation()
                .unwrap_or_default()
                .into_owned(),
            planar_configuration,
            ops,
        })
    }

    fn decode_frame(
        &self,
        _from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
        frame: u32,
        start_fragment: u32,
        buffer: &mut [u8],
    ) -> Result<DecodedFrame> {
        let param = codec_parameter(codec_param)?;
        let geometry = ImageGeometry::from_object(dataset, pixel_sequence)?;
        ensure!(
            frame < geometry.frames,
            codec_error::FrameRangeOutOfBoundsSnafu { frame }
        );
        let frame_size = geometry.frame_size();
        ensure!(
            buffer.len() >= frame_size,
            codec_error::BufferTooSmallSnafu {
                required: frame_size,
                available: buffer.len(),
            }
        );
        let planar_configuration = if geometry.samples_per_pixel > 1 {
            target_planar_configuration(param, dataset)
        } else {
            COLOR_BY_PIXEL
        };

        let mapper = FragmentFrameMapper::new(pixel_sequence, geometry.frames)
            .ignore_offset_table(param.ignore_offset_table);
        let next_fragment = decode_frame_into(
            &mapper,
            param,
            &geometry,
            planar_configuration,
            frame,
            start_fragment,
            buffer,
        )?;

        let mut ops = Vec::new();
        if geometry.samples_per_pixel == 3 {
            ops.push(AttributeOp::new(
                tags::PLANAR_CONFIGURATION,
                AttributeAction::Set(PrimitiveValue::from(planar_configuration)),
            ));
        }

        Ok(DecodedFrame {
            len: frame_size,
            photometric_interpretation: dataset
                .photometric_interpretation()
                .unwrap_or_default()
                .into_owned(),
            next_fragment,
            ops,
        })
    }

    fn encode(
        &self,
        _from: &TransferSyntax,
        _pixel_data: &[u8],
        _to_param: &dyn RepresentationParameter,
        _codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<dicom_codec::EncodeOutput> {
        codec_error::IllegalCallSnafu {
            operation: "encode",
        }
        .fail()
    }

    fn transcode(
        &self,
        _from: &TransferSyntax,
        _from_param: &dyn RepresentationParameter,
        _pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        _to_param: &dyn RepresentationParameter,
        _codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<dicom_codec::EncodeOutput> {
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
        dataset: &dyn PixelDataObject,
    ) -> Result<String> {
        dataset
            .photometric_interpretation()
            .map(|pi| pi.into_owned())
            .context(codec_error::MissingAttributeSnafu {
                name: "PhotometricInterpretation",
            })
    }
}
