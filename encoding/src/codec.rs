//! Core module for building pixel data codecs.
//!
//! This module contains the capability contract
//! implemented once per compression family ([`Codec`]),
//! the types of its outputs,
//! and the [`PixelDataObject`] trait
//! through which codecs read the image attributes of a data set.
//!
//! Codecs never modify the data set directly.
//! Instead, every output carries the list of [attribute operations](AttributeOp)
//! which the caller must apply for the data set
//! to remain consistent with the new pixel data.
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use num_traits::NumCast;

use dicom_codec_core::ops::AttributeOp;
use dicom_codec_core::value::InMemFragment;
use dicom_codec_core::{tags, DicomValue, InMemDataSet, PixelFragmentSequence, PrimitiveValue, Tag};

use crate::error::Result;
use crate::params::{CodecParameter, RepresentationParameter};
use crate::TransferSyntax;

/// A DICOM object trait to be interpreted as pixel data.
///
/// Codecs read the attributes of the image pixel module
/// (and a few others, such as the SOP common module)
/// through this trait.
/// Only [`element`](PixelDataObject::element) needs to be implemented;
/// the remaining methods are derived from it.
pub trait PixelDataObject {
    /// Retrieve the value of an attribute at the root of the object.
    fn element(&self, tag: Tag) -> Option<&DicomValue>;

    /// Retrieve the primitive value of an attribute.
    fn primitive(&self, tag: Tag) -> Option<&PrimitiveValue> {
        self.element(tag).and_then(DicomValue::primitive)
    }

    /// Retrieve the value of a textual attribute, without padding.
    fn string(&self, tag: Tag) -> Option<Cow<'_, str>> {
        self.primitive(tag).map(PrimitiveValue::to_clean_str)
    }

    /// Return the _Rows_, or `None` if it is not found
    fn rows(&self) -> Option<u16> {
        int(self, tags::ROWS)
    }

    /// Return the _Columns_, or `None` if it is not found
    fn cols(&self) -> Option<u16> {
        int(self, tags::COLUMNS)
    }

    /// Return the _Samples Per Pixel_, or `None` if it is not found
    fn samples_per_pixel(&self) -> Option<u16> {
        int(self, tags::SAMPLES_PER_PIXEL)
    }

    /// Return the _Bits Allocated_, or `None` if it is not defined
    fn bits_allocated(&self) -> Option<u16> {
        int(self, tags::BITS_ALLOCATED)
    }

    /// Return the _Bits Stored_, or `None` if it is not defined
    fn bits_stored(&self) -> Option<u16> {
        int(self, tags::BITS_STORED)
    }

    /// Return the _High Bit_, or `None` if it is not defined
    fn high_bit(&self) -> Option<u16> {
        int(self, tags::HIGH_BIT)
    }

    /// Return the _Pixel Representation_, or `None` if it is not defined
    fn pixel_representation(&self) -> Option<u16> {
        int(self, tags::PIXEL_REPRESENTATION)
    }

    /// Return the _Planar Configuration_, or `None` if it is not defined
    fn planar_configuration(&self) -> Option<u16> {
        int(self, tags::PLANAR_CONFIGURATION)
    }

    /// Return the _Photometric Interpretation_, or `None` if it is not defined
    fn photometric_interpretation(&self) -> Option<Cow<'_, str>> {
        self.string(tags::PHOTOMETRIC_INTERPRETATION)
    }

    /// Return the _Number Of Frames_, or `None` if it is not defined
    fn number_of_frames(&self) -> Option<i32> {
        int(self, tags::NUMBER_OF_FRAMES)
    }

    /// Return the _SOP Class UID_, or `None` if it is not defined
    fn sop_class_uid(&self) -> Option<Cow<'_, str>> {
        self.string(tags::SOP_CLASS_UID)
    }
}

fn int<T, O>(obj: &O, tag: Tag) -> Option<T>
where
    T: NumCast + FromStr,
    O: PixelDataObject + ?Sized,
{
    obj.primitive(tag).and_then(PrimitiveValue::to_int)
}

impl PixelDataObject for InMemDataSet {
    fn element(&self, tag: Tag) -> Option<&DicomValue> {
        self.get(tag)
    }
}

/// The roles which a codec may play.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CodecRole {
    /// The codec only decompresses pixel data.
    Decoder,
    /// The codec only compresses pixel data.
    Encoder,
    /// The codec both decompresses and compresses pixel data.
    Both,
}

impl CodecRole {
    /// Whether a codec with this role can decode.
    pub fn decodes(self) -> bool {
        matches!(self, CodecRole::Decoder | CodecRole::Both)
    }

    /// Whether a codec with this role can encode.
    pub fn encodes(self) -> bool {
        matches!(self, CodecRole::Encoder | CodecRole::Both)
    }

    /// Whether two roles have at least one capability in common.
    pub fn overlaps(self, other: CodecRole) -> bool {
        (self.decodes() && other.decodes()) || (self.encodes() && other.encodes())
    }
}

/// The output of decoding all frames of an encapsulated image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// The native pixel data of all frames, in little endian,
    /// padded to an even length.
    pub pixels: Vec<u8>,
    /// The photometric interpretation of the decoded pixel data.
    pub photometric_interpretation: String,
    /// The planar configuration of the decoded pixel data
    /// (0 for color-by-pixel, 1 for color-by-plane).
    pub planar_configuration: u16,
    /// The attribute changes to apply to the data set.
    pub ops: Vec<AttributeOp>,
}

/// The output of decoding a single frame into a caller supplied buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// The number of bytes written to the buffer.
    pub len: usize,
    /// The photometric interpretation of the decoded pixel data.
    pub photometric_interpretation: String,
    /// The fragment index (counting the offset table as item 0)
    /// at which the next frame starts,
    /// to be used as the start fragment hint of the next call.
    pub next_fragment: u32,
    /// The attribute changes to apply to the data set,
    /// such as the _Planar Configuration_ of the decoded layout.
    pub ops: Vec<AttributeOp>,
}

/// The output of encoding or transcoding pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOutput {
    /// The new encapsulated pixel data.
    pub pixel_sequence: PixelFragmentSequence<InMemFragment>,
    /// The attribute changes to apply to the data set.
    pub ops: Vec<AttributeOp>,
    /// Whether the previous pixel data representations
    /// held by the caller must be discarded.
    pub remove_old_representation: bool,
}

/// The capability contract of a pixel data codec,
/// implemented once per compression family and role.
///
/// A codec is bound to one transfer syntax.
/// Operations which the codec does not implement
/// fail with [`IllegalCall`](crate::CodecError::IllegalCall).
/// No operation should panic on malformed input.
pub trait Codec: Send + Sync + fmt::Debug {
    /// The transfer syntax supported by this codec.
    fn transfer_syntax(&self) -> &TransferSyntax;

    /// The role of this codec.
    fn role(&self) -> CodecRole;

    /// Check whether this codec can convert pixel data
    /// from one transfer syntax to another.
    fn can_change_coding(&self, from: &TransferSyntax, to: &TransferSyntax) -> bool;

    /// Decode all frames of the given encapsulated pixel data.
    fn decode(
        &self,
        from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<DecodedImage>;

    /// Decode a single frame of the given encapsulated pixel data
    /// into the given buffer.
    ///
    /// `start_fragment` is the index of the first fragment of the frame,
    /// counting the offset table as item 0.
    /// The value 0 means that it is not known
    /// and should be determined automatically.
    #[allow(clippy::too_many_arguments)]
    fn decode_frame(
        &self,
        from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
        frame: u32,
        start_fragment: u32,
        buffer: &mut [u8],
    ) -> Result<DecodedFrame>;

    /// Encode native pixel data,
    /// stored in the byte order of `from`.
    fn encode(
        &self,
        from: &TransferSyntax,
        pixel_data: &[u8],
        to_param: &dyn RepresentationParameter,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput>;

    /// Convert encapsulated pixel data into another compressed representation.
    #[allow(clippy::too_many_arguments)]
    fn transcode(
        &self,
        from: &TransferSyntax,
        from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        to_param: &dyn RepresentationParameter,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput>;

    /// Determine the photometric interpretation
    /// which the decoded image will have.
    fn determine_decompressed_color_model(
        &self,
        from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        codec_param: &dyn CodecParameter,
        dataset: &dyn PixelDataObject,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_attributes_from_data_set() {
        let obj = InMemDataSet::from_element_iter([
            (tags::ROWS, PrimitiveValue::from(64_u16)),
            (tags::COLUMNS, PrimitiveValue::from(32_u16)),
            (tags::NUMBER_OF_FRAMES, PrimitiveValue::from("3 ")),
            (tags::PHOTOMETRIC_INTERPRETATION, PrimitiveValue::from("RGB ")),
        ]);
        let obj: &dyn PixelDataObject = &obj;
        assert_eq!(obj.rows(), Some(64));
        assert_eq!(obj.cols(), Some(32));
        assert_eq!(obj.number_of_frames(), Some(3));
        assert_eq!(obj.photometric_interpretation().as_deref(), Some("RGB"));
        assert_eq!(obj.bits_stored(), None);
    }

    #[test]
    fn role_overlap() {
        assert!(CodecRole::Both.overlaps(CodecRole::Decoder));
        assert!(!CodecRole::Encoder.overlaps(CodecRole::Decoder));
        assert!(CodecRole::Encoder.overlaps(CodecRole::Encoder));
    }
}
