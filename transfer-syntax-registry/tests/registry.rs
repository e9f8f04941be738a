//! Test suite for the codec registry
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dicom_codec::codec::{Codec, CodecRole, DecodedFrame, DecodedImage, EncodeOutput, PixelDataObject};
use dicom_codec::error::{codec_error, Result};
use dicom_codec::params::{
    downcast_codec, CodecParameter, NoRepresentationParameter, RepresentationParameter,
};
use dicom_codec::{CodecError, TransferSyntax};
use dicom_codec_core::value::InMemFragment;
use dicom_codec_core::{InMemDataSet, PixelFragmentSequence};
use dicom_codec_registry::entries::{
    EXPLICIT_VR_LITTLE_ENDIAN, JPEG_2000_IMAGE_COMPRESSION, JPEG_BASELINE, RLE_LOSSLESS,
};
use dicom_codec_registry::CodecRegistry;

/// Codec parameter of the test codec,
/// echoed back as the decompressed color model.
#[derive(Debug, Clone, PartialEq)]
struct Label(&'static str);

impl CodecParameter for Label {}

/// A codec which takes its time to decode,
/// keeping track of the calls started and finished.
#[derive(Debug, Default)]
struct SlowCodec {
    started: AtomicUsize,
    finished: AtomicUsize,
    delay_ms: u64,
    transcodes: bool,
}

impl SlowCodec {
    fn new(delay_ms: u64) -> Self {
        SlowCodec {
            delay_ms,
            ..Default::default()
        }
    }
}

impl Codec for SlowCodec {
    fn transfer_syntax(&self) -> &TransferSyntax {
        &RLE_LOSSLESS
    }

    fn role(&self) -> CodecRole {
        CodecRole::Both
    }

    fn can_change_coding(&self, from: &TransferSyntax, to: &TransferSyntax) -> bool {
        if self.transcodes {
            to.uid() == RLE_LOSSLESS.uid()
        } else {
            from.is_native() != to.is_native()
        }
    }

    fn decode(
        &self,
        _from_param: &dyn RepresentationParameter,
        pixel_sequence: &PixelFragmentSequence<InMemFragment>,
        _codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<DecodedImage> {
        self.started.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(self.delay_ms));
        let pixels = pixel_sequence.fragments().concat();
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(DecodedImage {
            pixels,
            photometric_interpretation: "MONOCHROME2".to_string(),
            planar_configuration: 0,
            ops: Vec::new(),
        })
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
        pixel_data: &[u8],
        _to_param: &dyn RepresentationParameter,
        _codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<EncodeOutput> {
        Ok(EncodeOutput {
            pixel_sequence: PixelFragmentSequence::new_fragments(vec![pixel_data.to_vec()]),
            ops: Vec::new(),
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
        codec_param: &dyn CodecParameter,
        _dataset: &dyn PixelDataObject,
    ) -> Result<String> {
        let label = downcast_codec::<Label>(codec_param)
            .map(|l| l.0)
            .unwrap_or("none");
        Ok(label.to_string())
    }
}

fn register(registry: &CodecRegistry, codec: &Arc<dyn Codec>, label: &'static str) -> Result<()> {
    registry.register(
        Arc::clone(codec),
        Arc::new(NoRepresentationParameter),
        Arc::new(Label(label)),
    )
}

fn sequence() -> PixelFragmentSequence<InMemFragment> {
    PixelFragmentSequence::new_fragments(vec![vec![1, 2], vec![3, 4]])
}

#[test]
fn deregister_waits_for_decoding_in_flight() {
    const THREADS: usize = 8;

    let registry = Arc::new(CodecRegistry::new());
    let slow = Arc::new(SlowCodec::new(100));
    let codec: Arc<dyn Codec> = slow.clone();
    register(&registry, &codec, "slow").unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let dataset = InMemDataSet::new();
                registry.decode(&RLE_LOSSLESS, None, &sequence(), &dataset)
            })
        })
        .collect();

    // wait until every decoding call is inside the codec
    while slow.started.load(Ordering::SeqCst) < THREADS {
        thread::sleep(Duration::from_millis(1));
    }
    registry.deregister(&codec).unwrap();
    assert_eq!(slow.finished.load(Ordering::SeqCst), THREADS);

    for handle in handles {
        let image = handle.join().unwrap().unwrap();
        assert_eq!(image.pixels, vec![1, 2, 3, 4]);
    }

    // the codec is gone now
    let err = registry
        .decode(&RLE_LOSSLESS, None, &sequence(), &InMemDataSet::new())
        .unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedTransferSyntax { .. }));
}

#[test]
fn registration_misuse() {
    let registry = CodecRegistry::new();
    let codec: Arc<dyn Codec> = Arc::new(SlowCodec::new(0));
    let other: Arc<dyn Codec> = Arc::new(SlowCodec::new(0));

    register(&registry, &codec, "a").unwrap();
    assert!(matches!(
        register(&registry, &other, "b"),
        Err(CodecError::DuplicateRegistration { .. })
    ));
    assert!(matches!(
        registry.deregister(&other),
        Err(CodecError::NotFound)
    ));
    assert!(matches!(
        registry.update_parameter(&other, Arc::new(Label("b"))),
        Err(CodecError::NotFound)
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn parameters_can_be_updated() {
    let registry = CodecRegistry::new();
    let codec: Arc<dyn Codec> = Arc::new(SlowCodec::new(0));
    register(&registry, &codec, "first").unwrap();

    let color_model = || {
        registry
            .determine_decompressed_color_model(
                &RLE_LOSSLESS,
                None,
                &sequence(),
                &InMemDataSet::new(),
            )
            .unwrap()
    };
    assert_eq!(color_model(), "first");

    registry
        .update_parameter(&codec, Arc::new(Label("second")))
        .unwrap();
    assert_eq!(color_model(), "second");
    let param = registry.codec_parameter(&codec).unwrap();
    assert_eq!(downcast_codec::<Label>(&*param), Some(&Label("second")));
}

#[test]
fn encode_and_transcode_lookup() {
    let registry = CodecRegistry::new();
    let codec: Arc<dyn Codec> = Arc::new(SlowCodec::new(0));
    register(&registry, &codec, "a").unwrap();
    let dataset = InMemDataSet::new();

    let output = registry
        .encode(&EXPLICIT_VR_LITTLE_ENDIAN, &[5, 6], &RLE_LOSSLESS, None, &dataset)
        .unwrap();
    assert_eq!(output.pixel_sequence.fragments(), &[vec![5_u8, 6]]);
    assert!(registry.can_change_coding(&EXPLICIT_VR_LITTLE_ENDIAN, &RLE_LOSSLESS));
    assert!(!registry.can_change_coding(&JPEG_BASELINE, &RLE_LOSSLESS));

    // no codec for the target
    assert!(matches!(
        registry.encode(&EXPLICIT_VR_LITTLE_ENDIAN, &[5, 6], &JPEG_BASELINE, None, &dataset),
        Err(CodecError::UnsupportedTransferSyntax { .. })
    ));
    // codec found, but it does not convert from encapsulated pixel data
    assert!(matches!(
        registry.encode(&JPEG_BASELINE, &[5, 6], &RLE_LOSSLESS, None, &dataset),
        Err(CodecError::UnsupportedConversion { .. })
    ));
    assert!(matches!(
        registry.transcode(&JPEG_BASELINE, None, &sequence(), &RLE_LOSSLESS, None, &dataset),
        Err(CodecError::UnsupportedConversion { .. })
    ));
    assert!(matches!(
        registry.transcode(
            &JPEG_BASELINE,
            None,
            &sequence(),
            &JPEG_2000_IMAGE_COMPRESSION,
            None,
            &dataset
        ),
        Err(CodecError::UnsupportedTransferSyntax { .. })
    ));
}

#[test]
fn transcoding_codec_without_transcode_support() {
    let registry = CodecRegistry::new();
    let codec: Arc<dyn Codec> = Arc::new(SlowCodec {
        transcodes: true,
        ..Default::default()
    });
    register(&registry, &codec, "a").unwrap();

    let err = registry
        .transcode(
            &JPEG_BASELINE,
            None,
            &sequence(),
            &RLE_LOSSLESS,
            None,
            &InMemDataSet::new(),
        )
        .unwrap_err();
    assert!(matches!(err, CodecError::IllegalCall { operation: "transcode" }));
}

#[test]
fn global_registry() {
    let registry = dicom_codec_registry::get_registry();
    #[cfg(feature = "charls")]
    {
        use dicom_codec_registry::entries::{
            JPEG_LS_LOSSLESS_IMAGE_COMPRESSION, JPEG_LS_LOSSY_IMAGE_COMPRESSION,
        };
        assert_eq!(registry.len(), 4);
        assert!(registry.can_change_coding(
            &EXPLICIT_VR_LITTLE_ENDIAN,
            &JPEG_LS_LOSSY_IMAGE_COMPRESSION
        ));
        assert!(registry.can_change_coding(
            &JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
            &EXPLICIT_VR_LITTLE_ENDIAN
        ));
        assert!(!registry.can_change_coding(
            &JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
            &JPEG_LS_LOSSY_IMAGE_COMPRESSION
        ));
    }
    #[cfg(not(feature = "charls"))]
    assert!(registry.is_empty());
}
