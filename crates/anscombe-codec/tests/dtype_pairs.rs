//! Codec behaviour across decoded/encoded dtype pairs.

use approx::assert_relative_eq;

use anscombe_codec::{AnscombeCodec, BufferCodec, CodecConfig, CodecError};
use anscombe_core::{Buffer, DataType, Error};

const DECODED: [DataType; 7] = [
    DataType::U8,
    DataType::U16,
    DataType::I16,
    DataType::I32,
    DataType::I64,
    DataType::F32,
    DataType::F64,
];

const ENCODED: [DataType; 3] = [DataType::U8, DataType::I8, DataType::U16];

fn config(decoded: DataType, encoded: DataType) -> CodecConfig {
    CodecConfig::new(20.0, 30.0)
        .with_beta(0.5)
        .with_decoded_dtype(decoded)
        .with_encoded_dtype(encoded)
}

/// Increasing raw values spread over the part of `dtype` the codec sees.
fn ramp(dtype: DataType) -> Buffer {
    let lo = dtype.min_value().max(-3000.0);
    let hi = dtype.max_value().min(200_000.0);
    let values: Vec<f64> = (0..=4000).map(|i| lo + (hi - lo) * i as f64 / 4000.0).collect();
    Buffer::from_f64(dtype, &values)
}

#[test]
fn codes_are_monotonic() {
    for decoded in DECODED {
        for encoded in ENCODED {
            let codec = AnscombeCodec::new(config(decoded, encoded)).unwrap();
            let codes = codec.encode(&ramp(decoded)).unwrap().to_f64();
            for w in codes.windows(2) {
                assert!(w[1] >= w[0], "{} -> {}: {} then {}", decoded, encoded, w[0], w[1]);
            }
        }
    }
}

#[test]
fn reencoding_decoded_values_is_stable() {
    for decoded in DECODED {
        for encoded in ENCODED {
            let codec = AnscombeCodec::new(config(decoded, encoded)).unwrap();
            let codes = codec.encode(&ramp(decoded)).unwrap();
            let restored = codec.decode(&codes).unwrap();
            assert_eq!(restored.dtype(), decoded);
            assert_eq!(
                codec.encode(&restored).unwrap(),
                codes,
                "{} -> {}",
                decoded,
                encoded
            );
        }
    }
}

#[test]
fn encoded_dtype_is_respected() {
    for decoded in DECODED {
        for encoded in ENCODED {
            let codec = AnscombeCodec::new(config(decoded, encoded)).unwrap();
            let raw = ramp(decoded);
            let codes = codec.encode(&raw).unwrap();
            assert_eq!(codes.dtype(), encoded);
            assert_eq!(codes.len(), raw.len());
        }
    }
}

#[test]
fn narrow_code_range_keeps_wide_integers_enumerated() {
    // uint8 codes cover only a few thousand raw values, even for int64
    let codec = AnscombeCodec::new(config(DataType::I64, DataType::U8)).unwrap();
    let table = codec.table().unwrap();
    assert_eq!(table.layout(), anscombe_lut::TableLayout::Enumerated);
}

#[test]
fn wide_pairs_fall_back_to_sampled_tables() {
    let codec = AnscombeCodec::new(config(DataType::I32, DataType::U16)).unwrap();
    let table = codec.table().unwrap();
    assert_eq!(table.layout(), anscombe_lut::TableLayout::Sampled);
}

#[test]
fn pairs_without_overlap_are_rejected() {
    // every uint8 raw value lands on one code
    let config = CodecConfig::new(0.0, 1e6).with_decoded_dtype(DataType::U8);
    let err = AnscombeCodec::new(config).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Core(Error::IncompatibleDtypes { .. })
    ));
    assert!(err.is_configuration_error());
}

#[test]
fn float_codes_roundtrip_closely() {
    let codec = AnscombeCodec::new(config(DataType::F64, DataType::F64)).unwrap();
    assert!(codec.is_exact());
    let raw = ramp(DataType::F64);
    let back = codec.decode(&codec.encode(&raw).unwrap()).unwrap();
    for (a, b) in raw.to_f64().into_iter().zip(back.to_f64()) {
        assert_relative_eq!(a, b, epsilon = 1e-9, max_relative = 1e-6);
    }
}
