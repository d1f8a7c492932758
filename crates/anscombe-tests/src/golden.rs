//! Golden hash tests for codec output.
//!
//! The reference hashes in `golden/int16_uint8.json` were computed from
//! the closed-form curve by an independent implementation: every `int16`
//! value is encoded to `uint8`, and every `uint8` code is decoded back to
//! `int16`. The tests recompute both outputs and compare SHA256 hashes, so
//! any change to rounding, clamping or bucket midpoints shows up here.

use anscombe_codec::{AnscombeCodec, BufferCodec, CodecConfig, CodecOptions};
use anscombe_core::{Buffer, DataType};
use sha2::{Digest, Sha256};

const GOLDEN_INT16_UINT8: &str = include_str!("../golden/int16_uint8.json");

#[derive(Debug, serde::Deserialize)]
struct GoldenData {
    #[allow(dead_code)]
    version: String,
    decoded_dtype: DataType,
    encoded_dtype: DataType,
    cases: Vec<GoldenCase>,
}

#[derive(Debug, serde::Deserialize)]
struct GoldenCase {
    zero_level: f64,
    conversion_gain: f64,
    beta: f64,
    raw_range: [i64; 2],
    code_range: [i64; 2],
    encode_hash: String,
    decode_hash: String,
}

fn load_golden() -> GoldenData {
    serde_json::from_str(GOLDEN_INT16_UINT8).expect("golden data parses")
}

/// SHA256 of a buffer's little-endian bytes, as lowercase hex.
fn compute_hash(buffer: &Buffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buffer.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

fn every_int16() -> Buffer {
    Buffer::from((i16::MIN..=i16::MAX).collect::<Vec<i16>>())
}

fn every_uint8() -> Buffer {
    Buffer::from((u8::MIN..=u8::MAX).collect::<Vec<u8>>())
}

fn config(data: &GoldenData, case: &GoldenCase) -> CodecConfig {
    CodecConfig::new(case.zero_level, case.conversion_gain)
        .with_beta(case.beta)
        .with_decoded_dtype(data.decoded_dtype)
        .with_encoded_dtype(data.encoded_dtype)
}

#[cfg(test)]
mod golden_tests {
    use super::*;

    #[test]
    fn test_table_ranges() {
        let data = load_golden();
        for case in &data.cases {
            let codec = AnscombeCodec::new(config(&data, case)).unwrap();
            let table = codec.table().expect("int16 -> uint8 uses a table");
            let (raw_lo, raw_hi) = table.raw_range();
            assert_eq!([raw_lo as i64, raw_hi as i64], case.raw_range);
            let (code_lo, code_hi) = table.code_range();
            assert_eq!([code_lo, code_hi], case.code_range);
        }
    }

    #[test]
    fn test_encode_hashes() {
        let data = load_golden();
        let raw = every_int16();
        for case in &data.cases {
            let codec = AnscombeCodec::new(config(&data, case)).unwrap();
            let hash = compute_hash(&codec.encode(&raw).unwrap());
            assert_eq!(hash, case.encode_hash, "encode z={} g={} b={}", case.zero_level, case.conversion_gain, case.beta);
        }
    }

    #[test]
    fn test_exact_encode_hashes() {
        let data = load_golden();
        let raw = every_int16();
        for case in &data.cases {
            let codec = AnscombeCodec::with_options(config(&data, case), CodecOptions::exact()).unwrap();
            let hash = compute_hash(&codec.encode(&raw).unwrap());
            assert_eq!(hash, case.encode_hash, "exact encode z={}", case.zero_level);
        }
    }

    #[test]
    fn test_decode_hashes() {
        let data = load_golden();
        let codes = every_uint8();
        for case in &data.cases {
            let codec = AnscombeCodec::new(config(&data, case)).unwrap();
            let hash = compute_hash(&codec.decode(&codes).unwrap());
            assert_eq!(hash, case.decode_hash, "decode z={} g={} b={}", case.zero_level, case.conversion_gain, case.beta);
        }
    }
}
