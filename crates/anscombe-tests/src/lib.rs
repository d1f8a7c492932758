//! Integration tests for the anscombe crates.
//!
//! This crate contains end-to-end tests that verify the interaction
//! between the estimator, the lookup tables and the codec, including a
//! simulated host that stores encoded chunks and codec metadata on disk.

#[cfg(test)]
mod golden;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anscombe_codec::{AnscombeCodec, BufferCodec, CodecConfig, CodecOptions};
    use anscombe_core::{Buffer, DataType};
    use anscombe_estimate::{DemoOptions, FrameStack, estimate, make_demo_data};
    use anscombe_lut::{TableBuilder, TableCache};
    use anscombe_transfer::AnscombeCurve;
    use tempfile::tempdir;

    fn demo_frames() -> (Vec<i16>, DemoOptions) {
        let opts = DemoOptions::default().size(96, 96).frames(30).seed(11);
        (make_demo_data(&opts).unwrap(), opts)
    }

    /// Estimate -> configure -> encode -> store -> load -> decode
    #[test]
    fn test_estimate_encode_store_decode() {
        let (raw, opts) = demo_frames();
        let stack = FrameStack::from_slice(&raw, opts.frames, opts.height, opts.width).unwrap();
        let est = estimate(&stack).unwrap();
        assert!((est.sensitivity / 30.0 - 1.0).abs() < 0.1);

        let config = CodecConfig::from_params(&est.params(1.0).unwrap());
        let codec = AnscombeCodec::new(config).unwrap();

        let dir = tempdir().unwrap();
        let frame_len = opts.height * opts.width;
        for (i, frame) in raw.chunks(frame_len).enumerate() {
            let bytes: Vec<u8> = frame.iter().flat_map(|v| v.to_le_bytes()).collect();
            let encoded = codec.encode_bytes(&bytes).unwrap();
            assert_eq!(encoded.len(), frame_len);
            std::fs::write(dir.path().join(format!("{}.chunk", i)), encoded).unwrap();
        }
        std::fs::write(
            dir.path().join("codec.json"),
            serde_json::to_string_pretty(&config.to_json_v2().unwrap()).unwrap(),
        )
        .unwrap();

        // a fresh reader knows only what is on disk
        let meta = std::fs::read_to_string(dir.path().join("codec.json")).unwrap();
        let loaded = CodecConfig::from_json_str(&meta).unwrap();
        assert_eq!(loaded, config);
        let reader = AnscombeCodec::new(loaded).unwrap();
        let table = reader.table().unwrap().clone();

        for (i, frame) in raw.chunks(frame_len).enumerate() {
            let encoded = std::fs::read(dir.path().join(format!("{}.chunk", i))).unwrap();
            let decoded = Buffer::from_le_bytes(
                DataType::I16,
                &reader.decode_bytes(&encoded).unwrap(),
            )
            .unwrap();
            let values = decoded.as_slice::<i16>().unwrap();
            for ((&x, &v), &c) in frame.iter().zip(values).zip(&encoded) {
                let (lo, hi) = table.bucket(c as i64).unwrap();
                if table.contains(f64::from(x)) {
                    assert!(f64::from(x) >= lo && f64::from(x) <= hi);
                }
                assert!(f64::from(v) >= lo && f64::from(v) <= hi);
            }
        }
    }

    #[test]
    fn test_v3_metadata_rebuilds_same_codec() {
        let config = CodecConfig::new(20.0, 30.0)
            .with_beta(0.5)
            .with_encoded_dtype(DataType::U16)
            .with_decoded_dtype(DataType::U16);
        let text = serde_json::to_string(&config.to_json_v3().unwrap()).unwrap();
        let a = AnscombeCodec::new(config).unwrap();
        let b = AnscombeCodec::new(CodecConfig::from_json_str(&text).unwrap()).unwrap();

        let raw = Buffer::from((0u16..60000).step_by(7).collect::<Vec<_>>());
        let ea = a.encode(&raw).unwrap();
        assert_eq!(ea, b.encode(&raw).unwrap());
        assert_eq!(a.decode(&ea).unwrap(), b.decode(&ea).unwrap());
    }

    #[test]
    fn test_shared_cache_across_threads() {
        let (raw, opts) = demo_frames();
        let frame_len = opts.height * opts.width;
        let config = CodecConfig::new(20.0, 30.0);
        let single = AnscombeCodec::new(config).unwrap();
        let expected: Vec<Buffer> = raw
            .chunks(frame_len)
            .map(|f| single.encode(&Buffer::from(f.to_vec())).unwrap())
            .collect();

        let cache = Arc::new(TableCache::new());
        let raw = Arc::new(raw);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let raw = Arc::clone(&raw);
                std::thread::spawn(move || {
                    let codec =
                        AnscombeCodec::with_cache(config, CodecOptions::default(), &cache).unwrap();
                    raw.chunks(frame_len)
                        .skip(t)
                        .step_by(4)
                        .map(|f| codec.encode(&Buffer::from(f.to_vec())).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (t, h) in handles.into_iter().enumerate() {
            for (k, chunk) in h.join().unwrap().into_iter().enumerate() {
                assert_eq!(chunk, expected[t + 4 * k]);
            }
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_table_agrees_with_curve() {
        let params = anscombe_core::TransformParameters::new(-5.0, 100.0, 0.5).unwrap();
        let curve = AnscombeCurve::new(&params);
        let table = TableBuilder::new(params, DataType::I16, DataType::U8)
            .build()
            .unwrap();
        assert_eq!(table.repaired(), 0);
        let (lo, hi) = table.raw_range();
        for x in (lo as i64)..=(hi as i64) {
            let x = x as f64;
            assert_eq!(table.encode(x), curve.forward(x).round() as i64, "x={}", x);
        }
    }

    #[test]
    fn test_saturation_is_observable() {
        let config = CodecConfig::new(100.0, 2.0).with_decoded_dtype(DataType::U16);
        let codec = AnscombeCodec::new(config).unwrap();
        let (_, hi) = codec.table().unwrap().raw_range();
        assert!(hi < f64::from(u16::MAX));

        let raw = Buffer::from(vec![0u16, 100, 1000, u16::MAX, u16::MAX]);
        let codes = codec.encode(&raw).unwrap();
        let top = codec.table().unwrap().code_range().1 as u8;
        assert_eq!(codes.as_slice::<u8>().unwrap()[3], top);
        assert_eq!(codec.saturated(), 2);
    }
}
