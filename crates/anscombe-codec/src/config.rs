//! Codec configuration record.
//!
//! [`CodecConfig`] is the value persisted in array metadata next to the
//! compressed chunks. It round-trips through JSON unchanged, in either of
//! the two metadata envelopes used by array stores:
//!
//! - v2 (flat): `{"id": "anscombe-v1", "zero_level": 20.0, "conversion_gain": 30.0, ...}`
//! - v3 (nested): `{"name": "anscombe-v1", "configuration": {...}}`
//!
//! # Example
//!
//! ```rust
//! use anscombe_codec::CodecConfig;
//! use anscombe_core::DataType;
//!
//! let config = CodecConfig::new(20.0, 30.0).with_beta(1.0);
//! assert_eq!(config.encoded_dtype, DataType::U8);
//!
//! let json = config.to_json_v3().unwrap();
//! let back = CodecConfig::from_json(&json).unwrap();
//! assert_eq!(back, config);
//! ```

use anscombe_core::{DataType, Result, TransformParameters, DEFAULT_BETA};
use anscombe_lut::coverage;
use anscombe_transfer::AnscombeCurve;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodecError, CodecResult};

/// Identifier under which the codec is registered with array stores.
pub const CODEC_ID: &str = "anscombe-v1";

fn default_beta() -> f64 {
    DEFAULT_BETA
}

fn default_encoded() -> DataType {
    DataType::U8
}

fn default_decoded() -> DataType {
    DataType::I16
}

/// Persisted codec configuration.
///
/// Missing optional fields take their defaults: `beta = 0.5`,
/// `encoded_dtype = "uint8"`, `decoded_dtype = "int16"`. The field name
/// `photon_sensitivity` is accepted for `conversion_gain`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Raw signal value for zero detected photons.
    pub zero_level: f64,
    /// Raw signal units per detected photon.
    #[serde(alias = "photon_sensitivity")]
    pub conversion_gain: f64,
    /// Output quantization step in noise standard deviations.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Element type of encoded chunks.
    #[serde(default = "default_encoded")]
    pub encoded_dtype: DataType,
    /// Element type of raw (decoded) chunks.
    #[serde(default = "default_decoded")]
    pub decoded_dtype: DataType,
}

#[derive(Serialize, Deserialize)]
struct FlatEnvelope {
    id: String,
    #[serde(flatten)]
    config: CodecConfig,
}

#[derive(Serialize, Deserialize)]
struct NestedEnvelope {
    name: String,
    configuration: CodecConfig,
}

impl CodecConfig {
    /// Creates a configuration with default `beta` and dtypes.
    pub fn new(zero_level: f64, conversion_gain: f64) -> Self {
        Self {
            zero_level,
            conversion_gain,
            beta: DEFAULT_BETA,
            encoded_dtype: default_encoded(),
            decoded_dtype: default_decoded(),
        }
    }

    /// Creates a configuration from validated parameters.
    pub fn from_params(params: &TransformParameters) -> Self {
        Self::new(params.zero_level(), params.conversion_gain()).with_beta(params.beta())
    }

    /// Sets `beta`.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the encoded element type.
    pub fn with_encoded_dtype(mut self, dtype: DataType) -> Self {
        self.encoded_dtype = dtype;
        self
    }

    /// Sets the decoded element type.
    pub fn with_decoded_dtype(mut self, dtype: DataType) -> Self {
        self.decoded_dtype = dtype;
        self
    }

    /// Validated transform parameters.
    pub fn params(&self) -> Result<TransformParameters> {
        TransformParameters::new(self.zero_level, self.conversion_gain, self.beta)
    }

    /// Runs every construction-time check without building a table.
    ///
    /// Rejects invalid parameters and, for integer encoded types, dtype
    /// pairs that cannot express more than one code.
    pub fn validate(&self) -> Result<()> {
        let params = self.params()?;
        if self.encoded_dtype.is_integer() {
            let curve = AnscombeCurve::new(&params);
            coverage(&curve, self.decoded_dtype, self.encoded_dtype)?;
        }
        Ok(())
    }

    /// Flat (v2-style) metadata object.
    ///
    /// Fails when the parameters do not validate, since JSON cannot carry
    /// non-finite numbers back unchanged.
    pub fn to_json_v2(&self) -> CodecResult<Value> {
        self.params()?;
        let value = serde_json::to_value(FlatEnvelope {
            id: CODEC_ID.to_string(),
            config: *self,
        })?;
        Ok(value)
    }

    /// Nested (v3-style) metadata object. Fails like [`to_json_v2`](Self::to_json_v2).
    pub fn to_json_v3(&self) -> CodecResult<Value> {
        self.params()?;
        let value = serde_json::to_value(NestedEnvelope {
            name: CODEC_ID.to_string(),
            configuration: *self,
        })?;
        Ok(value)
    }

    /// Parses a metadata object in either envelope, or a bare configuration.
    ///
    /// Fails with [`CodecError::UnknownCodec`] when the envelope names a
    /// different codec.
    pub fn from_json(value: &Value) -> CodecResult<Self> {
        if let Some(id) = value.get("id") {
            let env: FlatEnvelope = serde_json::from_value(value.clone())?;
            check_id(id, &env.id)?;
            return Ok(env.config);
        }
        if let Some(name) = value.get("name") {
            let env: NestedEnvelope = serde_json::from_value(value.clone())?;
            check_id(name, &env.name)?;
            return Ok(env.configuration);
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Parses metadata from a JSON string, see [`from_json`](Self::from_json).
    pub fn from_json_str(s: &str) -> CodecResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

fn check_id(raw: &Value, id: &str) -> CodecResult<()> {
    if id == CODEC_ID {
        Ok(())
    } else {
        Err(CodecError::UnknownCodec(raw.to_string()))
    }
}
