//! Parameter values
//!
//! A parameter is either a single scalar or an n-dimensional array. Scalar
//! functions are lifted over arrays element-wise.

use ndarray::{ArrayD, IxDyn};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f64::{INFINITY, NAN, NEG_INFINITY};
use std::fmt;

/// The value held under one key of a parameter collection
///
/// In JSON a scalar is a bare number and an array is `{"dim": [...], "data": [...]}`
/// with the data in row-major order. Non-finite elements are written as the
/// strings `"NaN"`, `"inf"` and `"-inf"`; `null` reads back as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A single number, e.g. a shared variance
    Scalar(f64),

    /// An array of any dimension, e.g. one lengthscale per input dimension
    Array(ArrayD<f64>),
}

impl ParamValue {
    /// Apply `f` to every element, returning a new value of the same shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::params::ParamValue;
    ///
    /// let v = ParamValue::from(vec![1.0, 2.0, 3.0]);
    /// let doubled = v.map(|x| 2.0 * x);
    /// assert_eq!(doubled, ParamValue::from(vec![2.0, 4.0, 6.0]));
    /// assert_eq!(v, ParamValue::from(vec![1.0, 2.0, 3.0]));
    /// ```
    pub fn map<F>(&self, f: F) -> ParamValue
    where
        F: Fn(f64) -> f64,
    {
        match self {
            ParamValue::Scalar(x) => ParamValue::Scalar(f(*x)),
            ParamValue::Array(a) => ParamValue::Array(a.mapv(f)),
        }
    }

    /// Like [`map`](ParamValue::map), but `f` also receives the element's position
    /// in logical (row-major) order.
    pub fn map_indexed<F>(&self, f: F) -> ParamValue
    where
        F: Fn(usize, f64) -> f64,
    {
        match self {
            ParamValue::Scalar(x) => ParamValue::Scalar(f(0, *x)),
            ParamValue::Array(a) => {
                let mut out = a.clone();
                for (i, x) in out.iter_mut().enumerate() {
                    *x = f(i, *x);
                }
                ParamValue::Array(out)
            }
        }
    }

    /// Combine two values of identical shape element-wise.
    ///
    /// Returns `None` when the shapes differ.
    pub fn zip_map<F>(&self, other: &ParamValue, f: F) -> Option<ParamValue>
    where
        F: Fn(f64, f64) -> f64,
    {
        match (self, other) {
            (ParamValue::Scalar(a), ParamValue::Scalar(b)) => Some(ParamValue::Scalar(f(*a, *b))),
            (ParamValue::Array(a), ParamValue::Array(b)) if a.shape() == b.shape() => {
                let mut out = a.clone();
                out.zip_mut_with(b, |x, &y| *x = f(*x, y));
                Some(ParamValue::Array(out))
            }
            _ => None,
        }
    }

    /// Shape of the value; scalars have an empty shape.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            ParamValue::Scalar(_) => Vec::new(),
            ParamValue::Array(a) => a.shape().to_vec(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ParamValue::Scalar(_) => 1,
            ParamValue::Array(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every element in logical order
    pub fn iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            ParamValue::Scalar(x) => Box::new(std::iter::once(*x)),
            ParamValue::Array(a) => Box::new(a.iter().copied()),
        }
    }

    /// The scalar, if this value is one
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(x) => Some(*x),
            ParamValue::Array(_) => None,
        }
    }

    /// The array, if this value is one
    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Array(a) => Some(a),
        }
    }

    /// A value of the same shape filled with zeros
    pub fn zeros_like(&self) -> ParamValue {
        match self {
            ParamValue::Scalar(_) => ParamValue::Scalar(0.0),
            ParamValue::Array(a) => ParamValue::Array(ArrayD::zeros(IxDyn(a.shape()))),
        }
    }

    /// Whether every element is finite
    pub fn is_finite(&self) -> bool {
        self.iter().all(f64::is_finite)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Scalar(x)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Array(ndarray::Array1::from_vec(v).into_dyn())
    }
}

impl From<ArrayD<f64>> for ParamValue {
    fn from(a: ArrayD<f64>) -> Self {
        ParamValue::Array(a)
    }
}

impl From<ndarray::Array1<f64>> for ParamValue {
    fn from(a: ndarray::Array1<f64>) -> Self {
        ParamValue::Array(a.into_dyn())
    }
}

impl From<ndarray::Array2<f64>> for ParamValue {
    fn from(a: ndarray::Array2<f64>) -> Self {
        ParamValue::Array(a.into_dyn())
    }
}

/// One element on the wire. JSON has no NaN or infinities.
struct WireFloat(f64);

impl Serialize for WireFloat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let x = self.0;
        if x.is_nan() {
            serializer.serialize_str("NaN")
        } else if x == INFINITY {
            serializer.serialize_str("inf")
        } else if x == NEG_INFINITY {
            serializer.serialize_str("-inf")
        } else {
            serializer.serialize_f64(x)
        }
    }
}

struct WireFloatVisitor;

impl<'de> Visitor<'de> for WireFloatVisitor {
    type Value = WireFloat;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, null, \"NaN\", \"inf\" or \"-inf\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<WireFloat, E> {
        Ok(WireFloat(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireFloat, E> {
        Ok(WireFloat(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireFloat, E> {
        Ok(WireFloat(v as f64))
    }

    // serde_json writes non-finite floats as null
    fn visit_unit<E: de::Error>(self) -> Result<WireFloat, E> {
        Ok(WireFloat(NAN))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<WireFloat, E> {
        match v {
            "NaN" | "nan" => Ok(WireFloat(NAN)),
            "inf" | "+inf" | "Infinity" => Ok(WireFloat(INFINITY)),
            "-inf" | "-Infinity" => Ok(WireFloat(NEG_INFINITY)),
            _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for WireFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WireFloatVisitor)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParamValueRepr {
    Scalar(WireFloat),
    Array { dim: Vec<usize>, data: Vec<WireFloat> },
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            ParamValue::Scalar(x) => ParamValueRepr::Scalar(WireFloat(*x)),
            ParamValue::Array(a) => ParamValueRepr::Array {
                dim: a.shape().to_vec(),
                data: a.iter().map(|&x| WireFloat(x)).collect(),
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ParamValueRepr::deserialize(deserializer)? {
            ParamValueRepr::Scalar(x) => Ok(ParamValue::Scalar(x.0)),
            ParamValueRepr::Array { dim, data } => {
                let data = data.into_iter().map(|x| x.0).collect();
                ArrayD::from_shape_vec(IxDyn(&dim), data)
                    .map(ParamValue::Array)
                    .map_err(de::Error::custom)
            }
        }
    }
}
