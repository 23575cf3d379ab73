//! serde helpers for the linear algebra types carried by classifiers. Values are written as the
//! u64 bit patterns of their f64s so snapshots round-trip exactly.

use rulinalg::{matrix::Matrix, vector::Vector};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize_vector<S: Serializer>(
    vector: &Vector<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let bits: Vec<u64> = vector.data().iter().map(|&f| f64::to_bits(f)).collect();

    bits.serialize(serializer)
}

pub fn deserialize_vector<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vector<f64>, D::Error> {
    Vec::<u64>::deserialize(deserializer)
        .map(|v| Vector::new(v.into_iter().map(f64::from_bits).collect::<Vec<_>>()))
}

pub fn serialize_cov_mat<S: Serializer>(
    matrix: &Option<Matrix<f64>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let bits: Option<Vec<u64>> = matrix
        .as_ref()
        .map(|m| m.data().iter().map(|&f| f64::to_bits(f)).collect());

    bits.serialize(serializer)
}

pub fn deserialize_cov_mat<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Matrix<f64>>, D::Error> {
    Option::<Vec<u64>>::deserialize(deserializer).map(|v| {
        v.map(|v| {
            let float_data: Vec<f64> = v.into_iter().map(f64::from_bits).collect();

            let n = (float_data.len() as f64).sqrt() as usize;
            debug_assert_eq!(n * n, float_data.len(), "non-square covariance matrix");
            Matrix::new(n, n, float_data)
        })
    })
}
