use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` the same as a missing field.
///
/// Use together with `#[serde(default)]` so the key may also be absent.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
