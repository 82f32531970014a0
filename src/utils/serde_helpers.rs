use serde::{Deserialize, Deserializer};

/// Deserializes a value, treating `null` as the type's default.
/// The roster API sends `"directReports": null` for employees without reports.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
