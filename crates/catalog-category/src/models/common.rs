//! Common serde helpers shared by the category API models

use serde::{Deserialize, Deserializer};

/// Deserialize a field that must distinguish "absent" from "null".
///
/// Plain `Option<Option<T>>` collapses JSON `null` into the outer
/// `None`; with this helper plus `#[serde(default)]`, an absent field
/// is `None`, an explicit `null` is `Some(None)`, and a value is
/// `Some(Some(v))`. The update endpoint relies on this tri-state for
/// `parentId` (absent = leave alone, null = detach to root).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
