use serde::{Deserialize, Deserializer};

/// Query values like `?category=` or `?category=%20` mean "no filter".
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    return Ok(Some(trimmed.to_owned()));
}
