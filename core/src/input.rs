use anyhow::{anyhow, Result};

use crate::model::DAY_COUNT;

const DAY_NAMES: [&str; DAY_COUNT as usize] =
    ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Day index from either a number (0 = Monday) or an unambiguous prefix of
/// a day name ("mo", "wed", "sat").
pub fn parse_day(input: &str) -> Result<u8> {
    let input = input.trim().to_lowercase();
    if let Ok(index) = input.parse::<u8>() {
        if index < DAY_COUNT {
            return Ok(index);
        }
        return Err(anyhow!("Day index must be 0-{}, got {}", DAY_COUNT - 1, index));
    }
    if input.is_empty() {
        return Err(anyhow!("Day is required"));
    }

    let full = expand_key(&input, &DAY_NAMES)?;
    DAY_NAMES
        .iter()
        .position(|d| *d == full)
        .map(|i| i as u8)
        .ok_or_else(|| anyhow!("Unknown day: '{}'", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_key() {
        let candidates = vec!["present", "absent"];

        assert_eq!(expand_key("p", &candidates).unwrap(), "present");
        assert_eq!(expand_key("absent", &candidates).unwrap(), "absent");
        assert!(expand_key("x", &candidates).is_err());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("0").unwrap(), 0);
        assert_eq!(parse_day("5").unwrap(), 5);
        assert!(parse_day("6").is_err());

        assert_eq!(parse_day("mon").unwrap(), 0);
        assert_eq!(parse_day("We").unwrap(), 2);
        assert_eq!(parse_day("sat").unwrap(), 5);
        assert_eq!(parse_day("s").unwrap(), 5);

        // tuesday / thursday
        assert!(parse_day("t").is_err());
        assert!(parse_day("sunday").is_err());
        assert!(parse_day("").is_err());
    }
}
