use serde::{Deserialize, Serialize};

/// Shared 1..=4 priority scale for planned activities and goals.
///
/// Deserializing never fails: numbers are clamped into range, numeric or
/// named strings are accepted, anything else is `Medium`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPriority", into = "u8")]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPriority {
    Missing,
    Whole(i64),
    Fraction(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Priority {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            4 => Some(Priority::Critical),
            _ => None,
        }
    }

    pub fn clamped(value: i64) -> Self {
        Priority::from_id(value.clamp(1, 4) as u8).unwrap_or_default()
    }

    fn from_text(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Priority::clamped(n);
        }
        match raw.to_ascii_lowercase().as_str() {
            "low" => Priority::Low,
            "high" => Priority::High,
            "critical" | "urgent" => Priority::Critical,
            _ => Priority::Medium,
        }
    }
}

impl From<RawPriority> for Priority {
    fn from(raw: RawPriority) -> Self {
        match raw {
            RawPriority::Whole(n) => Priority::clamped(n),
            RawPriority::Fraction(f) if f.is_finite() => Priority::clamped(f.round() as i64),
            RawPriority::Text(s) => Priority::from_text(&s),
            RawPriority::Missing | RawPriority::Fraction(_) | RawPriority::Other(_) => {
                Priority::Medium
            }
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Priority {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn out_of_range_numbers_are_clamped() {
        assert_eq!(parse("5"), Priority::Critical);
        assert_eq!(parse("0"), Priority::Low);
        assert_eq!(parse("-3"), Priority::Low);
        assert_eq!(parse("2.6"), Priority::High);
    }

    #[test]
    fn strings_and_junk_are_accepted() {
        assert_eq!(parse("\"3\""), Priority::High);
        assert_eq!(parse("\"High\""), Priority::High);
        assert_eq!(parse("\"whenever\""), Priority::Medium);
        assert_eq!(parse("null"), Priority::Medium);
        assert_eq!(parse("[1]"), Priority::Medium);
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "4");
    }
}
