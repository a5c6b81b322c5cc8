//! Seeds go out as JSON integers and come back from either an integer or a numeric string.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(*value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedInput {
        String(String),
        Number(i64),
    }

    match SeedInput::deserialize(deserializer)? {
        SeedInput::String(raw) => raw.trim().parse::<i64>().map_err(D::Error::custom),
        SeedInput::Number(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct SeededRun {
        #[serde(with = "super")]
        seed: i64,
    }

    fn decode(text: &str) -> Result<i64, serde_json::Error> {
        serde_json::from_str::<SeededRun>(text).map(|run| run.seed)
    }

    #[test]
    fn negative_seed_is_written_as_plain_integer() {
        let encoded = serde_json::to_string(&SeededRun { seed: -3 }).expect("serialize seed");
        assert_eq!(encoded, r#"{"seed":-3}"#);
        assert_eq!(decode(&encoded).expect("read back"), -3);
    }

    #[test]
    fn numeric_string_is_trimmed_before_parsing() {
        assert_eq!(decode(r#"{"seed":" 42 "}"#).expect("padded string"), 42);
        assert_eq!(decode(r#"{"seed":"-7"}"#).expect("negative string"), -7);
    }

    #[test]
    fn extreme_values_survive_both_spellings() {
        assert_eq!(decode(&format!(r#"{{"seed":{}}}"#, i64::MIN)).expect("min"), i64::MIN);
        assert_eq!(decode(&format!(r#"{{"seed":"{}"}}"#, i64::MAX)).expect("max"), i64::MAX);
    }

    #[test]
    fn non_numeric_or_fractional_seeds_fail() {
        assert!(decode(r#"{"seed":"abc"}"#).is_err());
        assert!(decode(r#"{"seed":""}"#).is_err());
        assert!(decode(r#"{"seed":1.5}"#).is_err());
        assert!(decode(r#"{"seed":18446744073709551615}"#).is_err());
    }
}
