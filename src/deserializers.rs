use serde::{Deserialize, Deserializer};

pub fn parse_id(value: &str) -> Result<i64, String> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Wrong value {value}, can not parse to i64"))
}

// the quiz front-end sends ids as numbers or as strings depending on where they come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlexibleId(pub i64);

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(FlexibleId(v)),
            Raw::Text(v) => parse_id(&v).map(FlexibleId).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_from_numbers_and_strings() {
        let ids: Vec<FlexibleId> = serde_json::from_str(r#"[16, "17", " 18 "]"#).unwrap();
        assert_eq!(ids, vec![FlexibleId(16), FlexibleId(17), FlexibleId(18)]);
    }

    #[test]
    fn non_numeric_strings_are_rejected() {
        assert!(serde_json::from_str::<FlexibleId>(r#""art""#).is_err());
        assert!(parse_id("12a").is_err());
    }
}
