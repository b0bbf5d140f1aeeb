//! Wire shape of an offer as the remote API publishes it.
//!
//! Every field is optional and decoded leniently: a value of the wrong JSON type
//! becomes `None` instead of failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOffer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) marker_icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) workplace_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) experience_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub(crate) remote_interview: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub(crate) display_offer: Option<bool>,
    #[serde(default, deserialize_with = "skill_names")]
    pub(crate) skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) employment_types: Vec<RawEmploymentType>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEmploymentType {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub(crate) kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub(crate) salary: Option<RawSalary>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) from: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) to: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSalary {
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) from: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) to: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) currency: Option<String>,
}

impl RawEmploymentType {
    /// Salary bounds of this entry, nested `salary` object first, flat fields second.
    pub(crate) fn bounds(&self) -> (Option<f64>, Option<f64>, Option<&str>) {
        match &self.salary {
            Some(salary) if salary.from.is_some() || salary.to.is_some() => {
                (salary.from, salary.to, salary.currency.as_deref())
            }
            _ => (self.from, self.to, self.currency.as_deref()),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::String(text)) => parse_flag(&text),
        _ => None,
    })
}

pub(crate) fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Skill names in source order. Entries are `{"name": ..}` objects or bare strings;
/// anything else is skipped.
fn skill_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };

    // An entry without a usable name still occupies its position.
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => name,
            Value::Object(mut fields) => match fields.remove("name") {
                Some(Value::String(name)) => name,
                _ => String::new(),
            },
            _ => String::new(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_coordinates_and_nested_salary() {
        let raw: RawOffer = serde_json::from_value(json!({
            "title": "Rust Engineer",
            "latitude": "52.2296756",
            "longitude": 21.0122287,
            "skills": [{"name": "Rust", "level": 4}, "Tokio", 7],
            "employment_types": [
                {"type": "b2b", "salary": {"from": 20000, "to": 28000, "currency": "pln"}}
            ]
        }))
        .expect("record decodes");

        assert_eq!(raw.latitude, Some(52.2296756));
        assert_eq!(raw.longitude, Some(21.0122287));
        assert_eq!(raw.skills, vec!["Rust", "Tokio", ""]);
        assert_eq!(
            raw.employment_types[0].bounds(),
            (Some(20000.0), Some(28000.0), Some("pln"))
        );
    }

    #[test]
    fn wrong_types_become_missing() {
        let raw: RawOffer = serde_json::from_value(json!({
            "city": ["not", "a", "city"],
            "latitude": {"deg": 52},
            "remote_interview": "yes",
            "skills": "Rust",
            "employment_types": {"type": "b2b"}
        }))
        .expect("record decodes");

        assert!(raw.city.is_none());
        assert!(raw.latitude.is_none());
        assert_eq!(raw.remote_interview, Some(true));
        assert!(raw.skills.is_empty());
        assert!(raw.employment_types.is_empty());
    }

    #[test]
    fn flat_salary_fields_are_used_when_nested_missing() {
        let entry: RawEmploymentType = serde_json::from_value(json!({
            "type": "permanent",
            "salary": null,
            "from": "9000",
            "to": 12000
        }))
        .expect("entry decodes");
        assert_eq!(entry.bounds(), (Some(9000.0), Some(12000.0), None));
    }
}
