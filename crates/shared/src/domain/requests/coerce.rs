//! Lenient deserializers for form-style JSON: numbers may arrive as strings,
//! and `null` or `""` mean "no value".

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    /// `NaN` and infinities are rejected in both forms.
    fn into_number<E: Error>(self) -> Result<Option<f64>, E> {
        let n = match self {
            NumberOrString::Number(n) => n,
            NumberOrString::Text(s) if s.trim().is_empty() => return Ok(None),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, got '{s}'")))?,
        };

        if n.is_finite() {
            Ok(Some(n))
        } else {
            Err(E::custom(format!("expected a finite number, got {n}")))
        }
    }
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .into_number()?
        .ok_or_else(|| D::Error::custom("expected a number"))
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(raw) => raw.into_number(),
        None => Ok(None),
    }
}

pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number(deserializer)?
        .map(|n| {
            if n.is_finite() && n >= 0.0 && n <= f64::from(i32::MAX) {
                Ok(n.round() as i32)
            } else {
                Err(D::Error::custom(format!(
                    "expected a non-negative count, got {n}"
                )))
            }
        })
        .transpose()
}

/// Present-but-empty clears the field: `Some(None)`. Use with `#[serde(default)]`.
pub fn nullable_number<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number(deserializer).map(Some)
}

pub fn nullable_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.filter(|s| !s.is_empty())))
}

/// A present `null` list becomes empty.
pub fn nullable_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(Some(value.unwrap_or_default()))
}

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Listing {
        #[serde(deserialize_with = "number")]
        price: f64,
        #[serde(default, deserialize_with = "optional_number")]
        sale: Option<f64>,
        #[serde(default, deserialize_with = "nullable_number")]
        original: Option<Option<f64>>,
        #[serde(default, deserialize_with = "optional_count")]
        reviews: Option<i32>,
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let listing: Listing =
            serde_json::from_value(json!({ "price": "89.90", "sale": 70, "reviews": "12" }))
                .unwrap();

        assert_eq!(listing.price, 89.9);
        assert_eq!(listing.sale, Some(70.0));
        assert_eq!(listing.reviews, Some(12));
        assert_eq!(listing.original, None);
    }

    #[test]
    fn empty_and_null_optionals_are_absent() {
        let listing: Listing =
            serde_json::from_value(json!({ "price": 10, "sale": "", "original": null })).unwrap();

        assert_eq!(listing.sale, None);
        assert_eq!(listing.original, Some(None));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        assert!(serde_json::from_value::<Listing>(json!({ "price": "cheap" })).is_err());
        assert!(serde_json::from_value::<Listing>(json!({ "price": "" })).is_err());
        assert!(serde_json::from_value::<Listing>(json!({ "price": 1, "reviews": -3 })).is_err());
    }

    #[rstest]
    #[case(json!({ "price": "NaN" }))]
    #[case(json!({ "price": "inf" }))]
    #[case(json!({ "price": "Infinity" }))]
    #[case(json!({ "price": "-inf" }))]
    #[case(json!({ "price": 10, "sale": "NaN" }))]
    #[case(json!({ "price": 10, "original": "infinity" }))]
    #[case(json!({ "price": 10, "reviews": "inf" }))]
    fn non_finite_numbers_are_rejected(#[case] body: serde_json::Value) {
        assert!(serde_json::from_value::<Listing>(body).is_err());
    }
}
