//! Reference entities that dependent records derive their fields from.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// A product or material category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub display_name: String,
}

/// A product; BOMs and process routes hang off one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(default)]
    pub category: Option<i64>,
}

/// A parameter declared on a category, e.g. `颜色` or `尺寸`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    pub category: i64,
}

/// A value entered for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamValue {
    pub param: i64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub value: String,
}

/// Everything the derivation layer needs to resolve parent references.
///
/// Parameter declaration order is the order of `params`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_non_string_is_coerced_to_empty() {
        let value: ParamValue = serde_json::from_str(r#"{"param": 3, "value": 12}"#).unwrap();
        assert_eq!(value.value, "");

        let value: ParamValue = serde_json::from_str(r#"{"param": 3, "value": null}"#).unwrap();
        assert_eq!(value.value, "");
    }

    #[test]
    fn test_param_value_string_is_kept_verbatim() {
        let value: ParamValue = serde_json::from_str(r#"{"param": 3, "value": " 红 "}"#).unwrap();
        assert_eq!(value.value, " 红 ");
    }

    #[test]
    fn test_reference_data_sections_default_to_empty() {
        let data: ReferenceData = serde_json::from_str(r#"{"products": []}"#).unwrap();
        assert!(data.categories.is_empty());
        assert!(data.params.is_empty());
    }

    #[test]
    fn test_category_missing_display_name() {
        let category: Category = serde_json::from_str(r#"{"id": 1, "code": "CAT1"}"#).unwrap();
        assert_eq!(category.display_name, "");
    }
}
