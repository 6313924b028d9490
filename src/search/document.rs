//! Restaurant document as stored in the search index

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Index field names the query builders rely on
pub mod fields {
    pub const NAME: &str = "name";
    pub const NAME_KEYWORD: &str = "name.keyword";
    pub const DESCRIPTION: &str = "description";
    pub const CUISINE: &str = "cuisine";
    pub const STREET: &str = "address.street";
    pub const CITY: &str = "address.city";
    pub const RATING: &str = "rating";
    pub const DELIVERY_FEE: &str = "deliveryFee";
    pub const DELIVERY_TIME: &str = "deliveryTime";
    pub const IS_OPEN: &str = "isOpen";
    pub const LOCATION: &str = "location";
}

/// Street address of a restaurant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Geo point in the index's `{lat, lon}` object form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A restaurant document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Document ID; filled from the hit `_id` when the source omits it
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cuisine labels; the index may hold a single string or a list
    #[serde(default, deserialize_with = "one_or_many")]
    pub cuisine: Vec<String>,

    /// Average rating on a 0-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<f64>,

    /// Estimated delivery time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Source fields this struct does not model, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null => Vec::new(),
    })
}
