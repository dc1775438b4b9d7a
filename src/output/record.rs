//! The product record produced by extraction and consumed by every sink

use serde::{Deserialize, Serialize};

/// Column names shared by the CSV header and the JSON object keys
pub const COLUMNS: [&str; 5] = [
    "Brand",
    "Product_Name",
    "Former_Price",
    "Current_Price",
    "Discount",
];

/// One product observation from a catalog page
///
/// Every field is independently optional; a missing brand never prevents
/// the prices from being recorded and vice versa.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Brand")]
    pub brand: Option<String>,

    #[serde(rename = "Product_Name")]
    pub product_name: Option<String>,

    #[serde(rename = "Former_Price")]
    pub former_price: Option<f64>,

    #[serde(rename = "Current_Price")]
    pub current_price: Option<f64>,

    /// Discount in whole percent
    #[serde(rename = "Discount")]
    pub discount: Option<u32>,
}

impl ProductRecord {
    /// Renders the record as CSV cells in `COLUMNS` order; `None` becomes an empty cell
    pub fn to_csv_fields(&self) -> [String; 5] {
        [
            self.brand.clone().unwrap_or_default(),
            self.product_name.clone().unwrap_or_default(),
            self.former_price.map(|p| p.to_string()).unwrap_or_default(),
            self.current_price.map(|p| p.to_string()).unwrap_or_default(),
            self.discount.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}
