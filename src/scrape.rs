use futures::future;
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::config::Endpoints;
use crate::error::CossError;
use crate::extract;
use crate::sku;

/// Site-reported availability for a product variant.
///
/// The checkout endpoint reports `inStock` for purchasable items; every
/// other value (`outOfStock`, `backorder`, empty string, ...) means the
/// item cannot be bought right now, and the raw value is kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    Other(String),
}

impl StockStatus {
    pub fn from_raw(raw: &str) -> Self {
        if raw == "inStock" {
            StockStatus::InStock
        } else {
            StockStatus::Other(raw.to_string())
        }
    }

    pub fn is_in_stock(&self) -> bool {
        matches!(self, StockStatus::InStock)
    }
}

/// One fully resolved product. Built once per run, rendered into the
/// digest, then dropped; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Product {
    /// The configured id, as it appears in the product page URL.
    pub id: String,
    pub name: String,
    /// Normalized 9-character variant code used by the stock endpoint.
    pub product_id: String,
    /// Price and currency as displayed, e.g. `499.00 SEK`.
    pub price: String,
    /// Product photo, fetched inline and embedded.
    pub image: Vec<u8>,
    pub status: StockStatus,
}

pub struct CoScraper {
    client: Client,
    endpoints: Endpoints,
}

impl CoScraper {
    pub fn new(endpoints: Endpoints) -> Result<Self, CossError> {
        // Certificate validation is intentionally disabled, carried over
        // from the original deployment. Known weakness.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(CossError::Client)?;
        Ok(Self { client, endpoints })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CossError> {
        let response = self.client.get(url).send().await.map_err(|e| CossError::Http {
            url: url.to_string(),
            source: e,
        })?;
        if !response.status().is_success() {
            return Err(CossError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await.map_err(|e| CossError::Http {
            url: url.to_string(),
            source: e,
        })?;
        Ok(body.to_vec())
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, CossError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| CossError::Data(format!("invalid JSON from {url}: {e}")))
    }

    /// Run the full pipeline for one configured product id: fetch the
    /// product page, extract the embedded data, normalize the variant code,
    /// resolve live stock status, fetch the photo.
    #[instrument(skip(self))]
    pub async fn check_product(&self, id: &str) -> Result<Product, CossError> {
        let page_url = format!("{}{}", self.endpoints.product_base, id);
        let html = self.fetch(&page_url).await?;
        let info = extract::extract_product_info(&String::from_utf8_lossy(&html))?;

        let raw_id = extract::required_str(&info, "productId")?;
        let product_id = sku::normalize_product_id(raw_id);

        let stock_url = Url::parse_with_params(
            &self.endpoints.stock_endpoint,
            &[("variantProductCode", product_id.as_str())],
        )
        .map_err(|e| CossError::Data(format!("bad stock endpoint url: {e}")))?;
        let stock = self.fetch_json(stock_url.as_str()).await?;
        let raw_status = stock
            .get("webStockStatus")
            .and_then(Value::as_str)
            .ok_or(CossError::MissingField("webStockStatus"))?;
        let status = StockStatus::from_raw(raw_status);

        let image_url = format!(
            "{}{}",
            self.endpoints.image_base,
            extract::required_str(&info, "image")?
        );
        let image = self.fetch(&image_url).await?;

        let offers = extract::required_object(&info, "offers")?;
        let price = format!(
            "{} {}",
            extract::display_value(offers, "price")?,
            extract::display_value(offers, "priceCurrency")?
        );
        let name = extract::required_str(&info, "name")?.to_string();

        tracing::info!(
            product_id = %product_id,
            name = %name,
            price = %price,
            status = ?status,
            "Resolved product"
        );

        Ok(Product {
            id: id.to_string(),
            name,
            product_id,
            price,
            image,
            status,
        })
    }

    /// Check every configured product concurrently over the shared client.
    ///
    /// Results come back in input order regardless of completion order, and
    /// a failure occupies its own slot without touching its siblings.
    #[instrument(skip_all, fields(products = ids.len()))]
    pub async fn check_all(&self, ids: &[String]) -> Vec<Result<Product, CossError>> {
        future::join_all(ids.iter().map(|id| self.check_product(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_in_stock_counts_as_available() {
        assert!(StockStatus::from_raw("inStock").is_in_stock());
        for raw in ["outOfStock", "", "backorder", "InStock", "instock"] {
            assert!(!StockStatus::from_raw(raw).is_in_stock(), "raw {raw:?}");
        }
    }

    #[test]
    fn other_statuses_keep_the_raw_value() {
        assert_eq!(
            StockStatus::from_raw("backorder"),
            StockStatus::Other("backorder".into())
        );
    }
}
