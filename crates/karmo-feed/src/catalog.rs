//! The fetch → parse → merge pipeline behind every catalog query.

use karmo_core::Product;

use crate::client::FeedClient;
use crate::error::FeedError;
use crate::parse::parse_products;
use crate::stock::{merge_stock, parse_stock_feed};

/// Fetches and assembles one full catalog snapshot.
///
/// When a stock feed is configured, both documents are requested
/// concurrently and the pipeline proceeds only once both complete; a
/// failure in either aborts the whole query. There is no caching — every
/// call hits the upstream from scratch, by contract.
///
/// # Errors
///
/// Any [`FeedError`] from fetching or parsing either document.
pub async fn fetch_merged_catalog(
    client: &FeedClient,
    feed_url: &str,
    stock_feed_url: Option<&str>,
) -> Result<Vec<Product>, FeedError> {
    match stock_feed_url {
        Some(stock_url) => {
            let (catalog_doc, stock_doc) = tokio::try_join!(
                client.fetch_document(feed_url),
                client.fetch_document(stock_url),
            )?;
            let mut products = parse_products(&catalog_doc)?;
            let records = parse_stock_feed(&stock_doc)?;
            merge_stock(&mut products, records);
            tracing::debug!(
                products = products.len(),
                "catalog snapshot assembled with stock overlay"
            );
            Ok(products)
        }
        None => {
            let catalog_doc = client.fetch_document(feed_url).await?;
            let products = parse_products(&catalog_doc)?;
            tracing::debug!(products = products.len(), "catalog snapshot assembled");
            Ok(products)
        }
    }
}
