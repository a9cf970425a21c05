pub mod client;
pub mod error;
pub mod normalize;
pub mod token;
pub mod types;

pub use client::ApiloClient;
pub use error::ApiloError;
pub use normalize::normalize_product;
pub use token::TokenSet;
pub use types::{ApiloProduct, ApiloProductsResponse, TokenResponse};
