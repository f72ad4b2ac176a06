//! Catalog domain: tariffs and the storefront product mapping.

mod product_catalog;
mod tariff;

pub use product_catalog::{CatalogEntry, ProductCatalog};
pub use tariff::Tariff;
