use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use warrantly_core::domain::customer::Customer;
use warrantly_core::domain::order::Order;
use warrantly_core::domain::product::{Product, ProductId};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read dataset file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse dataset file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("embedded dataset file `{file}` is malformed: {source}")]
    Embedded { file: &'static str, source: serde_json::Error },
}

/// The full warranty dataset for one deployment: customers, products, orders,
/// and the FAQ knowledge document. Loaded once at bootstrap and shared
/// read-only for the process lifetime.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub faq_document: String,
}

impl Dataset {
    pub const CUSTOMERS_FILE: &'static str = "customers.json";
    pub const PRODUCTS_FILE: &'static str = "products.json";
    pub const ORDERS_FILE: &'static str = "orders.json";
    pub const FAQ_FILE: &'static str = "faq_document.txt";

    /// Embedded demo dataset, compiled in so the binary works without a
    /// fixtures directory on disk.
    pub fn builtin() -> Result<Self, DatasetError> {
        let customers = parse_embedded(
            Self::CUSTOMERS_FILE,
            include_str!("../../../config/fixtures/customers.json"),
        )?;
        let products = parse_embedded(
            Self::PRODUCTS_FILE,
            include_str!("../../../config/fixtures/products.json"),
        )?;
        let orders = parse_embedded(
            Self::ORDERS_FILE,
            include_str!("../../../config/fixtures/orders.json"),
        )?;
        let faq_document =
            include_str!("../../../config/fixtures/faq_document.txt").to_string();

        Ok(Self { customers, products, orders, faq_document })
    }

    pub fn load_dir(dir: &Path) -> Result<Self, DatasetError> {
        let customers = parse_file(&dir.join(Self::CUSTOMERS_FILE))?;
        let products = parse_file(&dir.join(Self::PRODUCTS_FILE))?;
        let orders = parse_file(&dir.join(Self::ORDERS_FILE))?;
        let faq_document = read_text(&dir.join(Self::FAQ_FILE))?;

        Ok(Self { customers, products, orders, faq_document })
    }

    /// Finds an order only when both identifiers agree, mirroring the lookup
    /// contract: a right order id with the wrong customer is a miss.
    pub fn order(&self, order_id: &str, customer_id: &str) -> Option<&Order> {
        self.orders
            .iter()
            .find(|order| order.order_id.0 == order_id && order.customer_id.0 == customer_id)
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.product_id == *product_id)
    }
}

fn parse_embedded<T>(file: &'static str, raw: &str) -> Result<Vec<T>, DatasetError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(raw).map_err(|source| DatasetError::Embedded { file, source })
}

fn parse_file<T>(path: &Path) -> Result<Vec<T>, DatasetError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = read_text(path)?;
    serde_json::from_str(&raw)
        .map_err(|source| DatasetError::ParseFile { path: path.to_path_buf(), source })
}

fn read_text(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path)
        .map_err(|source| DatasetError::ReadFile { path: path.to_path_buf(), source })
}
