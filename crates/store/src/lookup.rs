use std::sync::Arc;

use async_trait::async_trait;
use chrono::Months;

use warrantly_core::capabilities::{
    CapabilityError, Clock, OrderWarranty, SerialLookup, SystemClock, WarrantyLookup,
    WarrantyStatus,
};

use crate::dataset::Dataset;

pub const ORDER_NOT_FOUND: &str = "Order or Customer not found.";
pub const PRODUCT_DETAILS_NOT_FOUND: &str = "Product details not found.";
pub const SERIAL_NOT_IMPLEMENTED: &str = "Serial number lookup is not yet implemented.";

/// Deterministic warranty lookup over the in-memory JSON dataset.
///
/// Misses are data (`OrderWarranty::NotFound` with the user-facing message);
/// only calendar arithmetic overflow is a capability failure.
pub struct FixtureWarrantyLookup<C = SystemClock> {
    dataset: Arc<Dataset>,
    clock: C,
}

impl FixtureWarrantyLookup<SystemClock> {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset, clock: SystemClock }
    }
}

impl<C> FixtureWarrantyLookup<C>
where
    C: Clock,
{
    pub fn with_clock(dataset: Arc<Dataset>, clock: C) -> Self {
        Self { dataset, clock }
    }
}

#[async_trait]
impl<C> WarrantyLookup for FixtureWarrantyLookup<C>
where
    C: Clock,
{
    async fn by_order(
        &self,
        customer_id: &str,
        order_id: &str,
        product_name: &str,
    ) -> Result<OrderWarranty, CapabilityError> {
        tracing::debug!(
            event_name = "lookup.by_order",
            customer_id,
            order_id,
            product_name,
            "querying dataset for order warranty"
        );

        let Some(order) = self.dataset.order(order_id, customer_id) else {
            return Ok(OrderWarranty::NotFound { message: ORDER_NOT_FOUND.to_string() });
        };

        let needle = product_name.to_lowercase();
        let Some(item) =
            order.items.iter().find(|item| item.product_name.to_lowercase().contains(&needle))
        else {
            return Ok(OrderWarranty::NotFound {
                message: format!("Product '{product_name}' not found in order {order_id}."),
            });
        };

        let Some(product) = self.dataset.product(&item.product_id) else {
            return Ok(OrderWarranty::NotFound {
                message: PRODUCT_DETAILS_NOT_FOUND.to_string(),
            });
        };

        let expiry_date = order
            .order_date
            .checked_add_months(Months::new(product.warranty_period_months))
            .ok_or_else(|| {
                CapabilityError::Lookup(format!(
                    "warranty expiry overflows the calendar for order {order_id}"
                ))
            })?;

        // Active strictly before expiry; on the expiry day the warranty is
        // already expired.
        let status = if self.clock.now().date_naive() < expiry_date {
            WarrantyStatus::Active
        } else {
            WarrantyStatus::Expired
        };

        Ok(OrderWarranty::Found { status, expiry_date, order_date: order.order_date })
    }

    async fn by_serial(&self, serial_number: &str) -> Result<SerialLookup, CapabilityError> {
        tracing::debug!(
            event_name = "lookup.by_serial",
            serial_number,
            "querying dataset for serial warranty"
        );
        Ok(SerialLookup { message: SERIAL_NOT_IMPLEMENTED.to_string() })
    }
}
