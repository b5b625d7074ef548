//! Supply readiness gate for installation dispatch.
//!
//! An installation may go out once every purchase order behind its
//! commercial record is in hand. A dispatcher may force it out earlier; the
//! outstanding orders are then recorded on the assignment.

use crate::task::domain::{LogisticsCheck, UserId};
use serde::{Deserialize, Serialize};

/// Lifecycle of a purchase order as reported by the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderState {
    /// Placed with the supplier.
    Ordered,
    /// On its way.
    Shipped,
    /// Delivered to site or store.
    Arrived,
    /// Checked in at the warehouse.
    Received,
}

impl PurchaseOrderState {
    /// Returns whether the goods are available to the installer.
    #[must_use]
    pub const fn is_in_hand(self) -> bool {
        matches!(self, Self::Arrived | Self::Received)
    }
}

/// One purchase order behind a commercial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Supplier-facing order number.
    pub reference: String,
    /// Current state.
    pub state: PurchaseOrderState,
}

impl PurchaseOrder {
    /// Creates an order record.
    #[must_use]
    pub fn new(reference: impl Into<String>, state: PurchaseOrderState) -> Self {
        Self {
            reference: reference.into(),
            state,
        }
    }
}

/// Orders that kept an installation from going out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogisticsShortfall {
    /// References of orders not yet in hand.
    pub outstanding: Vec<String>,
}

/// Applies the gate to `orders`.
///
/// No orders at all counts as ready. `forced_by` names the dispatcher
/// pushing the installation out regardless; it is only recorded when
/// something was actually outstanding.
///
/// # Errors
///
/// Returns the outstanding order references when any order is not in hand
/// and nobody forced the dispatch.
pub fn gate_installation(
    orders: &[PurchaseOrder],
    forced_by: Option<UserId>,
) -> Result<LogisticsCheck, LogisticsShortfall> {
    let outstanding: Vec<String> = orders
        .iter()
        .filter(|order| !order.state.is_in_hand())
        .map(|order| order.reference.clone())
        .collect();

    if outstanding.is_empty() {
        return Ok(LogisticsCheck {
            outstanding_orders: outstanding,
            forced_by: None,
        });
    }
    match forced_by {
        Some(dispatcher) => Ok(LogisticsCheck {
            outstanding_orders: outstanding,
            forced_by: Some(dispatcher),
        }),
        None => Err(LogisticsShortfall { outstanding }),
    }
}
