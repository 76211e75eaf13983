//! Order statuses, the validated cart, and checkout pricing.
//!
//! Checkout is a pure transformation: a [`Cart`] plus the listings it
//! resolved to becomes an [`OrderDraft`] with frozen per-line price/format
//! snapshots, the total, the derived status and the distinct sellers to
//! notify. Persisting the draft is the caller's job.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{amount_limit, ListingFormat};
use crate::error::{CoreError, CODE_EMPTY_CART, CODE_INVALID_ITEMS, CODE_INVALID_STATUS};
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_SHIPPED: &str = "shipped";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_FULFILLED: &str = "fulfilled";
pub const STATUS_CANCELED: &str = "canceled";
pub const STATUS_REFUNDED: &str = "refunded";

/// All valid order status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PAID,
    STATUS_PROCESSING,
    STATUS_SHIPPED,
    STATUS_DELIVERED,
    STATUS_FULFILLED,
    STATUS_CANCELED,
    STATUS_REFUNDED,
];

/// Lifecycle state of an order.
///
/// `Processing` and `Fulfilled` are assigned automatically at checkout; every
/// other transition is an admin action and is not restricted to a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Fulfilled,
    Canceled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::Paid => STATUS_PAID,
            OrderStatus::Processing => STATUS_PROCESSING,
            OrderStatus::Shipped => STATUS_SHIPPED,
            OrderStatus::Delivered => STATUS_DELIVERED,
            OrderStatus::Fulfilled => STATUS_FULFILLED,
            OrderStatus::Canceled => STATUS_CANCELED,
            OrderStatus::Refunded => STATUS_REFUNDED,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_PAID => Ok(OrderStatus::Paid),
            STATUS_PROCESSING => Ok(OrderStatus::Processing),
            STATUS_SHIPPED => Ok(OrderStatus::Shipped),
            STATUS_DELIVERED => Ok(OrderStatus::Delivered),
            STATUS_FULFILLED => Ok(OrderStatus::Fulfilled),
            STATUS_CANCELED => Ok(OrderStatus::Canceled),
            STATUS_REFUNDED => Ok(OrderStatus::Refunded),
            other => Err(CoreError::validation(
                CODE_INVALID_STATUS,
                format!(
                    "Invalid status '{other}'. Must be one of: {}",
                    VALID_STATUSES.join(", ")
                ),
            )),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The status an order gets at checkout: `fulfilled` when every line is
/// digital (nothing to ship), `processing` otherwise.
pub fn derive_initial_status<I>(formats: I) -> OrderStatus
where
    I: IntoIterator<Item = ListingFormat>,
{
    let mut any_line = false;
    for format in formats {
        any_line = true;
        if format != ListingFormat::Digital {
            return OrderStatus::Processing;
        }
    }
    if any_line {
        OrderStatus::Fulfilled
    } else {
        OrderStatus::Processing
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// One validated cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub listing_id: DbId,
    pub qty: i32,
}

/// A non-empty list of cart lines, each with a positive quantity.
///
/// The only way to build one is through [`Cart::new`] or
/// [`Cart::from_raw_quantities`], so holding a `Cart` proves the input was
/// validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Result<Self, CoreError> {
        if lines.is_empty() {
            return Err(CoreError::validation(CODE_EMPTY_CART, "Cart is empty"));
        }
        if let Some(bad) = lines.iter().find(|l| l.qty <= 0) {
            return Err(CoreError::validation(
                CODE_INVALID_ITEMS,
                format!(
                    "Quantity for listing {} must be a positive integer",
                    bad.listing_id
                ),
            ));
        }
        Ok(Self { lines })
    }

    /// Build a cart from untyped client quantities.
    ///
    /// Quantities must be finite, whole and in `1..=i32::MAX`; a missing
    /// quantity is invalid.
    pub fn from_raw_quantities<I>(raw: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (DbId, Option<f64>)>,
    {
        let mut lines = Vec::new();
        for (listing_id, qty) in raw {
            let qty = qty.and_then(whole_quantity).ok_or_else(|| {
                CoreError::validation(
                    CODE_INVALID_ITEMS,
                    format!("Quantity for listing {listing_id} must be a positive integer"),
                )
            })?;
            lines.push(CartLine { listing_id, qty });
        }
        Self::new(lines)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Distinct listing ids in ascending order, for a single batch lookup.
    pub fn listing_ids(&self) -> Vec<DbId> {
        self.lines
            .iter()
            .map(|l| l.listing_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn whole_quantity(qty: f64) -> Option<i32> {
    if !qty.is_finite() || qty.fract() != 0.0 || qty < 1.0 || qty > f64::from(i32::MAX) {
        return None;
    }
    // Range and integrality checked above.
    Some(qty as i32)
}

// ---------------------------------------------------------------------------
// Checkout pricing
// ---------------------------------------------------------------------------

/// The subset of a listing that checkout needs, read at checkout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSnapshot {
    pub listing_id: DbId,
    pub seller_id: DbId,
    pub price: Money,
    pub format: ListingFormat,
}

/// A cart line with its frozen price and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub listing_id: DbId,
    pub qty: i32,
    pub price: Money,
    pub format: ListingFormat,
}

impl PricedLine {
    /// `price × qty`, or `None` on decimal overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.price.checked_mul(Money::from(self.qty))
    }
}

/// Everything needed to persist a new order and fan out its notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub lines: Vec<PricedLine>,
    pub total: Money,
    pub status: OrderStatus,
    /// Distinct sellers owning at least one line, ascending.
    pub seller_ids: Vec<DbId>,
}

/// Price a cart against the listings resolved for it.
///
/// Fails with [`CoreError::ListingNotFound`] naming every unresolved id when
/// any cart line has no matching listing; nothing partial is produced.
pub fn price_cart(cart: &Cart, listings: &[ListingSnapshot]) -> Result<OrderDraft, CoreError> {
    let by_id: HashMap<DbId, &ListingSnapshot> =
        listings.iter().map(|l| (l.listing_id, l)).collect();

    let missing: Vec<DbId> = cart
        .listing_ids()
        .into_iter()
        .filter(|id| !by_id.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::ListingNotFound { ids: missing });
    }

    let mut lines = Vec::with_capacity(cart.lines().len());
    let mut sellers = BTreeSet::new();
    for line in cart.lines() {
        // Presence checked above.
        let Some(listing) = by_id.get(&line.listing_id) else {
            continue;
        };
        sellers.insert(listing.seller_id);
        lines.push(PricedLine {
            listing_id: line.listing_id,
            qty: line.qty,
            price: listing.price,
            format: listing.format,
        });
    }

    let mut total = Money::ZERO;
    for line in &lines {
        total = line
            .subtotal()
            .and_then(|subtotal| total.checked_add(subtotal))
            .filter(|sum| *sum < amount_limit())
            .ok_or_else(|| {
                CoreError::validation(
                    CODE_INVALID_ITEMS,
                    format!("Order total must be less than {}", amount_limit()),
                )
            })?;
    }
    let status = derive_initial_status(lines.iter().map(|l| l.format));

    Ok(OrderDraft {
        lines,
        total,
        status,
        seller_ids: sellers.into_iter().collect(),
    })
}
