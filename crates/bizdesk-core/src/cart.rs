//! # Cart / Invoice Draft
//!
//! Owns the lines that the POS checkout and the invoicing page feed into
//! the totals calculator.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Page Action              Cart Method             Line Change           │
//! │  ───────────              ───────────             ───────────           │
//! │                                                                         │
//! │  Pick part ──────────────► add_line() ──────────► push or qty += n      │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► qty = n (0 removes)   │
//! │                                                                         │
//! │  Edit discount ──────────► set_discount() ──────► discount = d          │
//! │                                                                         │
//! │  Toggle "price incl. tax" ► set_tax_inclusive() ► flag = b             │
//! │                                                                         │
//! │  Clear ──────────────────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  Render totals ──────────► lines() ─────────────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations happen between computations, never during one: the calculator
//! only ever sees `&[LineItem]`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{LineItem, TaxMode, TaxRateId};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// Lines being edited on a POS checkout or an invoice draft.
///
/// ## Invariants
/// - Lines with a `part_id` are unique by `part_id` (adding the same part
///   increases its quantity)
/// - Quantity is > 0 (setting 0 removes the line)
/// - At most `MAX_CART_LINES` lines, each at most `MAX_LINE_QUANTITY`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<LineItem>,

    /// Pricing mode applied to newly added lines.
    default_tax_mode: TaxMode,

    /// When the cart was created/last cleared.
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart; new lines use `default_tax_mode`.
    pub fn new(default_tax_mode: TaxMode) -> Self {
        Cart {
            lines: Vec::new(),
            default_tax_mode,
            created_at: Utc::now(),
        }
    }

    /// Adds a part or increases its quantity if already present.
    ///
    /// An existing line keeps its price, discount, and rate; only the
    /// quantity grows.
    pub fn add_line(
        &mut self,
        part_id: &str,
        quantity: Decimal,
        sale_price: Decimal,
        tax_rate_id: Option<TaxRateId>,
    ) -> CoreResult<()> {
        check_quantity(quantity)?;

        if let Some(line) = self.find_mut(part_id) {
            let new_qty = line.quantity + quantity;
            check_quantity(new_qty)?;
            line.quantity = new_qty;
            debug!(part_id, quantity = %new_qty, "Increased cart line quantity");
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }

        let mut line = LineItem::new(quantity, sale_price)
            .with_part(part_id)
            .with_tax_mode(self.default_tax_mode);
        line.tax_rate_id = tax_rate_id;
        self.lines.push(line);
        debug!(part_id, lines = self.lines.len(), "Added cart line");
        Ok(())
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, part_id: &str, quantity: Decimal) -> CoreResult<()> {
        if quantity.is_zero() {
            return self.remove_line(part_id);
        }
        check_quantity(quantity)?;

        let line = self.line_mut(part_id)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Sets a line's discount amount.
    pub fn set_discount(&mut self, part_id: &str, discount: Decimal) -> CoreResult<()> {
        if discount.is_sign_negative() {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: "0".to_string(),
                max: "line amount".to_string(),
            }
            .into());
        }

        let line = self.line_mut(part_id)?;
        line.discount_amount = discount;
        Ok(())
    }

    /// Marks a line's price as tax-inclusive or exclusive.
    pub fn set_tax_inclusive(&mut self, part_id: &str, inclusive: bool) -> CoreResult<()> {
        self.line_mut(part_id)?.is_tax_inclusive = inclusive;
        Ok(())
    }

    /// Points a line at another tax rate (or at the fallback with `None`).
    pub fn set_tax_rate(&mut self, part_id: &str, tax_rate_id: Option<TaxRateId>) -> CoreResult<()> {
        self.line_mut(part_id)?.tax_rate_id = tax_rate_id;
        Ok(())
    }

    /// Removes a line by part id.
    pub fn remove_line(&mut self, part_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.part_id.as_deref() != Some(part_id));

        if self.lines.len() == initial_len {
            Err(CoreError::PartNotInCart(part_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> Decimal {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn default_tax_mode(&self) -> TaxMode {
        self.default_tax_mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn find_mut(&mut self, part_id: &str) -> Option<&mut LineItem> {
        self.lines
            .iter_mut()
            .find(|l| l.part_id.as_deref() == Some(part_id))
    }

    fn line_mut(&mut self, part_id: &str) -> CoreResult<&mut LineItem> {
        self.find_mut(part_id)
            .ok_or_else(|| CoreError::PartNotInCart(part_id.to_string()))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new(TaxMode::default())
    }
}

fn check_quantity(quantity: Decimal) -> CoreResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    if quantity > Decimal::from(MAX_LINE_QUANTITY) {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity.to_string(),
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TaxRateTable;
    use crate::rate::RawPercentage;
    use crate::totals::compute_totals;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_cart_add_line() {
        let mut cart = Cart::default();
        cart.add_line("P-1", d(2), Decimal::new(999, 2), None).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), d(2));
        assert_eq!(cart.lines()[0].line_total(), Decimal::new(1998, 2));
        assert!(!cart.lines()[0].is_tax_inclusive);
    }

    #[test]
    fn test_cart_add_same_part_increases_quantity() {
        let mut cart = Cart::default();
        cart.add_line("P-1", d(2), d(10), None).unwrap();
        cart.add_line("P-1", d(3), d(99), None).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), d(5));
        assert_eq!(cart.lines()[0].sale_price, d(10));
    }

    #[test]
    fn test_cart_uses_default_tax_mode() {
        let mut cart = Cart::new(TaxMode::Inclusive);
        cart.add_line("P-1", d(1), d(112), None).unwrap();
        assert!(cart.lines()[0].is_tax_inclusive);

        cart.set_tax_inclusive("P-1", false).unwrap();
        assert!(!cart.lines()[0].is_tax_inclusive);
    }

    #[test]
    fn test_cart_quantity_limits() {
        let mut cart = Cart::default();
        assert!(cart.add_line("P-1", d(0), d(1), None).is_err());
        assert!(matches!(
            cart.add_line("P-1", d(MAX_LINE_QUANTITY + 1), d(1), None),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        cart.add_line("P-1", d(MAX_LINE_QUANTITY), d(1), None).unwrap();
        assert!(cart.add_line("P-1", d(1), d(1), None).is_err());
        assert_eq!(cart.total_quantity(), d(MAX_LINE_QUANTITY));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::default();
        for i in 0..MAX_CART_LINES {
            cart.add_line(&format!("P-{}", i), d(1), d(1), None).unwrap();
        }
        assert!(matches!(
            cart.add_line("one-too-many", d(1), d(1), None),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_cart_update_and_remove() {
        let mut cart = Cart::default();
        cart.add_line("P-1", d(1), d(10), None).unwrap();

        cart.update_quantity("P-1", d(4)).unwrap();
        assert_eq!(cart.total_quantity(), d(4));

        cart.update_quantity("P-1", d(0)).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.remove_line("P-1"),
            Err(CoreError::PartNotInCart(_))
        ));
    }

    #[test]
    fn test_cart_discount_and_rate_edits_feed_totals() {
        let mut cart = Cart::default();
        cart.add_line("P-1", d(1), d(50), Some(TaxRateId::from("vat"))).unwrap();
        cart.set_discount("P-1", d(5)).unwrap();
        cart.set_tax_inclusive("P-1", true).unwrap();
        assert!(cart.set_discount("P-1", d(-1)).is_err());

        let rates: TaxRateTable = vec![("vat", RawPercentage::from(d(12)))].into_iter().collect();
        let totals = compute_totals(cart.lines(), &rates, &RawPercentage::Missing);
        assert_eq!(totals.tax_total.cents(), 482);

        cart.set_tax_rate("P-1", None).unwrap();
        let totals = compute_totals(cart.lines(), &rates, &RawPercentage::Missing);
        assert!(totals.tax_total.is_zero());
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::default();
        cart.add_line("P-1", d(2), d(10), None).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }
}
