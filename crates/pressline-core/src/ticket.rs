//! # Ticket Composition
//!
//! In-memory drafting of detailed tickets before anything is persisted.
//!
//! ## Composition Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ticket Drafting Flow                                 │
//! │                                                                         │
//! │  Counter Action             Draft Operation        Totals               │
//! │  ──────────────             ───────────────        ──────               │
//! │                                                                         │
//! │  Pick variant, count ──────► add_line()       ───► recompute            │
//! │                                                                         │
//! │  Change count ─────────────► set_quantity()   ───► recompute            │
//! │                                                                         │
//! │  Tag color/pattern/... ────► attach modifiers ───► (price unchanged)    │
//! │                                                                         │
//! │  Remove row ───────────────► remove_line()    ───► recompute            │
//! │                                                                         │
//! │  Create ticket ────────────► finalize check: at least one line          │
//! │                                                                         │
//! │  A drafting session holds up to MAX_TICKET_TABS (3) independent tabs,  │
//! │  one per quick-ticket slot; each tab becomes its own ticket row.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Contract
//! `subtotal = Σ quantity × unit_price`
//! `total = subtotal − deductions + tax(10% of subtotal) + delivery_fee`
//!
//! Modifiers (colors, patterns, textures, upcharges) describe the garment
//! but never change the line price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::{MAX_LINE_QUANTITY, MAX_TICKET_TABS};

// =============================================================================
// Draft Lines
// =============================================================================

/// Modifier selections attached to a single draft line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineModifiers {
    pub color_ids: Vec<i64>,
    pub pattern_ids: Vec<i64>,
    pub texture_ids: Vec<i64>,
    pub upcharge_ids: Vec<i64>,
}

impl LineModifiers {
    /// True when no modifier of any kind is attached.
    pub fn is_empty(&self) -> bool {
        self.color_ids.is_empty()
            && self.pattern_ids.is_empty()
            && self.texture_ids.is_empty()
            && self.upcharge_ids.is_empty()
    }
}

/// One line of a draft ticket: a garment variant at a frozen unit price.
///
/// ## Price Freezing
/// The unit price is captured when the line is added. Catalog price
/// changes after that point do not affect this draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    pub garment_variant_id: i64,
    /// Variant name at the time of adding (frozen, for the tag).
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    #[serde(default)]
    pub modifiers: LineModifiers,
}

impl DraftLine {
    /// Line total before tax (unit price × quantity).
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Draft Ticket (one tab)
// =============================================================================

/// Computed totals for one draft tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTotals {
    pub subtotal_cents: i64,
    pub deductions_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
}

/// A draft detailed ticket: the state of one composition tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    pub ticket_type_id: i64,
    pub pieces: i64,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<DraftLine>,
    /// Coupon/discount deductions applied to this tab.
    #[serde(default)]
    pub deductions_cents: i64,
}

impl TicketDraft {
    /// Creates an empty draft for a ticket type.
    pub fn new(ticket_type_id: i64, pieces: i64, due_date: DateTime<Utc>) -> Self {
        TicketDraft {
            ticket_type_id,
            pieces,
            due_date,
            notes: None,
            lines: Vec::new(),
            deductions_cents: 0,
        }
    }

    /// Appends a line item.
    ///
    /// Lines are not merged by variant: two batches of the same variant
    /// with different colors stay separate rows, exactly as they hang
    /// on the rail.
    pub fn add_line(
        &mut self,
        garment_variant_id: i64,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> CoreResult<usize> {
        if quantity < 1 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines.push(DraftLine {
            garment_variant_id,
            name: name.into(),
            unit_price_cents: unit_price.cents(),
            quantity,
            modifiers: LineModifiers::default(),
        });
        Ok(self.lines.len() - 1)
    }

    /// Updates the quantity of a line; quantity 0 removes it.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(index);
        }
        if quantity < 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound(index as i64))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line item.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound(index as i64));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Attaches modifier selections to a line. Repeated attaches extend
    /// the selection; duplicates are dropped.
    pub fn attach_modifiers(&mut self, index: usize, extra: LineModifiers) -> CoreResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound(index as i64))?;

        for id in extra.color_ids {
            if !line.modifiers.color_ids.contains(&id) {
                line.modifiers.color_ids.push(id);
            }
        }
        for id in extra.pattern_ids {
            if !line.modifiers.pattern_ids.contains(&id) {
                line.modifiers.pattern_ids.push(id);
            }
        }
        for id in extra.texture_ids {
            if !line.modifiers.texture_ids.contains(&id) {
                line.modifiers.texture_ids.push(id);
            }
        }
        for id in extra.upcharge_ids {
            if !line.modifiers.upcharge_ids.contains(&id) {
                line.modifiers.upcharge_ids.push(id);
            }
        }
        Ok(())
    }

    /// Sum of all line totals, before tax and deductions.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// Computes the tab's totals.
    ///
    /// `total = subtotal − deductions + tax + delivery_fee`
    pub fn totals(&self, tax_rate: TaxRate, delivery_fee: Money) -> TicketTotals {
        let subtotal = self.subtotal();
        let deductions = Money::from_cents(self.deductions_cents);
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal - deductions + tax + delivery_fee;

        TicketTotals {
            subtotal_cents: subtotal.cents(),
            deductions_cents: deductions.cents(),
            tax_cents: tax.cents(),
            delivery_fee_cents: delivery_fee.cents(),
            total_cents: total.cents(),
        }
    }

    /// Checks the draft is fit to become a ticket.
    pub fn ensure_ready(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyTicket);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Drafting Workspace (tab set)
// =============================================================================

/// A drafting session: up to [`MAX_TICKET_TABS`] tabs, one per quick
/// ticket slot. Each occupied tab turns into one ticket row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketWorkspace {
    tabs: Vec<TicketDraft>,
}

impl TicketWorkspace {
    pub fn new() -> Self {
        TicketWorkspace { tabs: Vec::new() }
    }

    /// Adds a tab, rejecting more than the maximum.
    pub fn add_tab(&mut self, draft: TicketDraft) -> CoreResult<usize> {
        if self.tabs.len() >= MAX_TICKET_TABS {
            return Err(CoreError::TabOutOfRange {
                index: self.tabs.len(),
                max: MAX_TICKET_TABS,
            });
        }
        self.tabs.push(draft);
        Ok(self.tabs.len() - 1)
    }

    pub fn tab(&self, index: usize) -> CoreResult<&TicketDraft> {
        self.tabs.get(index).ok_or(CoreError::TabOutOfRange {
            index,
            max: MAX_TICKET_TABS,
        })
    }

    pub fn tab_mut(&mut self, index: usize) -> CoreResult<&mut TicketDraft> {
        self.tabs.get_mut(index).ok_or(CoreError::TabOutOfRange {
            index,
            max: MAX_TICKET_TABS,
        })
    }

    pub fn tabs(&self) -> &[TicketDraft] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Validates every tab is ready for creation.
    ///
    /// A workspace with no tabs, or any tab without garments, is
    /// rejected before anything is written.
    pub fn ensure_ready(&self) -> CoreResult<()> {
        if self.tabs.is_empty() {
            return Err(CoreError::EmptyTicket);
        }
        for tab in &self.tabs {
            tab.ensure_ready()?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::FLAT_TAX;

    fn draft_with_lines() -> TicketDraft {
        let mut draft = TicketDraft::new(1, 5, Utc::now());
        draft
            .add_line(10, "Shirt / Long Sleeve", Money::from_cents(299), 3)
            .unwrap();
        draft
            .add_line(11, "Pants / Slacks", Money::from_cents(550), 2)
            .unwrap();
        draft
    }

    #[test]
    fn test_subtotal_is_quantity_times_price() {
        let draft = draft_with_lines();
        // 3 × 299 + 2 × 550 = 897 + 1100
        assert_eq!(draft.subtotal().cents(), 1997);
    }

    #[test]
    fn test_totals_apply_flat_tax_and_delivery_fee() {
        let draft = draft_with_lines();
        let totals = draft.totals(FLAT_TAX, Money::from_cents(500));

        assert_eq!(totals.subtotal_cents, 1997);
        // 10% of 1997 = 199.7 → 200
        assert_eq!(totals.tax_cents, 200);
        assert_eq!(totals.delivery_fee_cents, 500);
        assert_eq!(totals.total_cents, 1997 + 200 + 500);
    }

    #[test]
    fn test_totals_subtract_deductions() {
        let mut draft = draft_with_lines();
        draft.deductions_cents = 500;
        let totals = draft.totals(FLAT_TAX, Money::zero());

        // Tax is computed on the subtotal, not the deducted amount
        assert_eq!(totals.total_cents, 1997 - 500 + 200);
    }

    #[test]
    fn test_quantity_edit_recomputes() {
        let mut draft = draft_with_lines();
        draft.set_quantity(0, 10).unwrap();
        assert_eq!(draft.subtotal().cents(), 10 * 299 + 2 * 550);
    }

    #[test]
    fn test_quantity_zero_removes_line() {
        let mut draft = draft_with_lines();
        draft.set_quantity(0, 0).unwrap();
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.subtotal().cents(), 1100);
    }

    #[test]
    fn test_quantity_bounds() {
        let mut draft = TicketDraft::new(1, 0, Utc::now());
        let err = draft.add_line(10, "Shirt", Money::from_cents(100), 1000);
        assert!(matches!(err, Err(CoreError::QuantityTooLarge { .. })));
    }

    #[test]
    fn test_modifiers_do_not_change_totals() {
        let mut draft = draft_with_lines();
        let before = draft.totals(FLAT_TAX, Money::zero());

        draft
            .attach_modifiers(
                0,
                LineModifiers {
                    color_ids: vec![1, 2],
                    upcharge_ids: vec![9],
                    ..Default::default()
                },
            )
            .unwrap();

        let after = draft.totals(FLAT_TAX, Money::zero());
        assert_eq!(before, after);
        assert!(!draft.lines[0].modifiers.is_empty());
    }

    #[test]
    fn test_attach_modifiers_deduplicates() {
        let mut draft = draft_with_lines();
        let extra = LineModifiers {
            color_ids: vec![1],
            ..Default::default()
        };
        draft.attach_modifiers(0, extra.clone()).unwrap();
        draft.attach_modifiers(0, extra).unwrap();
        assert_eq!(draft.lines[0].modifiers.color_ids, vec![1]);
    }

    #[test]
    fn test_empty_draft_rejected() {
        let draft = TicketDraft::new(1, 0, Utc::now());
        assert!(matches!(draft.ensure_ready(), Err(CoreError::EmptyTicket)));
    }

    #[test]
    fn test_workspace_tab_limit() {
        let mut ws = TicketWorkspace::new();
        for _ in 0..3 {
            ws.add_tab(TicketDraft::new(1, 0, Utc::now())).unwrap();
        }
        let err = ws.add_tab(TicketDraft::new(1, 0, Utc::now()));
        assert!(matches!(err, Err(CoreError::TabOutOfRange { .. })));
    }

    #[test]
    fn test_workspace_rejects_empty_tab() {
        let mut ws = TicketWorkspace::new();
        ws.add_tab(draft_with_lines()).unwrap();
        ws.add_tab(TicketDraft::new(2, 0, Utc::now())).unwrap();
        assert!(matches!(ws.ensure_ready(), Err(CoreError::EmptyTicket)));
    }
}
