//! Cart store
//!
//! In-memory session cart. Explicitly scoped and dependency-injected: the
//! application owns one `CartStore` per session and hands it to whatever
//! needs it; there is no ambient global and no persistence across restarts.
//!
//! Line identity is asymmetric by design and pinned by tests: `add`
//! deduplicates on (item id, serialized selected-options), while
//! `inc`/`dec` touch the first line matching the item id alone and `remove`
//! drops every line with that id.

use shared::models::menu::{MenuItem, OptionSelection};
use shared::pricing;

/// One cart line: a menu item snapshot, a quantity and the chosen options
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Item snapshot taken at add time; later menu edits do not affect it
    pub item: MenuItem,
    pub qty: i64,
    pub selected_options: Vec<OptionSelection>,
}

impl CartLine {
    /// Unit price: snapshotted base price plus selected option deltas
    pub fn unit_price(&self) -> i64 {
        pricing::unit_price(&self.item, &self.selected_options)
    }

    pub fn total(&self) -> i64 {
        self.unit_price() * self.qty
    }

    fn options_key(&self) -> String {
        options_key(&self.selected_options)
    }
}

fn options_key(selections: &[OptionSelection]) -> String {
    // exact list+order equality, as serialized
    serde_json::to_string(selections).unwrap_or_default()
}

/// Session cart
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one of `item` with the given option selections.
    ///
    /// An existing line with the same item id and the same serialized
    /// selection set gains quantity instead of a duplicate line appearing.
    pub fn add(&mut self, item: MenuItem, selected_options: Vec<OptionSelection>) {
        let key = options_key(&selected_options);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.item.id == item.id && l.options_key() == key)
        {
            line.qty += 1;
            return;
        }
        self.lines.push(CartLine {
            item,
            qty: 1,
            selected_options,
        });
    }

    /// Increment the first line matching `item_id` (option-set-insensitive)
    pub fn inc(&mut self, item_id: &str) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item_id) {
            line.qty += 1;
        }
    }

    /// Decrement the first line matching `item_id`; a line reaching zero is
    /// removed from the cart
    pub fn dec(&mut self, item_id: &str) {
        if let Some(idx) = self.lines.iter().position(|l| l.item.id == item_id) {
            if self.lines[idx].qty > 1 {
                self.lines[idx].qty -= 1;
            } else {
                self.lines.remove(idx);
            }
        }
    }

    /// Drop every line with this item id
    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|l| l.item.id != item_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart subtotal in the raw currency unit
    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(CartLine::total).sum()
    }
}
