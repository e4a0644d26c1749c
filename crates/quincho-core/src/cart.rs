//! # Session Cart
//!
//! The cart lives in per-browser session storage as a JSON mapping from a
//! string-encoded id to an entry. Two shapes exist in the wild:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Raw Cart Shapes                                    │
//! │                                                                         │
//! │  Legacy:      { "12": 2 }                          bare quantity        │
//! │  Structured:  { "12": { "name": "Completo",                             │
//! │                         "price_cents": 350000,                          │
//! │                         "quantity": 2 } }                               │
//! │                                                                         │
//! │  Promotion keys are offset: "1000003" = promotion 3                     │
//! │  (PROMO_ID_OFFSET keeps the two id spaces from colliding)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization turns any raw cart into the canonical shape, resolving
//! missing names/prices against the product catalog and dropping whatever
//! cannot be resolved. Dropped keys are *reported*, not silently lost, so
//! the behavior stays observable; the success path is unchanged.
//!
//! Normalization is idempotent: a canonical cart normalizes to itself.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Product, Promotion};
use crate::PROMO_ID_OFFSET;

// =============================================================================
// Raw Cart (session wire shape)
// =============================================================================

/// The raw session cart: string-encoded id → entry of either shape.
pub type RawCart = BTreeMap<String, RawCartEntry>;

/// A raw cart entry as found in session storage.
///
/// Decoded as an untagged union so legacy bare-quantity entries, structured
/// entries, and garbage all deserialize without failing the whole cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCartEntry {
    /// Legacy shape: the value is just the quantity.
    Quantity(i64),
    /// Structured shape with optional snapshot fields.
    Entry(RawEntryFields),
    /// Anything else; discarded during normalization.
    Other(serde_json::Value),
}

/// Fields of a structured raw entry. `name`/`price_cents` may be missing
/// and are then resolved from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntryFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Numeric product ids a raw cart needs resolved before normalization.
///
/// Complete entries need no lookup. Promotion-offset keys are listed too:
/// the catalog lookup only knows products, so an incomplete promotion entry
/// misses and gets dropped — same outcome as a vanished product.
pub fn unresolved_ids(raw: &RawCart) -> Vec<i64> {
    let mut ids = Vec::new();
    for (key, entry) in raw {
        let Ok(id) = key.parse::<i64>() else { continue };
        let needs_lookup = match entry {
            RawCartEntry::Quantity(_) => true,
            RawCartEntry::Entry(fields) => fields.name.is_none() || fields.price_cents.is_none(),
            RawCartEntry::Other(_) => false,
        };
        if needs_lookup {
            ids.push(id);
        }
    }
    ids
}

// =============================================================================
// Canonical Cart
// =============================================================================

/// A canonical cart line: every field resolved, quantity ≥ 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

/// A flattened cart line ready for display or checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Numeric id parsed from the cart key (promotion ids carry the offset).
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
}

impl CartItem {
    /// Whether this item addresses a promotion rather than a product.
    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.id >= PROMO_ID_OFFSET
    }

    /// The underlying promotion id for promotion items.
    #[inline]
    pub fn promotion_id(&self) -> Option<i64> {
        self.is_promotion().then(|| self.id - PROMO_ID_OFFSET)
    }
}

/// The canonical cart. Keys remain string-encoded ids so the canonical
/// shape round-trips through the same session storage as the raw shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    pub lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of a product, refreshing the name/price snapshot.
    pub fn add_product(&mut self, product: &Product) {
        let key = product.id.to_string();
        match self.lines.get_mut(&key) {
            Some(line) => {
                line.quantity += 1;
                line.name = product.name.clone();
                line.price_cents = product.price_cents;
            }
            None => {
                self.lines.insert(
                    key,
                    CartLine {
                        name: product.name.clone(),
                        price_cents: product.price_cents,
                        quantity: 1,
                    },
                );
            }
        }
    }

    /// Adds one unit of a promotion under its offset key.
    pub fn add_promotion(&mut self, promo: &Promotion) {
        let key = (PROMO_ID_OFFSET + promo.id).to_string();
        let name = format!("Promo: {}", promo.name);
        match self.lines.get_mut(&key) {
            Some(line) => {
                line.quantity += 1;
                line.name = name;
                line.price_cents = promo.price_cents;
            }
            None => {
                self.lines.insert(
                    key,
                    CartLine {
                        name,
                        price_cents: promo.price_cents,
                        quantity: 1,
                    },
                );
            }
        }
    }

    /// Removes an item by its cart key. Unknown keys are a no-op.
    pub fn remove(&mut self, key: &str) {
        self.lines.remove(key);
    }

    /// Flattens the cart into display items plus the fixed-point total.
    ///
    /// Items come out in ascending numeric id order: products first, then
    /// promotions (their keys carry the offset).
    pub fn items(&self) -> (Vec<CartItem>, Money) {
        let mut items: Vec<CartItem> = self
            .lines
            .iter()
            .filter_map(|(key, line)| {
                let id = key.parse::<i64>().ok()?;
                Some(CartItem {
                    id,
                    name: line.name.clone(),
                    price_cents: line.price_cents,
                    quantity: line.quantity,
                    subtotal_cents: line.price_cents * line.quantity,
                })
            })
            .collect();
        items.sort_by_key(|item| item.id);

        let total: Money = items
            .iter()
            .map(|item| Money::from_cents(item.subtotal_cents))
            .sum();
        (items, total)
    }

    /// Converts the canonical cart back to the raw session shape.
    pub fn to_raw(&self) -> RawCart {
        self.lines
            .iter()
            .map(|(key, line)| {
                (
                    key.clone(),
                    RawCartEntry::Entry(RawEntryFields {
                        name: Some(line.name.clone()),
                        price_cents: Some(line.price_cents),
                        quantity: line.quantity,
                    }),
                )
            })
            .collect()
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// A resolved catalog row handed to [`normalize`], keyed by product id.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub price_cents: i64,
}

/// Result of normalizing a raw cart.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub cart: Cart,
    /// Cart keys that could not be resolved and were removed.
    pub dropped: Vec<String>,
}

/// Normalizes a raw session cart into the canonical shape.
///
/// ## Rules
/// - Entries already carrying name and price pass through untouched.
/// - Entries missing name or price resolve via `products` (numeric id);
///   a miss drops the entry.
/// - Non-numeric keys, unrecognized value shapes, and quantities ≤ 0 drop.
///
/// Dropped keys are returned so callers can log or surface them; the cart
/// itself looks exactly as it always has to the success path.
pub fn normalize(raw: &RawCart, products: &HashMap<i64, CatalogEntry>) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for (key, entry) in raw {
        let parsed_id = key.parse::<i64>();

        let (name, price_cents, quantity) = match entry {
            RawCartEntry::Quantity(qty) => (None, None, *qty),
            RawCartEntry::Entry(fields) => {
                (fields.name.clone(), fields.price_cents, fields.quantity)
            }
            RawCartEntry::Other(_) => {
                outcome.dropped.push(key.clone());
                continue;
            }
        };

        if quantity <= 0 {
            outcome.dropped.push(key.clone());
            continue;
        }

        let line = match (name, price_cents) {
            // Complete snapshot, nothing to resolve
            (Some(name), Some(price_cents)) => CartLine {
                name,
                price_cents,
                quantity,
            },
            // Incomplete: resolve from the catalog or drop
            _ => {
                let resolved = parsed_id.as_ref().ok().and_then(|id| products.get(id));
                match resolved {
                    Some(found) => CartLine {
                        name: found.name.clone(),
                        price_cents: found.price_cents,
                        quantity,
                    },
                    None => {
                        outcome.dropped.push(key.clone());
                        continue;
                    }
                }
            }
        };

        // Keys that do not parse to a numeric id cannot become order lines
        if parsed_id.is_err() {
            outcome.dropped.push(key.clone());
            continue;
        }

        outcome.cart.lines.insert(key.clone(), line);
    }

    outcome
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HashMap<i64, CatalogEntry> {
        let mut map = HashMap::new();
        map.insert(
            12,
            CatalogEntry {
                name: "Completo".to_string(),
                price_cents: 350_000,
            },
        );
        map.insert(
            7,
            CatalogEntry {
                name: "Churrasco".to_string(),
                price_cents: 500_000,
            },
        );
        map
    }

    fn raw(entries: Vec<(&str, RawCartEntry)>) -> RawCart {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn structured(name: Option<&str>, price_cents: Option<i64>, quantity: i64) -> RawCartEntry {
        RawCartEntry::Entry(RawEntryFields {
            name: name.map(String::from),
            price_cents,
            quantity,
        })
    }

    #[test]
    fn test_legacy_quantity_resolves_from_catalog() {
        let raw = raw(vec![("12", RawCartEntry::Quantity(2))]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.dropped.is_empty());
        let line = &outcome.cart.lines["12"];
        assert_eq!(line.name, "Completo");
        assert_eq!(line.price_cents, 350_000);
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_complete_entry_passes_through() {
        let raw = raw(vec![("12", structured(Some("Old Name"), Some(111), 3))]);
        let outcome = normalize(&raw, &catalog());

        // Complete snapshots are trusted, not refreshed
        let line = &outcome.cart.lines["12"];
        assert_eq!(line.name, "Old Name");
        assert_eq!(line.price_cents, 111);
    }

    #[test]
    fn test_vanished_product_dropped_and_reported() {
        let raw = raw(vec![("999", RawCartEntry::Quantity(1))]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.cart.is_empty());
        assert_eq!(outcome.dropped, vec!["999".to_string()]);
    }

    #[test]
    fn test_non_numeric_key_dropped() {
        let raw = raw(vec![("abc", structured(Some("X"), Some(100), 1))]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.cart.is_empty());
        assert_eq!(outcome.dropped, vec!["abc".to_string()]);
    }

    #[test]
    fn test_zero_quantity_dropped() {
        let raw = raw(vec![("12", structured(Some("Completo"), Some(350_000), 0))]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.cart.is_empty());
        assert_eq!(outcome.dropped, vec!["12".to_string()]);
    }

    #[test]
    fn test_garbage_value_dropped() {
        let raw = raw(vec![(
            "12",
            RawCartEntry::Other(serde_json::json!(["not", "a", "cart", "entry"])),
        )]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.cart.is_empty());
        assert_eq!(outcome.dropped, vec!["12".to_string()]);
    }

    #[test]
    fn test_incomplete_promotion_key_dropped() {
        // Promotion keys only survive with a full snapshot; the catalog
        // lookup knows nothing about the offset id space.
        let key = (PROMO_ID_OFFSET + 3).to_string();
        let raw = raw(vec![(key.as_str(), RawCartEntry::Quantity(1))]);
        let outcome = normalize(&raw, &catalog());

        assert!(outcome.cart.is_empty());
        assert_eq!(outcome.dropped, vec![key]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = raw(vec![
            ("12", RawCartEntry::Quantity(2)),
            ("7", structured(None, None, 1)),
            ("999", RawCartEntry::Quantity(1)),
        ]);
        let first = normalize(&raw, &catalog());
        let second = normalize(&first.cart.to_raw(), &catalog());

        assert_eq!(first.cart, second.cart);
        assert!(second.dropped.is_empty());
    }

    #[test]
    fn test_unresolved_ids() {
        let raw = raw(vec![
            ("12", RawCartEntry::Quantity(2)),
            ("7", structured(None, Some(100), 1)),
            ("5", structured(Some("Full"), Some(100), 1)),
            ("abc", RawCartEntry::Quantity(1)),
        ]);
        let mut ids = unresolved_ids(&raw);
        ids.sort();
        assert_eq!(ids, vec![7, 12]);
    }

    #[test]
    fn test_items_and_total() {
        let mut cart = Cart::new();
        cart.lines.insert(
            "12".to_string(),
            CartLine {
                name: "Completo".to_string(),
                price_cents: 300_000,
                quantity: 2,
            },
        );
        cart.lines.insert(
            "7".to_string(),
            CartLine {
                name: "Churrasco".to_string(),
                price_cents: 500_000,
                quantity: 1,
            },
        );

        let (items, total) = cart.items();
        assert_eq!(items.len(), 2);
        // Ascending numeric id, not lexicographic key order
        assert_eq!(items[0].id, 7);
        assert_eq!(items[1].id, 12);
        assert_eq!(items[1].subtotal_cents, 600_000);
        assert_eq!(total.cents(), 1_100_000);
    }

    #[test]
    fn test_add_product_accumulates_and_refreshes() {
        let product = Product {
            id: 12,
            category_id: None,
            name: "Completo".to_string(),
            description: String::new(),
            price_cents: 350_000,
            active: true,
        };
        let mut cart = Cart::new();
        cart.add_product(&product);

        let repriced = Product {
            price_cents: 360_000,
            ..product
        };
        cart.add_product(&repriced);

        let line = &cart.lines["12"];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price_cents, 360_000);
    }

    #[test]
    fn test_add_promotion_uses_offset_key() {
        let promo = Promotion {
            id: 3,
            name: "Futbolero".to_string(),
            description: String::new(),
            price_cents: 990_000,
            active: true,
        };
        let mut cart = Cart::new();
        cart.add_promotion(&promo);

        let key = (PROMO_ID_OFFSET + 3).to_string();
        let line = &cart.lines[&key];
        assert_eq!(line.name, "Promo: Futbolero");

        let (items, _) = cart.items();
        assert!(items[0].is_promotion());
        assert_eq!(items[0].promotion_id(), Some(3));
    }
}
