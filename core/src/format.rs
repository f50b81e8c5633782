//! Display formatting for inventory items.
//!
//! Items are stored exactly as entered (lower-cased by the input prompts).
//! Output re-cases them for reading: name, brand, and category in title case,
//! SKU and location in upper case. Formatting works on a borrowed item and
//! never changes the stored record.

use crate::types::Item;

/// Upper-cases the first letter of every word and leaves the rest untouched.
///
/// A word starts at the beginning of the string or after any character
/// that is neither alphanumeric nor an apostrophe.
///
/// # Examples
///
/// ```
/// use stockroom_core::title_case;
///
/// assert_eq!(title_case("iphone 12 pro"), "Iphone 12 Pro");
/// assert_eq!(title_case("jack's tools"), "Jack's Tools");
/// assert_eq!(title_case("usb-c cable"), "Usb-C Cable");
/// assert_eq!(title_case("McDonald"), "McDonald");
/// ```
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '\'');
    }
    out
}

impl Item {
    /// Returns a copy with presentation casing applied.
    ///
    /// Useful for output that shows individual fields; the copy must not be
    /// written back to storage.
    pub fn canonical(&self) -> Item {
        Item {
            id: self.id,
            name: title_case(&self.name),
            brand: title_case(&self.brand),
            sku: self.sku.to_uppercase(),
            category: title_case(&self.category),
            location: self.location.to_uppercase(),
            amount: self.amount,
        }
    }
}

/// Renders an item as a single display line.
///
/// # Examples
///
/// ```
/// use stockroom_core::{NewItem, format_item};
///
/// let item = NewItem::new("flat white", "acme", "fw01", "coffee", "bar", 12).into_item(3);
/// assert_eq!(
///     format_item(&item),
///     "[FW01] Name: Flat White | Brand: Acme | Category: Coffee | location: BAR | Stock: 12"
/// );
/// ```
pub fn format_item(item: &Item) -> String {
    format!(
        "[{}] Name: {} | Brand: {} | Category: {} | location: {} | Stock: {}",
        item.sku.to_uppercase(),
        title_case(&item.name),
        title_case(&item.brand),
        title_case(&item.category),
        item.location.to_uppercase(),
        item.amount
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewItem;

    fn phone() -> Item {
        NewItem::new("iphone 12 pro", "apple", "aap12p21", "phone", "storage room", 2).into_item(1)
    }

    #[test]
    fn test_format_matches_golden_line() {
        assert_eq!(
            format_item(&phone()),
            "[AAP12P21] Name: Iphone 12 Pro | Brand: Apple | Category: Phone | location: STORAGE ROOM | Stock: 2"
        );
    }

    #[test]
    fn test_format_does_not_mutate_item() {
        let item = phone();
        let before = item.clone();
        let _ = format_item(&item);
        assert_eq!(item, before);
    }

    #[test]
    fn test_format_negative_stock() {
        let mut item = phone();
        item.amount = -4;
        assert!(format_item(&item).ends_with("| Stock: -4"));
    }

    #[test]
    fn test_title_case_edge_cases() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("  two  spaces "), "  Two  Spaces ");
        assert_eq!(title_case("12 pack"), "12 Pack");
        assert_eq!(title_case("4k tv"), "4k Tv");
        assert_eq!(title_case("élan"), "Élan");
    }

    #[test]
    fn test_canonical_keeps_id_and_amount() {
        let canonical = phone().canonical();
        assert_eq!(canonical.id, 1);
        assert_eq!(canonical.amount, 2);
        assert_eq!(canonical.name, "Iphone 12 Pro");
        assert_eq!(canonical.location, "STORAGE ROOM");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: formatting a presentation-cased item gives the same line.
            #[test]
            fn format_is_idempotent_on_canonical_items(
                name in "[a-z0-9 '-]{0,30}",
                brand in "[a-z0-9 ]{0,20}",
                sku in "[a-z0-9]{1,12}",
                category in "[a-z ]{0,20}",
                location in "[a-z0-9 ]{0,20}",
                amount in any::<i64>(),
            ) {
                let item = NewItem::new(name, brand, sku, category, location, amount).into_item(1);
                let canonical = item.canonical();
                prop_assert_eq!(format_item(&canonical), format_item(&item));
                prop_assert_eq!(canonical.canonical(), canonical);
            }
        }
    }
}
