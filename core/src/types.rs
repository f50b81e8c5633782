//! Inventory record types and the prompt field descriptors.
//!
//! An [`Item`] is what storage hands back: the six operator-supplied fields
//! plus the surrogate `id` the storage engine assigned. A [`NewItem`] is the
//! same record before it has been stored, and also the editable part of an
//! existing item.
//!
//! Interactive input is driven by [`ITEM_FIELDS`], a fixed ordered table of
//! [`FieldSpec`] descriptors. Callers read and write one field at a time
//! through [`NewItem::get`] and [`NewItem::set`] so a single prompt loop can
//! serve every operation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six editable item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Brand,
    Sku,
    Category,
    Location,
    Amount,
}

impl Field {
    /// Column name of the field in the `item` table.
    pub fn column(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Brand => "brand",
            Field::Sku => "sku",
            Field::Category => "category",
            Field::Location => "location",
            Field::Amount => "amount",
        }
    }

    /// Returns the descriptor for this field from [`ITEM_FIELDS`].
    pub fn spec(self) -> &'static FieldSpec {
        // ITEM_FIELDS is declared in `Field` order
        &ITEM_FIELDS[self as usize]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// How a field's raw input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text, stored as entered after normalization.
    Text,
    /// A signed integer.
    Integer,
}

/// Prompt descriptor for one item field.
///
/// # Examples
///
/// ```
/// use stockroom_core::{Field, FieldKind};
///
/// let spec = Field::Amount.spec();
/// assert_eq!(spec.label, "Amount");
/// assert_eq!(spec.kind, FieldKind::Integer);
/// assert!(spec.required);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field this descriptor fills.
    pub field: Field,
    /// Text shown to the operator before reading a value.
    pub label: &'static str,
    /// Whether an empty value is rejected.
    pub required: bool,
    /// How the raw value is parsed.
    pub kind: FieldKind,
}

/// Prompt order for creating and editing an item.
pub static ITEM_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        field: Field::Name,
        label: "Name",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        field: Field::Brand,
        label: "Brand",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        field: Field::Sku,
        label: "Stock Keeping Unit(SKU)",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        field: Field::Category,
        label: "Category",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        field: Field::Location,
        label: "Location",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        field: Field::Amount,
        label: "Amount",
        required: true,
        kind: FieldKind::Integer,
    },
];

/// A parsed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Errors raised when assigning a field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The value's kind does not match the field's descriptor.
    #[error("field '{field}' expects a {expected:?} value, got {actual:?}")]
    KindMismatch {
        field: Field,
        expected: FieldKind,
        actual: FieldKind,
    },
}

/// An item that has not been stored yet.
///
/// # Examples
///
/// ```
/// use stockroom_core::{Field, FieldValue, NewItem};
///
/// let mut draft = NewItem::default();
/// draft.set(Field::Sku, FieldValue::Text("aap12p21".into())).unwrap();
/// draft.set(Field::Amount, FieldValue::Integer(2)).unwrap();
/// assert_eq!(draft.sku, "aap12p21");
/// assert_eq!(draft.get(Field::Amount), FieldValue::Integer(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub category: String,
    pub location: String,
    pub amount: i64,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        sku: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            sku: sku.into(),
            category: category.into(),
            location: location.into(),
            amount,
        }
    }

    /// Reads one field by descriptor.
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Brand => FieldValue::Text(self.brand.clone()),
            Field::Sku => FieldValue::Text(self.sku.clone()),
            Field::Category => FieldValue::Text(self.category.clone()),
            Field::Location => FieldValue::Text(self.location.clone()),
            Field::Amount => FieldValue::Integer(self.amount),
        }
    }

    /// Writes one field by descriptor.
    ///
    /// Integer values are accepted for text fields and stored in their
    /// decimal form; text values are rejected for [`Field::Amount`].
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), ItemError> {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Brand => &mut self.brand,
            Field::Sku => &mut self.sku,
            Field::Category => &mut self.category,
            Field::Location => &mut self.location,
            Field::Amount => {
                return match value {
                    FieldValue::Integer(n) => {
                        self.amount = n;
                        Ok(())
                    }
                    FieldValue::Text(_) => Err(ItemError::KindMismatch {
                        field,
                        expected: FieldKind::Integer,
                        actual: FieldKind::Text,
                    }),
                };
            }
        };
        *slot = match value {
            FieldValue::Text(s) => s,
            FieldValue::Integer(n) => n.to_string(),
        };
        Ok(())
    }

    /// Attaches a storage-assigned id.
    pub fn into_item(self, id: i64) -> Item {
        Item::from_parts(id, self)
    }
}

/// A stored inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Surrogate key assigned by storage; never changes.
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub category: String,
    pub location: String,
    /// Stock count. Not clamped; may be negative.
    pub amount: i64,
}

impl Item {
    pub fn from_parts(id: i64, fields: NewItem) -> Self {
        let NewItem {
            name,
            brand,
            sku,
            category,
            location,
            amount,
        } = fields;
        Self {
            id,
            name,
            brand,
            sku,
            category,
            location,
            amount,
        }
    }

    /// Splits the record into its id and its editable fields.
    pub fn into_parts(self) -> (i64, NewItem) {
        let Item {
            id,
            name,
            brand,
            sku,
            category,
            location,
            amount,
        } = self;
        (
            id,
            NewItem {
                name,
                brand,
                sku,
                category,
                location,
                amount,
            },
        )
    }

    /// Copies the editable fields out of the record.
    pub fn fields(&self) -> NewItem {
        self.clone().into_parts().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_fields_follow_field_order() {
        for (index, spec) in ITEM_FIELDS.iter().enumerate() {
            assert_eq!(spec.field as usize, index);
            assert_eq!(spec.field.spec(), spec);
        }
    }

    #[test]
    fn test_only_amount_is_integer() {
        let integer: Vec<Field> = ITEM_FIELDS
            .iter()
            .filter(|s| s.kind == FieldKind::Integer)
            .map(|s| s.field)
            .collect();
        assert_eq!(integer, vec![Field::Amount]);
        assert!(ITEM_FIELDS.iter().all(|s| s.required));
    }

    #[test]
    fn test_set_rejects_text_amount() {
        let mut draft = NewItem::default();
        let err = draft
            .set(Field::Amount, FieldValue::Text("two".into()))
            .unwrap_err();
        assert!(matches!(err, ItemError::KindMismatch { field: Field::Amount, .. }));
        assert_eq!(draft.amount, 0);
    }

    #[test]
    fn test_set_integer_into_text_field() {
        let mut draft = NewItem::default();
        draft.set(Field::Location, FieldValue::Integer(12)).unwrap();
        assert_eq!(draft.location, "12");
    }

    #[test]
    fn test_get_set_round_trip() {
        let source = NewItem::new("iphone 12 pro", "apple", "aap12p21", "phone", "storage room", 2);
        let mut copy = NewItem::default();
        for spec in &ITEM_FIELDS {
            copy.set(spec.field, source.get(spec.field)).unwrap();
        }
        assert_eq!(copy, source);
    }

    #[test]
    fn test_parts_round_trip() {
        let item = NewItem::new("a", "b", "c", "d", "e", -3).into_item(7);
        let (id, fields) = item.clone().into_parts();
        assert_eq!(id, 7);
        assert_eq!(Item::from_parts(id, fields), item);
        assert_eq!(item.fields().amount, -3);
    }

    #[test]
    fn test_item_serializes_all_fields() {
        let item = NewItem::new("iphone", "apple", "aap1", "phone", "shelf", 2).into_item(1);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["sku"], "aap1");
        assert_eq!(json["amount"], 2);
    }
}
