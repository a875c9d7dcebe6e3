use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

/// Runtime element type of a [`crate::Column`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Logical,
    Integer,
    Double,
    Complex,
    Text,
    List,
    Raw,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Logical => "logical",
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Complex => "complex",
            ColumnType::Text => "character",
            ColumnType::List => "list",
            ColumnType::Raw => "raw",
        }
    }

    /// Position in the promotion lattice. Raw sits outside of it.
    fn rank(self) -> Option<u8> {
        match self {
            ColumnType::Logical => Some(0),
            ColumnType::Integer => Some(1),
            ColumnType::Double => Some(2),
            ColumnType::Complex => Some(3),
            ColumnType::Text => Some(4),
            ColumnType::List => Some(5),
            ColumnType::Raw => None,
        }
    }

    /// Least upper bound of two element types.
    ///
    /// The order is `logical < integer < double < complex < character < list`. Raw only joins
    /// with itself; combining raw with anything else yields a list.
    pub fn promote(self, other: ColumnType) -> ColumnType {
        if self == other {
            return self;
        }
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) if a >= b => self,
            (Some(_), Some(_)) => other,
            _ => ColumnType::List,
        }
    }

    /// Whether values of `other` can be stored in a column of this type without widening it.
    pub fn can_hold(self, other: ColumnType) -> bool {
        self.promote(other) == self
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Logical | ColumnType::Integer | ColumnType::Double
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hashable, totally ordered value of a grouping key cell.
///
/// Variant order doubles as sort order, so missing keys sort after every present value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Logical(bool),
    Integer(i64),
    Double(OrderedFloat<f64>),
    Text(Arc<str>),
    Missing,
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Logical(true) => f.write_str("TRUE"),
            KeyValue::Logical(false) => f.write_str("FALSE"),
            KeyValue::Integer(v) => write!(f, "{v}"),
            KeyValue::Double(v) => write!(f, "{}", v.0),
            KeyValue::Text(v) => f.write_str(v),
            KeyValue::Missing => f.write_str("NA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_follows_lattice() {
        assert_eq!(
            ColumnType::Logical.promote(ColumnType::Integer),
            ColumnType::Integer
        );
        assert_eq!(
            ColumnType::Double.promote(ColumnType::Integer),
            ColumnType::Double
        );
        assert_eq!(
            ColumnType::Text.promote(ColumnType::Complex),
            ColumnType::Text
        );
        assert_eq!(ColumnType::Raw.promote(ColumnType::Raw), ColumnType::Raw);
        assert_eq!(
            ColumnType::Raw.promote(ColumnType::Logical),
            ColumnType::List
        );
        assert!(ColumnType::Double.can_hold(ColumnType::Logical));
        assert!(!ColumnType::Integer.can_hold(ColumnType::Double));
    }

    #[test]
    fn missing_keys_sort_last() {
        let mut keys = vec![
            KeyValue::Missing,
            KeyValue::Integer(3),
            KeyValue::Integer(-1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![KeyValue::Integer(-1), KeyValue::Integer(3), KeyValue::Missing]
        );
    }
}
