use crate::error::{FrameError, FrameResult};
use crate::types::ColumnType;
use num_complex::Complex64;
use std::sync::Arc;

/// Typed backing buffer of a [`Column`].
///
/// `None` marks a missing element. List and raw buffers have no missing representation.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Logical(Vec<Option<bool>>),
    Integer(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Complex(Vec<Option<Complex64>>),
    Text(Vec<Option<Arc<str>>>),
    List(Vec<Column>),
    Raw(Vec<u8>),
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Logical(_) => ColumnType::Logical,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::Complex(_) => ColumnType::Complex,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::List(_) => ColumnType::List,
            ColumnData::Raw(_) => ColumnType::Raw,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Logical(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Complex(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::List(v) => v.len(),
            ColumnData::Raw(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A buffer of `len` missing elements. Lists hold a missing logical scalar per slot and raw
    /// buffers are zero-filled.
    pub fn missing(column_type: ColumnType, len: usize) -> Self {
        match column_type {
            ColumnType::Logical => ColumnData::Logical(vec![None; len]),
            ColumnType::Integer => ColumnData::Integer(vec![None; len]),
            ColumnType::Double => ColumnData::Double(vec![None; len]),
            ColumnType::Complex => ColumnData::Complex(vec![None; len]),
            ColumnType::Text => ColumnData::Text(vec![None; len]),
            ColumnType::List => ColumnData::List(vec![Column::logical([None]); len]),
            ColumnType::Raw => ColumnData::Raw(vec![0; len]),
        }
    }

    pub fn is_missing(&self, idx: usize) -> bool {
        match self {
            ColumnData::Logical(v) => matches!(v.get(idx), Some(None)),
            ColumnData::Integer(v) => matches!(v.get(idx), Some(None)),
            ColumnData::Double(v) => matches!(v.get(idx), Some(None)),
            ColumnData::Complex(v) => matches!(v.get(idx), Some(None)),
            ColumnData::Text(v) => matches!(v.get(idx), Some(None)),
            ColumnData::List(_) | ColumnData::Raw(_) => false,
        }
    }

    /// Whether every element is missing. An empty buffer counts as all-missing.
    pub fn all_missing(&self) -> bool {
        match self {
            ColumnData::Logical(v) => v.iter().all(Option::is_none),
            ColumnData::Integer(v) => v.iter().all(Option::is_none),
            ColumnData::Double(v) => v.iter().all(Option::is_none),
            ColumnData::Complex(v) => v.iter().all(Option::is_none),
            ColumnData::Text(v) => v.iter().all(Option::is_none),
            ColumnData::List(v) => v.is_empty(),
            ColumnData::Raw(v) => v.is_empty(),
        }
    }

    /// Gather the elements at `rows`, in order.
    pub fn take(&self, rows: &[usize]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|&row| values[row].clone()).collect()
        }

        match self {
            ColumnData::Logical(v) => ColumnData::Logical(pick(v, rows)),
            ColumnData::Integer(v) => ColumnData::Integer(pick(v, rows)),
            ColumnData::Double(v) => ColumnData::Double(pick(v, rows)),
            ColumnData::Complex(v) => ColumnData::Complex(pick(v, rows)),
            ColumnData::Text(v) => ColumnData::Text(pick(v, rows)),
            ColumnData::List(v) => ColumnData::List(pick(v, rows)),
            ColumnData::Raw(v) => ColumnData::Raw(pick(v, rows)),
        }
    }

    /// Convert to a wider element type of the promotion lattice. Missing elements stay missing.
    pub fn widen(&self, to: ColumnType) -> FrameResult<ColumnData> {
        let from = self.column_type();
        if from == to {
            return Ok(self.clone());
        }
        if !to.can_hold(from) {
            return Err(FrameError::InvalidCast { from, to });
        }

        let out = match (self, to) {
            (ColumnData::Logical(v), ColumnType::Integer) => {
                ColumnData::Integer(map_present(v, |b| i64::from(*b)))
            }
            (ColumnData::Logical(v), ColumnType::Double) => {
                ColumnData::Double(map_present(v, |b| if *b { 1.0 } else { 0.0 }))
            }
            (ColumnData::Integer(v), ColumnType::Double) => {
                ColumnData::Double(map_present(v, |i| *i as f64))
            }
            (_, ColumnType::Complex) => {
                let doubles = match self.widen(ColumnType::Double)? {
                    ColumnData::Double(v) => v,
                    _ => return Err(FrameError::InvalidCast { from, to }),
                };
                ColumnData::Complex(map_present(&doubles, |re| Complex64::new(*re, 0.0)))
            }
            (_, ColumnType::Text) => {
                ColumnData::Text((0..self.len()).map(|idx| self.element_text(idx)).collect())
            }
            (_, ColumnType::List) => ColumnData::List(
                (0..self.len())
                    .map(|idx| Column::new(self.take(&[idx])))
                    .collect(),
            ),
            _ => return Err(FrameError::InvalidCast { from, to }),
        };
        Ok(out)
    }

    fn element_text(&self, idx: usize) -> Option<Arc<str>> {
        let text = match self {
            ColumnData::Logical(v) => (if v[idx]? { "TRUE" } else { "FALSE" }).to_string(),
            ColumnData::Integer(v) => v[idx]?.to_string(),
            ColumnData::Double(v) => format_double(v[idx]?),
            ColumnData::Complex(v) => {
                let c = v[idx]?;
                let sign = if c.im.is_sign_negative() { '-' } else { '+' };
                format!("{}{}{}i", format_double(c.re), sign, format_double(c.im.abs()))
            }
            ColumnData::Text(v) => return v[idx].clone(),
            ColumnData::List(_) | ColumnData::Raw(_) => return None,
        };
        Some(Arc::from(text))
    }
}

fn map_present<T, U>(values: &[Option<T>], f: impl Fn(&T) -> U) -> Vec<Option<U>> {
    values.iter().map(|v| v.as_ref().map(&f)).collect()
}

/// Up to 15 significant digits, in fixed or scientific notation, whichever is shorter.
fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return (if v > 0.0 { "Inf" } else { "-Inf" }).to_string();
    }

    let sci = format!("{v:.14e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');

    let digits = mantissa.bytes().filter(u8::is_ascii_digit).count() as i32;
    let decimals = (digits - 1 - exponent).max(0) as usize;
    let fixed = format!("{v:.decimals$}");
    let sign = if exponent < 0 { '-' } else { '+' };
    let scientific = format!("{mantissa}e{sign}{:02}", exponent.abs());

    if fixed.len() <= scientific.len() {
        fixed
    } else {
        scientific
    }
}

/// Auxiliary metadata carried alongside a column's values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    /// Per-element names. Positional: they follow the elements when a column is sliced.
    pub names: Option<Vec<Arc<str>>>,
    /// Class markers, most specific first.
    pub class: Vec<String>,
}

/// A typed, immutable column of values.
///
/// The buffer is shared, so cloning a column never copies its elements. `is_summary` marks a
/// column that holds one value per group instead of one value per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    data: Arc<ColumnData>,
    attributes: Attributes,
    is_summary: bool,
}

impl Column {
    pub fn new(data: ColumnData) -> Self {
        Self {
            data: Arc::new(data),
            attributes: Attributes::default(),
            is_summary: false,
        }
    }

    pub fn logical(values: impl IntoIterator<Item = Option<bool>>) -> Self {
        Self::new(ColumnData::Logical(values.into_iter().collect()))
    }

    pub fn integer(values: impl IntoIterator<Item = Option<i64>>) -> Self {
        Self::new(ColumnData::Integer(values.into_iter().collect()))
    }

    pub fn double(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(ColumnData::Double(values.into_iter().collect()))
    }

    pub fn complex(values: impl IntoIterator<Item = Option<Complex64>>) -> Self {
        Self::new(ColumnData::Complex(values.into_iter().collect()))
    }

    pub fn text<S: AsRef<str>>(values: impl IntoIterator<Item = Option<S>>) -> Self {
        Self::new(ColumnData::Text(
            values
                .into_iter()
                .map(|v| v.map(|s| Arc::<str>::from(s.as_ref())))
                .collect(),
        ))
    }

    pub fn list(values: Vec<Column>) -> Self {
        Self::new(ColumnData::List(values))
    }

    pub fn raw(values: Vec<u8>) -> Self {
        Self::new(ColumnData::Raw(values))
    }

    pub fn missing(column_type: ColumnType, len: usize) -> Self {
        Self::new(ColumnData::missing(column_type, len))
    }

    pub fn with_class<S: Into<String>>(mut self, class: impl IntoIterator<Item = S>) -> Self {
        self.attributes.class = class.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_names<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.attributes.names = Some(
            names
                .into_iter()
                .map(|s| Arc::<str>::from(s.as_ref()))
                .collect(),
        );
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_summary(mut self, is_summary: bool) -> Self {
        self.is_summary = is_summary;
        self
    }

    pub fn without_names(mut self) -> Self {
        self.attributes.names = None;
        self
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn names(&self) -> Option<&[Arc<str>]> {
        self.attributes.names.as_deref()
    }

    pub fn class(&self) -> &[String] {
        &self.attributes.class
    }

    pub fn is_summary(&self) -> bool {
        self.is_summary
    }

    pub fn inherits(&self, class: &str) -> bool {
        self.attributes.class.iter().any(|c| c == class)
    }

    pub fn is_missing(&self, idx: usize) -> bool {
        self.data.is_missing(idx)
    }

    pub fn all_missing(&self) -> bool {
        self.data.all_missing()
    }

    /// Human-readable type for error messages: the most specific class, or the element type.
    pub fn describe(&self) -> String {
        match self.attributes.class.first() {
            Some(class) => class.clone(),
            None => self.column_type().name().to_string(),
        }
    }

    /// Whether both columns share the same buffer.
    pub fn ptr_eq(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Materialize the rows at `rows`. Class markers are kept and names follow their elements;
    /// names that don't line up with the values are dropped.
    pub fn take(&self, rows: &[usize]) -> Column {
        let names = self
            .attributes
            .names
            .as_ref()
            .filter(|names| names.len() == self.len())
            .map(|names| rows.iter().map(|&row| names[row].clone()).collect());
        Column {
            data: Arc::new(self.data.take(rows)),
            attributes: Attributes {
                names,
                class: self.attributes.class.clone(),
            },
            is_summary: false,
        }
    }

    pub fn widen(&self, to: ColumnType) -> FrameResult<Column> {
        if self.column_type() == to {
            return Ok(self.clone());
        }
        Ok(Column {
            data: Arc::new(self.data.widen(to)?),
            attributes: self.attributes.clone(),
            is_summary: self.is_summary,
        })
    }
}

impl From<bool> for Column {
    fn from(value: bool) -> Self {
        Column::logical([Some(value)])
    }
}

impl From<i64> for Column {
    fn from(value: i64) -> Self {
        Column::integer([Some(value)])
    }
}

impl From<f64> for Column {
    fn from(value: f64) -> Self {
        Column::double([Some(value)])
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        Column::text([Some(value)])
    }
}
