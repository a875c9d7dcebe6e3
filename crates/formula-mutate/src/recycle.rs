use formula_frame::{Attributes, Column, ColumnData};

/// Expands a length-one constant into a column of `n` copies.
#[derive(Debug)]
pub struct ConstantRecycler<'a> {
    constant: &'a Column,
    n: usize,
}

impl<'a> ConstantRecycler<'a> {
    pub fn new(constant: &'a Column, n: usize) -> Self {
        Self { constant, n }
    }

    /// The recycled column keeps the constant's element type and class; names are dropped since
    /// they are positional.
    pub fn collect(&self) -> Column {
        let data = match self.constant.data() {
            ColumnData::Logical(v) => ColumnData::Logical(repeat(v, self.n)),
            ColumnData::Integer(v) => ColumnData::Integer(repeat(v, self.n)),
            ColumnData::Double(v) => ColumnData::Double(repeat(v, self.n)),
            ColumnData::Complex(v) => ColumnData::Complex(repeat(v, self.n)),
            ColumnData::Text(v) => ColumnData::Text(repeat(v, self.n)),
            ColumnData::List(v) => ColumnData::List(repeat(v, self.n)),
            ColumnData::Raw(v) => ColumnData::Raw(repeat(v, self.n)),
        };
        Column::new(data).with_attributes(Attributes {
            names: None,
            class: self.constant.class().to_vec(),
        })
    }
}

fn repeat<T: Clone>(values: &[T], n: usize) -> Vec<T> {
    values.iter().take(1).cycle().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_frame::ColumnType;

    #[test]
    fn recycles_each_type_to_itself() {
        let cases = [
            Column::from(true),
            Column::from(7_i64),
            Column::from(2.5),
            Column::from("a"),
            Column::complex([Some(formula_frame::Complex64::new(1.0, -1.0))]),
            Column::list(vec![Column::from(1_i64)]),
            Column::raw(vec![0xff]),
        ];
        for constant in &cases {
            let out = ConstantRecycler::new(constant, 3).collect();
            assert_eq!(out.column_type(), constant.column_type());
            assert_eq!(out.len(), 3);
        }
    }

    #[test]
    fn keeps_class_but_not_names() {
        let constant = Column::double([Some(19_000.0)])
            .with_class(["Date"])
            .with_names(["when"]);
        let out = ConstantRecycler::new(&constant, 2).collect();
        assert_eq!(out.column_type(), ColumnType::Double);
        assert!(out.inherits("Date"));
        assert!(out.names().is_none());
    }
}
