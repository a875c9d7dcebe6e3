use crate::error::{ExpectedLength, MutateError, MutateResult};
use crate::expr::{Datum, Expr};
use crate::gather::Gatherer;
use crate::host::{Evaluator, GroupVariables};
use crate::hybrid;
use crate::namespace::Namespace;
use crate::options::MutateOptions;
use crate::recycle::ConstantRecycler;
use formula_frame::{Column, ColumnType, Grouping};

/// Classes the grouped core refuses to store in a column.
const UNSUPPORTED_CLASSES: [&str; 2] = ["POSIXlt", "data.frame"];

/// Shape of the column an expression must produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// One value per row of the table.
    Window,
    /// One value per group.
    Summary,
}

/// Evaluates one output expression over every group of a table.
pub struct ExpressionEvaluator<'a, E: ?Sized> {
    name: &'a str,
    grouping: &'a Grouping,
    namespace: &'a Namespace,
    host: &'a E,
    options: &'a MutateOptions,
    shape: Shape,
}

impl<'a, E: Evaluator + ?Sized> ExpressionEvaluator<'a, E> {
    pub fn new(
        name: &'a str,
        grouping: &'a Grouping,
        namespace: &'a Namespace,
        host: &'a E,
        options: &'a MutateOptions,
    ) -> Self {
        Self {
            name,
            grouping,
            namespace,
            host,
            options,
            shape: Shape::Window,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Evaluate `expr`. `Ok(None)` means the expression produced no column at all and the output
    /// name should be dropped.
    pub fn evaluate(&self, expr: &Expr) -> MutateResult<Option<Column>> {
        match expr {
            Expr::Null => Ok(None),
            Expr::Symbol(symbol) => match self.namespace.get(symbol) {
                Some(column) if self.shape == Shape::Window || column.is_summary() => {
                    Ok(Some(column.clone()))
                }
                _ => self.evaluate_groups(expr),
            },
            Expr::Call { .. } => self.evaluate_groups(expr),
            Expr::Literal(constant) if constant.len() == 1 => self.recycle(constant).map(Some),
            Expr::Literal(vector) => self.validate_vector(vector).map(Some),
            Expr::Foreign(type_name) => Err(MutateError::unsupported_type(self.name, type_name)),
        }
    }

    fn output_len(&self) -> usize {
        match self.shape {
            Shape::Window => self.grouping.row_count(),
            Shape::Summary => self.grouping.group_count(),
        }
    }

    fn finish(&self, column: Column) -> Column {
        column.with_summary(self.shape == Shape::Summary)
    }

    fn evaluate_groups(&self, expr: &Expr) -> MutateResult<Option<Column>> {
        if self.options.hybrid {
            if let Some(reducer) =
                hybrid::recognize(expr, self.namespace).and_then(|call| call.reducer())
            {
                log::trace!(
                    "column `{}`: hybrid {} reduction",
                    self.name,
                    reducer.kind().name()
                );
                return Ok(Some(match self.shape {
                    Shape::Window => reducer.window(self.grouping),
                    Shape::Summary => reducer.summarise(self.grouping),
                }));
            }
        }

        let ng = self.grouping.group_count();
        if ng == 0 {
            return Ok(Some(self.finish(Column::missing(ColumnType::Logical, 0))));
        }

        // Find a representative result: skip groups producing NULL, then (when more groups
        // remain) groups producing only missing values. Skipped non-NULL results are kept so
        // they can still be gathered.
        let mut leading = Vec::new();
        let mut representative = None;
        for ordinal in 0..ng {
            let Some(result) = self.evaluate_group(expr, ordinal)? else {
                log::trace!("column `{}`: group {ordinal} produced NULL", self.name);
                continue;
            };
            self.check_result(&result, ordinal)?;
            if ordinal + 1 < ng && result.all_missing() {
                log::trace!("column `{}`: group {ordinal} is all missing", self.name);
                leading.push((ordinal, result));
                continue;
            }
            representative = Some((ordinal, result));
            break;
        }

        let resume = representative
            .as_ref()
            .map_or(ng, |(ordinal, _)| ordinal + 1);
        let Some((first, result)) = representative.or_else(|| leading.pop()) else {
            return Ok(None);
        };

        let mut gatherer = Gatherer::new(self.name, &result, self.output_len());
        self.grab(&mut gatherer, &result, first)?;
        for (ordinal, cached) in &leading {
            self.grab(&mut gatherer, cached, *ordinal)?;
        }
        for ordinal in resume..ng {
            let Some(result) = self.evaluate_group(expr, ordinal)? else {
                return Err(MutateError::IncompatibleTypes {
                    name: self.name.to_string(),
                    found: "NULL".to_string(),
                    expected: gatherer.describe(),
                });
            };
            self.check_result(&result, ordinal)?;
            self.grab(&mut gatherer, &result, ordinal)?;
        }

        Ok(Some(self.finish(gatherer.collect())))
    }

    fn evaluate_group(&self, expr: &Expr, ordinal: usize) -> MutateResult<Option<Column>> {
        let mut vars = GroupVariables::new(self.namespace, self.grouping.group(ordinal));
        let datum = self
            .host
            .evaluate(expr, &mut vars)
            .map_err(|source| MutateError::Evaluation {
                name: self.name.to_string(),
                source,
            })?;
        match datum {
            Datum::Null => Ok(None),
            Datum::Vector(column) => Ok(Some(column)),
            Datum::Foreign(type_name) => {
                Err(MutateError::unsupported_type(self.name, &type_name))
            }
        }
    }

    fn check_result(&self, result: &Column, ordinal: usize) -> MutateResult<()> {
        check_supported(self.name, result)?;
        if result.column_type() == ColumnType::Raw {
            return Err(MutateError::unsupported_type(self.name, ColumnType::Raw.name()));
        }

        let n = result.len();
        let expected = match self.shape {
            Shape::Summary if n != 1 => ExpectedLength::Summary,
            Shape::Summary => return Ok(()),
            Shape::Window => {
                let size = self.grouping.group(ordinal).len();
                if n == size || n == 1 {
                    return Ok(());
                }
                ExpectedLength::GroupSize(size)
            }
        };
        Err(MutateError::LengthMismatch {
            name: self.name.to_string(),
            expected,
            actual: n,
        })
    }

    fn grab(
        &self,
        gatherer: &mut Gatherer<'_>,
        result: &Column,
        ordinal: usize,
    ) -> MutateResult<()> {
        match self.shape {
            Shape::Window => gatherer.grab(result, self.grouping.group(ordinal).rows()),
            Shape::Summary => gatherer.grab(result, &[ordinal]),
        }
    }

    fn recycle(&self, constant: &Column) -> MutateResult<Column> {
        check_supported(self.name, constant)?;
        let column = ConstantRecycler::new(constant, self.output_len()).collect();
        Ok(self.finish(column))
    }

    fn validate_vector(&self, vector: &Column) -> MutateResult<Column> {
        check_supported(self.name, vector)?;
        let expected = match self.shape {
            Shape::Window if vector.len() == self.grouping.row_count() => {
                return Ok(vector.clone());
            }
            Shape::Window => ExpectedLength::RowCount(self.grouping.row_count()),
            Shape::Summary => ExpectedLength::Summary,
        };
        Err(MutateError::LengthMismatch {
            name: self.name.to_string(),
            expected,
            actual: vector.len(),
        })
    }
}

fn check_supported(name: &str, column: &Column) -> MutateResult<()> {
    for class in UNSUPPORTED_CLASSES {
        if column.inherits(class) {
            return Err(MutateError::unsupported_class(name, class));
        }
    }
    Ok(())
}
