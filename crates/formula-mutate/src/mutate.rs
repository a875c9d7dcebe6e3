use crate::error::{MutateError, MutateResult};
use crate::evaluator::{ExpressionEvaluator, Shape};
use crate::expr::NamedExpr;
use crate::host::Evaluator;
use crate::interpreter::Interpreter;
use crate::namespace::Namespace;
use crate::options::MutateOptions;
use formula_frame::{Column, FrameError, FrameResult, Grouping, Table};

/// Drives grouped transforms: evaluates named expressions in order, feeding each result back
/// into the namespace so later expressions can refer to it.
#[derive(Debug, Clone)]
pub struct MutateEngine<E> {
    evaluator: E,
    options: MutateOptions,
}

impl Default for MutateEngine<Interpreter> {
    fn default() -> Self {
        Self::new(Interpreter)
    }
}

impl<E: Evaluator> MutateEngine<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            options: MutateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MutateOptions) -> Self {
        self.options = options;
        self
    }

    /// Add or replace columns of `table`, evaluating every expression once per group.
    ///
    /// Columns that are not recomputed keep their position; new columns are appended in
    /// expression order. An expression evaluating to NULL removes its column. Any error aborts
    /// the whole transform.
    pub fn transform(
        &self,
        table: &Table,
        grouping: &Grouping,
        exprs: &[NamedExpr],
    ) -> MutateResult<Table> {
        if exprs.is_empty() {
            return Ok(table.clone());
        }
        check_grouping(table, grouping)?;
        check_not_groups(exprs, grouping)?;

        let natural;
        let grouping = if grouping.group_count() == 0 {
            natural = Grouping::natural(table.row_count());
            &natural
        } else {
            grouping
        };

        log::debug!(
            "mutate: {} expressions over {} rows in {} groups",
            exprs.len(),
            table.row_count(),
            grouping.group_count()
        );

        let mut accumulator = ColumnAccumulator::from_table(table);
        let mut namespace = Namespace::from_table(table);

        for named in exprs {
            self.check_interrupt()?;

            let evaluator = ExpressionEvaluator::new(
                &named.name,
                grouping,
                &namespace,
                &self.evaluator,
                &self.options,
            );
            let Some(column) = evaluator.evaluate(&named.expr)? else {
                log::debug!("column `{}` is NULL, removing it", named.name);
                accumulator.remove(&named.name);
                namespace.remove(&named.name);
                continue;
            };

            let column = if grouping.is_natural() {
                column
            } else {
                column.without_names()
            };
            log::debug!("column `{}` computed as {}", named.name, column.describe());
            namespace.insert(named.name.clone(), column.clone());
            accumulator.set(&named.name, column);
        }

        Ok(accumulator.into_table(table.row_count(), table.class())?)
    }

    /// Reduce every group to one row.
    ///
    /// The output holds the grouping keys (taken from each group's first row) followed by one
    /// column per surviving expression. Results are visible to later expressions as summary
    /// columns.
    pub fn summarise(
        &self,
        table: &Table,
        grouping: &Grouping,
        exprs: &[NamedExpr],
    ) -> MutateResult<Table> {
        check_grouping(table, grouping)?;
        check_not_groups(exprs, grouping)?;

        log::debug!(
            "summarise: {} expressions over {} groups",
            exprs.len(),
            grouping.group_count()
        );

        let mut accumulator = ColumnAccumulator::default();
        let first_rows = grouping.first_rows();
        for key in grouping.keys() {
            let column = table
                .column(key)
                .ok_or_else(|| FrameError::UnknownColumn(key.clone()))?;
            accumulator.set(key, column.take(&first_rows));
        }

        let mut namespace = Namespace::from_table(table);
        for named in exprs {
            self.check_interrupt()?;

            let evaluator = ExpressionEvaluator::new(
                &named.name,
                grouping,
                &namespace,
                &self.evaluator,
                &self.options,
            )
            .with_shape(Shape::Summary);
            let Some(column) = evaluator.evaluate(&named.expr)? else {
                accumulator.remove(&named.name);
                namespace.remove(&named.name);
                continue;
            };

            namespace.insert(named.name.clone(), column.clone());
            accumulator.set(&named.name, column.with_summary(false).without_names());
        }

        Ok(accumulator.into_table(grouping.group_count(), table.class())?)
    }

    fn check_interrupt(&self) -> MutateResult<()> {
        if self.options.is_interrupted() {
            log::debug!("transform interrupted");
            return Err(MutateError::Interrupted);
        }
        Ok(())
    }
}

fn check_grouping(table: &Table, grouping: &Grouping) -> MutateResult<()> {
    if grouping.row_count() != table.row_count() {
        return Err(FrameError::GroupingRowMismatch {
            grouping: grouping.row_count(),
            table: table.row_count(),
        }
        .into());
    }
    Ok(())
}

fn check_not_groups(exprs: &[NamedExpr], grouping: &Grouping) -> MutateResult<()> {
    match exprs.iter().find(|named| grouping.has_key(&named.name)) {
        Some(named) => Err(MutateError::GroupingViolation {
            name: named.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Output columns in table order: replaced columns keep their slot, new ones are appended.
#[derive(Debug, Default)]
struct ColumnAccumulator {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl ColumnAccumulator {
    fn from_table(table: &Table) -> Self {
        let (names, columns) = table
            .iter()
            .map(|(name, column)| (name.to_string(), column.clone()))
            .unzip();
        Self { names, columns }
    }

    fn set(&mut self, name: &str, column: Column) {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                self.names.push(name.to_string());
                self.columns.push(column);
            }
        }
    }

    fn remove(&mut self, name: &str) {
        if let Some(idx) = self.names.iter().position(|n| n == name) {
            self.names.remove(idx);
            self.columns.remove(idx);
        }
    }

    fn into_table(self, rows: usize, class: &[String]) -> FrameResult<Table> {
        let columns: Vec<(String, Column)> = self.names.into_iter().zip(self.columns).collect();
        Table::with_row_count(rows, columns).map(|table| table.with_class(class.iter().cloned()))
    }
}
