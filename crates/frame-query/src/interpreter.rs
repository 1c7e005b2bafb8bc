#![forbid(unsafe_code)]

use crate::ast::{BooleanOperator, Predicate, ValueExpr};
use crate::mapping::ColumnMapping;
use crate::operand::{BoolOperand, Operand};
use crate::ops;
use frame_columnar::{Column, FrameError, FrameResult, Table};
use smallvec::SmallVec;

/// Evaluation limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Deepest expression nesting accepted before failing with
    /// [`FrameError::ExpressionTooDeep`].
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

/// One evaluation of an expression tree against a table.
///
/// Operators run on raw values, including the arbitrary values stored at null rows. The
/// interpreter records which columns the tree touched so that the caller can derive the null
/// mask of the result afterwards.
pub struct Interpreter<'a> {
    table: &'a Table,
    mapping: &'a ColumnMapping,
    options: EvalOptions,
    referenced: SmallVec<[usize; 4]>,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(table: &'a Table, mapping: &'a ColumnMapping, options: EvalOptions) -> Self {
        Self {
            table,
            mapping,
            options,
            referenced: SmallVec::new(),
            depth: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Columns touched so far, each once, in first-reference order.
    pub fn referenced_columns(&self) -> Vec<&'a Column> {
        let columns: &'a [Column] = self.table.columns();
        self.referenced.iter().map(|&idx| &columns[idx]).collect()
    }

    fn enter(&mut self) -> FrameResult<()> {
        if self.depth >= self.options.max_depth {
            return Err(FrameError::ExpressionTooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn evaluate_value(&mut self, expr: &'a ValueExpr) -> FrameResult<Operand<'a>> {
        self.enter()?;
        let out = self.value(expr);
        self.depth -= 1;
        out
    }

    pub fn evaluate_predicate(&mut self, predicate: &'a Predicate) -> FrameResult<BoolOperand> {
        self.enter()?;
        let out = self.predicate(predicate);
        self.depth -= 1;
        out
    }

    fn reference(&mut self, id: usize) -> FrameResult<Operand<'a>> {
        let table = self.table;
        let index = self.mapping.resolve(id)?;
        let column = table.column(index)?;
        if !self.referenced.contains(&index) {
            self.referenced.push(index);
        }
        Operand::from_column(column)
    }

    fn value(&mut self, expr: &'a ValueExpr) -> FrameResult<Operand<'a>> {
        let rows = self.num_rows();
        match expr {
            ValueExpr::ColumnReference { id } => self.reference(*id),
            ValueExpr::Literal { value } => Ok(Operand::from_literal(value)),
            ValueExpr::Operation { op, operands } if op.arity() == 1 => {
                let operand = self.evaluate_value(nth(operands, 0)?)?;
                ops::unary_value(*op, &operand, rows)
            }
            ValueExpr::Operation { op, operands } => {
                let lhs = self.evaluate_value(nth(operands, 0)?)?;
                let rhs = self.evaluate_value(nth(operands, 1)?)?;
                ops::binary_value(*op, &lhs, &rhs, rows)
            }
        }
    }

    fn predicate(&mut self, predicate: &'a Predicate) -> FrameResult<BoolOperand> {
        let rows = self.num_rows();
        match predicate {
            Predicate::Comparison { op, operands } => {
                let lhs = self.evaluate_value(nth(operands, 0)?)?;
                let rhs = self.evaluate_value(nth(operands, 1)?)?;
                ops::compare(*op, &lhs, &rhs, rows)
            }
            Predicate::Boolean { op, operands } => {
                let mut out = self.evaluate_predicate(nth(operands, 0)?)?;
                log::trace!("{op} over {rows} rows");
                match op {
                    BooleanOperator::Not => out.bits_mut().not_inplace(),
                    BooleanOperator::And => {
                        let rhs = self.evaluate_predicate(nth(operands, 1)?)?;
                        out.bits_mut().and_inplace(rhs.bits());
                    }
                    BooleanOperator::Or => {
                        let rhs = self.evaluate_predicate(nth(operands, 1)?)?;
                        out.bits_mut().or_inplace(rhs.bits());
                    }
                }
                Ok(out)
            }
        }
    }
}

fn nth<T>(operands: &[T], index: usize) -> FrameResult<&T> {
    operands
        .get(index)
        .ok_or_else(|| FrameError::out_of_range("operand", index, operands.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOperator, ValueOperator};
    use frame_columnar::ErrorKind;

    fn table() -> Table {
        Table::new(vec![
            Column::from_values("a", vec![1i64, 2, 3]),
            Column::from_values("b", vec![0.5f64, 1.5, 2.5]),
        ])
        .unwrap()
    }

    #[test]
    fn references_are_recorded_once() {
        let table = table();
        let mapping = ColumnMapping::identity(2);
        let expr = ValueExpr::binary(
            ValueOperator::Plus,
            ValueExpr::column(1),
            ValueExpr::binary(ValueOperator::Times, ValueExpr::column(1), ValueExpr::column(0)),
        );
        let mut interpreter = Interpreter::new(&table, &mapping, EvalOptions::default());
        interpreter.evaluate_value(&expr).unwrap();

        let names: Vec<&str> = interpreter
            .referenced_columns()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn depth_limit_applies() {
        let table = table();
        let mapping = ColumnMapping::identity(2);
        let mut expr = ValueExpr::column(0);
        for _ in 0..10 {
            expr = ValueExpr::negate(expr);
        }

        let shallow = EvalOptions { max_depth: 5 };
        let err = Interpreter::new(&table, &mapping, shallow)
            .evaluate_value(&expr)
            .unwrap_err();
        assert_eq!(err, FrameError::ExpressionTooDeep { limit: 5 });

        let deep = EvalOptions { max_depth: 11 };
        assert!(Interpreter::new(&table, &mapping, deep)
            .evaluate_value(&expr)
            .is_ok());
    }

    #[test]
    fn missing_operand_is_out_of_range() {
        let table = table();
        let mapping = ColumnMapping::identity(2);
        let expr = Predicate::Comparison {
            op: ComparisonOperator::Greater,
            operands: vec![ValueExpr::column(0)],
        };
        let err = Interpreter::new(&table, &mapping, EvalOptions::default())
            .evaluate_predicate(&expr)
            .unwrap_err();
        assert_eq!(err, FrameError::out_of_range("operand", 1, 1));
    }

    #[test]
    fn unmapped_reference_fails_fast() {
        let table = table();
        let mapping = ColumnMapping::new(vec![0, 7]);
        let unmapped = ValueExpr::column(2);
        let out_of_table = ValueExpr::column(1);
        let mut interpreter = Interpreter::new(&table, &mapping, EvalOptions::default());

        let err = interpreter.evaluate_value(&unmapped).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = interpreter.evaluate_value(&out_of_table).unwrap_err();
        assert_eq!(err, FrameError::out_of_range("column", 7, 2));
    }
}
