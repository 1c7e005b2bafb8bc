//! Row-wise evaluation of expression trees over frame tables.
//!
//! A [`ValueExpr`] evaluates to a new column and a [`Predicate`] to a boolean mask. In both cases
//! the result is null (for a mask: `false`) at every row where any column referenced by the tree
//! is null, whatever the operators in between.

#![forbid(unsafe_code)]

mod ast;
mod interpreter;
mod mapping;
mod materialize;
mod operand;
mod ops;

pub use crate::ast::{BooleanOperator, ComparisonOperator, Literal, Predicate, ValueExpr, ValueOperator};
pub use crate::interpreter::{EvalOptions, Interpreter};
pub use crate::mapping::ColumnMapping;
pub use crate::materialize::{materialize, null_mask, predicate_mask};
pub use crate::operand::{ArrayOperand, BoolOperand, Operand, OperandKind, StringOperand};

use frame_columnar::{BitVec, Column, FrameResult, Table};

/// Evaluate `predicate` into a mask of `table.num_rows()` bits.
pub fn execute_predicate(
    table: &Table,
    predicate: &Predicate,
    mapping: &ColumnMapping,
) -> FrameResult<BitVec> {
    execute_predicate_with(table, predicate, mapping, EvalOptions::default())
}

pub fn execute_predicate_with(
    table: &Table,
    predicate: &Predicate,
    mapping: &ColumnMapping,
    options: EvalOptions,
) -> FrameResult<BitVec> {
    log::debug!("evaluating predicate over {} rows", table.num_rows());
    let mut interpreter = Interpreter::new(table, mapping, options);
    let result = interpreter.evaluate_predicate(predicate)?;
    let referenced = interpreter.referenced_columns();
    log::debug!("predicate referenced {} columns", referenced.len());
    predicate_mask(result, &referenced)
}

/// Evaluate `value` into a new column of `table.num_rows()` rows.
///
/// A bare column reference returns the referenced column itself, sharing its storage, whatever
/// its element type. Any other expression yields a column named `result`.
pub fn execute_value(
    table: &Table,
    value: &ValueExpr,
    mapping: &ColumnMapping,
) -> FrameResult<Column> {
    execute_value_with(table, value, mapping, EvalOptions::default())
}

pub fn execute_value_with(
    table: &Table,
    value: &ValueExpr,
    mapping: &ColumnMapping,
    options: EvalOptions,
) -> FrameResult<Column> {
    log::debug!("evaluating value over {} rows", table.num_rows());
    if let ValueExpr::ColumnReference { id } = value {
        let column = table.column(mapping.resolve(*id)?)?;
        column.segment()?;
        return Ok(column.clone());
    }

    let mut interpreter = Interpreter::new(table, mapping, options);
    let result = interpreter.evaluate_value(value)?;
    let referenced = interpreter.referenced_columns();
    materialize("result", result, &referenced, table.num_rows())
}

/// Keep the rows of `table` for which `predicate` holds.
pub fn filter(table: &Table, predicate: &Predicate, mapping: &ColumnMapping) -> FrameResult<Table> {
    let mask = execute_predicate(table, predicate, mapping)?;
    table.filter(&mask)
}
