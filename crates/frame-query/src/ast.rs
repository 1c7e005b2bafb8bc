#![forbid(unsafe_code)]

//! Expression trees evaluated by the interpreter.
//!
//! Trees are built by an external query layer (they round-trip through serde) and are read-only
//! during evaluation. Column references carry a symbolic id that a [`crate::ColumnMapping`]
//! resolves to a table column index.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    Int64(i64),
    Float64(f64),
    String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Negate,
}

impl ValueOperator {
    pub fn arity(self) -> usize {
        match self {
            ValueOperator::Negate => 1,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Greater,
    Lesser,
    Equal,
    StartsWith,
    Matches,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BooleanOperator {
    And,
    Or,
    Not,
}

impl BooleanOperator {
    pub fn arity(self) -> usize {
        match self {
            BooleanOperator::Not => 1,
            _ => 2,
        }
    }
}

macro_rules! operator_names {
    ($($t:ident { $($variant:ident),* })*) => {$(
        impl $t {
            pub fn name(self) -> &'static str {
                match self {
                    $($t::$variant => stringify!($variant),)*
                }
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    )*};
}

operator_names! {
    ValueOperator { Plus, Minus, Times, Divide, Modulo, Negate }
    ComparisonOperator { Greater, Lesser, Equal, StartsWith, Matches }
    BooleanOperator { And, Or, Not }
}

/// An expression producing one value per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueExpr {
    ColumnReference {
        id: usize,
    },
    Literal {
        value: Literal,
    },
    Operation {
        op: ValueOperator,
        operands: Vec<ValueExpr>,
    },
}

/// An expression producing one boolean per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    Comparison {
        op: ComparisonOperator,
        operands: Vec<ValueExpr>,
    },
    Boolean {
        op: BooleanOperator,
        operands: Vec<Predicate>,
    },
}

impl ValueExpr {
    pub fn column(id: usize) -> Self {
        ValueExpr::ColumnReference { id }
    }

    pub fn int(value: i64) -> Self {
        ValueExpr::Literal {
            value: Literal::Int64(value),
        }
    }

    pub fn float(value: f64) -> Self {
        ValueExpr::Literal {
            value: Literal::Float64(value),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        ValueExpr::Literal {
            value: Literal::String(value.into()),
        }
    }

    pub fn binary(op: ValueOperator, lhs: ValueExpr, rhs: ValueExpr) -> Self {
        ValueExpr::Operation {
            op,
            operands: vec![lhs, rhs],
        }
    }

    pub fn negate(operand: ValueExpr) -> Self {
        ValueExpr::Operation {
            op: ValueOperator::Negate,
            operands: vec![operand],
        }
    }
}

impl Predicate {
    pub fn compare(op: ComparisonOperator, lhs: ValueExpr, rhs: ValueExpr) -> Self {
        Predicate::Comparison {
            op,
            operands: vec![lhs, rhs],
        }
    }

    pub fn and(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::Boolean {
            op: BooleanOperator::And,
            operands: vec![lhs, rhs],
        }
    }

    pub fn or(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::Boolean {
            op: BooleanOperator::Or,
            operands: vec![lhs, rhs],
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Predicate) -> Self {
        Predicate::Boolean {
            op: BooleanOperator::Not,
            operands: vec![operand],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_of_operators() {
        assert_eq!(ValueOperator::Negate.arity(), 1);
        assert_eq!(ValueOperator::Modulo.arity(), 2);
        assert_eq!(BooleanOperator::Not.arity(), 1);
        assert_eq!(BooleanOperator::Or.arity(), 2);
    }

    #[test]
    fn operators_display_by_name() {
        assert_eq!(ComparisonOperator::StartsWith.to_string(), "StartsWith");
        assert_eq!(ValueOperator::Plus.to_string(), "Plus");
    }
}
