#![forbid(unsafe_code)]

//! Operator kernels.
//!
//! Every kernel reads its operands through a [`Lane`], which broadcasts scalars and indexes
//! arrays, so one loop body covers scalar/array, array/scalar and array/array inputs. Mixed
//! integer/float operands are promoted to `f64`.

use crate::ast::{ComparisonOperator, ValueOperator};
use crate::operand::{ArrayOperand, BoolOperand, Operand, OperandKind, StringOperand};
use frame_columnar::{try_filled_vec, BitVec, FrameError, FrameResult};
use regex::Regex;
use std::cmp::Ordering;

/// Element types the arithmetic kernels run on.
pub(crate) trait Number: Copy + Default + PartialOrd {
    fn from_i64(value: i64) -> Self;

    /// `Negate` ignores `rhs`.
    fn apply(op: ValueOperator, lhs: Self, rhs: Self) -> Self;
}

impl Number for i64 {
    fn from_i64(value: i64) -> Self {
        value
    }

    fn apply(op: ValueOperator, lhs: Self, rhs: Self) -> Self {
        match op {
            ValueOperator::Plus => lhs.wrapping_add(rhs),
            ValueOperator::Minus => lhs.wrapping_sub(rhs),
            ValueOperator::Times => lhs.wrapping_mul(rhs),
            // Zero divisors and MIN / -1 yield 0.
            ValueOperator::Divide => lhs.checked_div(rhs).unwrap_or(0),
            ValueOperator::Modulo => lhs.checked_rem(rhs).unwrap_or(0),
            ValueOperator::Negate => lhs.wrapping_neg(),
        }
    }
}

impl Number for f64 {
    fn from_i64(value: i64) -> Self {
        value as f64
    }

    fn apply(op: ValueOperator, lhs: Self, rhs: Self) -> Self {
        match op {
            ValueOperator::Plus => lhs + rhs,
            ValueOperator::Minus => lhs - rhs,
            ValueOperator::Times => lhs * rhs,
            ValueOperator::Divide => lhs / rhs,
            ValueOperator::Modulo => lhs % rhs,
            ValueOperator::Negate => -lhs,
        }
    }
}

#[derive(Clone, Copy)]
enum Lane<'o, T> {
    Scalar(T),
    Values(&'o [T]),
    /// Integer array read as `T`.
    Widened(&'o [i64]),
}

impl<T: Number> Lane<'_, T> {
    #[inline]
    fn at(self, row: usize) -> T {
        match self {
            Lane::Scalar(v) => v,
            Lane::Values(values) => values[row],
            Lane::Widened(values) => T::from_i64(values[row]),
        }
    }
}

fn int_lane<'o>(operand: &'o Operand<'_>) -> Option<Lane<'o, i64>> {
    match operand {
        Operand::Int64Scalar(v) => Some(Lane::Scalar(*v)),
        Operand::Int64Array(a) => Some(Lane::Values(a.as_slice())),
        _ => None,
    }
}

fn float_lane<'o>(operand: &'o Operand<'_>) -> Option<Lane<'o, f64>> {
    match operand {
        Operand::Int64Scalar(v) => Some(Lane::Scalar(*v as f64)),
        Operand::Float64Scalar(v) => Some(Lane::Scalar(*v)),
        Operand::Int64Array(a) => Some(Lane::Widened(a.as_slice())),
        Operand::Float64Array(a) => Some(Lane::Values(a.as_slice())),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum StrLane<'a> {
    Scalar(&'a str),
    Values(StringOperand<'a>),
}

impl<'a> StrLane<'a> {
    #[inline]
    fn at(self, row: usize) -> &'a str {
        match self {
            StrLane::Scalar(s) => s,
            StrLane::Values(values) => values.load(row),
        }
    }
}

fn str_lane<'a>(operand: &Operand<'a>) -> Option<StrLane<'a>> {
    match operand {
        Operand::StringScalar(s) => Some(StrLane::Scalar(s)),
        Operand::StringArray(values) => Some(StrLane::Values(*values)),
        _ => None,
    }
}

fn mismatch(op: &'static str, lhs: &Operand<'_>, rhs: &Operand<'_>) -> FrameError {
    FrameError::type_mismatch(op, lhs, rhs)
}

fn fill<T: Number>(len: usize, row: impl Fn(usize) -> T) -> FrameResult<ArrayOperand<T>> {
    let mut out = ArrayOperand::fresh(len)?;
    for (i, slot) in out.values_mut().iter_mut().enumerate() {
        *slot = row(i);
    }
    Ok(out)
}

/// Build an `len`-row mask one 64-bit word at a time.
fn mask(len: usize, row: impl Fn(usize) -> bool) -> FrameResult<BoolOperand> {
    let mut words = try_filled_vec(len.div_ceil(64), 0u64)?;
    for (w, word) in words.iter_mut().enumerate() {
        let start = w * 64;
        let end = (start + 64).min(len);
        let mut bits = 0u64;
        for i in start..end {
            bits |= (row(i) as u64) << (i - start);
        }
        *word = bits;
    }
    Ok(BoolOperand::from_bits(BitVec::from_words(words, len)))
}

fn check_arithmetic(op: ValueOperator, operands: &[&Operand<'_>]) -> FrameResult<()> {
    if let Some(bad) = operands.iter().find(|o| o.kind() == OperandKind::String) {
        let other = operands.iter().find(|o| o.kind() != OperandKind::String);
        return Err(match other {
            Some(other) => mismatch(op.name(), other, bad),
            None => FrameError::type_mismatch(op.name(), bad, "numeric operand"),
        });
    }
    if let Some(bad) = operands.iter().find(|o| o.kind() == OperandKind::Bool) {
        return Err(FrameError::unsupported(op.name(), bad));
    }
    Ok(())
}

/// Apply a binary arithmetic operator. Two scalars fold into a scalar.
pub(crate) fn binary_value<'a>(
    op: ValueOperator,
    lhs: &Operand<'a>,
    rhs: &Operand<'a>,
    len: usize,
) -> FrameResult<Operand<'a>> {
    check_arithmetic(op, &[lhs, rhs])?;
    let fold = lhs.is_scalar() && rhs.is_scalar();
    log::trace!("{op}: {lhs} with {rhs}, folded: {fold}");

    if let (Some(l), Some(r)) = (int_lane(lhs), int_lane(rhs)) {
        return Ok(if fold {
            Operand::Int64Scalar(i64::apply(op, l.at(0), r.at(0)))
        } else {
            Operand::Int64Array(fill(len, |i| i64::apply(op, l.at(i), r.at(i)))?)
        });
    }

    match (float_lane(lhs), float_lane(rhs)) {
        (Some(l), Some(r)) if fold => Ok(Operand::Float64Scalar(f64::apply(op, l.at(0), r.at(0)))),
        (Some(l), Some(r)) => Ok(Operand::Float64Array(fill(len, |i| {
            f64::apply(op, l.at(i), r.at(i))
        })?)),
        _ => Err(mismatch(op.name(), lhs, rhs)),
    }
}

pub(crate) fn unary_value<'a>(
    op: ValueOperator,
    operand: &Operand<'a>,
    len: usize,
) -> FrameResult<Operand<'a>> {
    check_arithmetic(op, &[operand])?;
    log::trace!("{op}: {operand}");

    let out = match operand {
        Operand::Int64Scalar(v) => Operand::Int64Scalar(i64::apply(op, *v, 0)),
        Operand::Float64Scalar(v) => Operand::Float64Scalar(f64::apply(op, *v, 0.0)),
        Operand::Int64Array(a) => {
            Operand::Int64Array(fill(len, |i| i64::apply(op, a.load(i), 0))?)
        }
        Operand::Float64Array(a) => {
            Operand::Float64Array(fill(len, |i| f64::apply(op, a.load(i), 0.0))?)
        }
        other => return Err(FrameError::unsupported(op.name(), other)),
    };
    Ok(out)
}

fn ordering_matches(op: ComparisonOperator, ordering: Option<Ordering>) -> bool {
    match op {
        ComparisonOperator::Greater => ordering == Some(Ordering::Greater),
        ComparisonOperator::Lesser => ordering == Some(Ordering::Less),
        _ => ordering == Some(Ordering::Equal),
    }
}

fn bool_bits<'o>(operand: &'o Operand<'_>) -> Option<&'o BitVec> {
    match operand {
        Operand::BoolArray(bits) => Some(bits.bits()),
        _ => None,
    }
}

/// `Greater`, `Lesser` and `Equal` over same-kind or numeric operands. Strings only support
/// `Equal`.
fn ordered(
    op: ComparisonOperator,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
    len: usize,
) -> FrameResult<BoolOperand> {
    if let (Some(l), Some(r)) = (int_lane(lhs), int_lane(rhs)) {
        return mask(len, |i| ordering_matches(op, l.at(i).partial_cmp(&r.at(i))));
    }
    if let (Some(l), Some(r)) = (float_lane(lhs), float_lane(rhs)) {
        return mask(len, |i| ordering_matches(op, l.at(i).partial_cmp(&r.at(i))));
    }
    if let (Some(l), Some(r)) = (str_lane(lhs), str_lane(rhs)) {
        if op != ComparisonOperator::Equal {
            return Err(mismatch(op.name(), lhs, rhs));
        }
        return mask(len, |i| l.at(i) == r.at(i));
    }
    if let (Some(l), Some(r)) = (bool_bits(lhs), bool_bits(rhs)) {
        return mask(len, |i| ordering_matches(op, Some(l.get(i).cmp(&r.get(i)))));
    }
    Err(mismatch(op.name(), lhs, rhs))
}

fn compile(pattern: &str) -> FrameResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|err| FrameError::InvalidPattern {
        pattern: pattern.to_owned(),
        message: err.to_string(),
    })
}

fn regex_match(lhs: StrLane<'_>, rhs: StrLane<'_>, len: usize) -> FrameResult<BoolOperand> {
    if let StrLane::Scalar(pattern) = rhs {
        let regex = compile(pattern)?;
        return mask(len, |i| regex.is_match(lhs.at(i)));
    }

    // Per-row patterns: recompile only when the pattern text changes.
    let mut out = BoolOperand::fresh(len)?;
    let mut cached: Option<(&str, Regex)> = None;
    for i in 0..len {
        let pattern = rhs.at(i);
        let regex = match cached.take() {
            Some((text, regex)) if text == pattern => regex,
            _ => compile(pattern)?,
        };
        if regex.is_match(lhs.at(i)) {
            out.store(i, true);
        }
        cached = Some((pattern, regex));
    }
    Ok(out)
}

/// Evaluate a comparison into an `len`-row mask. Scalar-only comparisons still yield `len` rows.
pub(crate) fn compare(
    op: ComparisonOperator,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
    len: usize,
) -> FrameResult<BoolOperand> {
    log::trace!("{op}: {lhs} with {rhs}");
    match op {
        ComparisonOperator::Greater | ComparisonOperator::Lesser | ComparisonOperator::Equal => {
            ordered(op, lhs, rhs, len)
        }
        ComparisonOperator::StartsWith => match (str_lane(lhs), str_lane(rhs)) {
            (Some(l), Some(r)) => mask(len, |i| l.at(i).as_bytes().starts_with(r.at(i).as_bytes())),
            _ => Err(mismatch(op.name(), lhs, rhs)),
        },
        ComparisonOperator::Matches => match (str_lane(lhs), str_lane(rhs)) {
            (Some(l), Some(r)) => regex_match(l, r, len),
            _ => Err(mismatch(op.name(), lhs, rhs)),
        },
    }
}
