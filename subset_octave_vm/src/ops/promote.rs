//! Promotion ladder for dispatch retries.
//!
//! bool < integer < single < double < float complex < complex
//!
//! One step does the first applicable of:
//! 1. densify structured operands (diagonal, sparse, char, null)
//! 2. raise the lower-ranked operand to the higher rank
//! 3. two different integer classes both go to double
//! 4. raise both to the next default rung
//!
//! Operand shape (scalar or matrix) is kept through rank changes.

use crate::types::{NumericRank, TypeTag};

fn densify(tag: TypeTag) -> TypeTag {
    tag.dense().unwrap_or(tag)
}

/// Next pair of tags to try, or `None` when the ladder is exhausted
pub fn promotion_step(left: TypeTag, right: TypeTag) -> Option<(TypeTag, TypeTag)> {
    let dense = (densify(left), densify(right));
    if dense != (left, right) {
        return Some(dense);
    }
    let (lr, rr) = (left.rank()?, right.rank()?);
    if lr.rung() < rr.rung() {
        return Some((left.with_rank(rr), right));
    }
    if lr.rung() > rr.rung() {
        return Some((left, right.with_rank(lr)));
    }
    if lr != rr {
        return Some((
            left.with_rank(NumericRank::Double),
            right.with_rank(NumericRank::Double),
        ));
    }
    let next = lr.next_default()?;
    Some((left.with_rank(next), right.with_rank(next)))
}

/// Next tag to try for a unary operand
pub fn unary_promotion(tag: TypeTag) -> Option<TypeTag> {
    let dense = densify(tag);
    if dense != tag {
        return Some(dense);
    }
    let next = tag.rank()?.next_default()?;
    Some(tag.with_rank(next))
}
