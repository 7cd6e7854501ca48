// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::cmp::Ordering;

use ampere_chain_runtime::runtime::Policy;
use ampere_chain_runtime::{processor_error, ProcessorError, Slot};

/// Returns the usage recorded in a bucket after decaying it to `now` and
/// charging `add_usage` on top.
///
/// Usage is modeled as if spread evenly over a window of
/// `policy.bandwidth_window_slots()` slots and decayed linearly with elapsed
/// slots; a bucket untouched for a full window reads zero. The computation
/// runs in fixed-point "average" form: ceiling division on the way in,
/// floor on the way back. The asymmetry slightly overstates the incoming
/// charge and understates the residual, keeping the meter conservative.
///
/// The decay multiplication rounds half to even, in integer rationals.
/// Every validator must reproduce these roundings bit for bit.
///
/// # Panics
///
/// Panics if `now` precedes `last_time`. Recorded bucket times never exceed
/// the head slot, so this indicates corrupted state and aborts block
/// application.
pub fn increase(
    policy: &Policy,
    last_usage: i64,
    add_usage: i64,
    last_time: Slot,
    now: Slot,
) -> i64 {
    let window_slots = policy.bandwidth_window_slots();
    let window = window_slots as i128;
    let precision = policy.precision as i128;

    let mut average_last = div_ceil(last_usage as i128 * precision, window);
    let average_add = div_ceil(add_usage as i128 * precision, window);

    if last_time != now {
        assert!(
            now > last_time,
            "bucket recorded at slot {} past head slot {}",
            last_time,
            now
        );
        if last_time + window_slots > now {
            let remaining = window - (now - last_time) as i128;
            average_last = mul_div_round_half_even(average_last, remaining, window);
        } else {
            average_last = 0;
        }
    }

    saturating_i64((average_last + average_add) * window / precision)
}

/// Bandwidth an account commands from its stake: its share of
/// `total_net_limit`, weighted by frozen balance.
///
/// Accounts whose stake converts to zero weight get limit zero without the
/// system weight ever being consulted. A zero `total_net_weight` alongside
/// positive account weight contradicts the staking bookkeeping and is
/// fatal.
pub fn global_net_limit(
    policy: &Policy,
    frozen_balance: i64,
    total_net_limit: i64,
    total_net_weight: i64,
) -> Result<i64, ProcessorError> {
    let weight = frozen_balance / policy.stake_divisor;
    if weight <= 0 {
        return Ok(0);
    }
    if total_net_weight <= 0 {
        return Err(processor_error!(
            illegal_state;
            "total net weight is {} while account weight is {}", total_net_weight, weight
        ));
    }
    // Multiply before dividing; the order is consensus.
    Ok(saturating_i64(weight as i128 * total_net_limit as i128 / total_net_weight as i128))
}

fn div_ceil(numerator: i128, denominator: i128) -> i128 {
    numerator / denominator + if numerator % denominator > 0 { 1 } else { 0 }
}

/// `value * numerator / denominator`, rounding half to even. Operands are
/// non-negative.
fn mul_div_round_half_even(value: i128, numerator: i128, denominator: i128) -> i128 {
    let product = value * numerator;
    let quotient = product / denominator;
    let remainder = product % denominator;
    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

fn saturating_i64(value: i128) -> i64 {
    if value > i64::MAX as i128 {
        i64::MAX
    } else {
        value as i64
    }
}
