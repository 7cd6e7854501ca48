// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use self::address::{Address, ADDRESS_LENGTH};
pub use self::error::*;
pub use self::state::*;
pub use self::util::MessageAccumulator;

pub mod runtime;
pub mod util;

mod address;
mod error;
mod state;

#[cfg(feature = "test_utils")]
pub mod test_utils;

/// Block-height-derived time unit. All usage decay windows are measured in
/// slots, never in wall-clock time.
pub type Slot = i64;

/// Wall-clock block timestamp in milliseconds.
pub type TimestampMillis = i64;
