// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use self::message_accumulator::MessageAccumulator;

mod message_accumulator;
