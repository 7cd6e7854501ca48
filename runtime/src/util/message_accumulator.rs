// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// Collects invariant-violation messages during state checks.
#[derive(Clone, Default)]
pub struct MessageAccumulator {
    /// Shared message list. Accumulators derived with [`Self::with_prefix`]
    /// push into the same list.
    msgs: Rc<RefCell<Vec<String>>>,
    /// Prefixed onto every message added through this handle.
    prefix: String,
}

impl MessageAccumulator {
    /// Derives an accumulator writing to the same list that stamps each new
    /// message with higher-level context, e.g. the account address or asset
    /// name under inspection.
    pub fn with_prefix<S: AsRef<str>>(&self, prefix: S) -> Self {
        Self {
            msgs: self.msgs.clone(),
            prefix: self.prefix.to_owned() + prefix.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.borrow().is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.msgs.borrow().to_owned()
    }

    /// Records a violation.
    pub fn add<S: AsRef<str>>(&self, msg: S) {
        self.msgs.borrow_mut().push(format!("{}{}", self.prefix, msg.as_ref()));
    }

    /// Records a violation unless `predicate` holds.
    pub fn require<S: AsRef<str>>(&self, predicate: bool, msg: S) {
        if !predicate {
            self.add(msg);
        }
    }

    /// Records the error carried by `result`, if any.
    pub fn require_no_error<V, E: Display, S: AsRef<str>>(&self, result: Result<V, E>, msg: S) {
        if let Err(e) = result {
            self.add(format!("{}: {e}", msg.as_ref()));
        }
    }

    /// Panics with all accumulated messages if any are present.
    pub fn assert_empty(&self) {
        assert!(self.is_empty(), "{}", self.messages().join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_messages_in_order() {
        let acc = MessageAccumulator::default();
        acc.add("net usage -5 is negative");
        assert_eq!(acc.messages(), vec!["net usage -5 is negative"]);

        acc.add("bucket time 2000 is past slot 1000");
        assert_eq!(
            acc.messages(),
            vec!["net usage -5 is negative", "bucket time 2000 is past slot 1000"]
        );
    }

    #[test]
    fn prefixes_compose() {
        let acc = MessageAccumulator::default();
        let scoped = acc.with_prefix("account 65: ");
        scoped.require(false, "free net usage is negative");
        acc.add("total net weight is zero with stake outstanding");

        assert_eq!(
            acc.messages(),
            vec![
                "account 65: free net usage is negative",
                "total net weight is zero with stake outstanding"
            ]
        );
        assert!(!acc.is_empty());
    }

    #[test]
    fn require_only_records_failures() {
        let acc = MessageAccumulator::default();
        acc.require(true, "public pool usage is negative");
        assert!(acc.is_empty());
        acc.assert_empty();
    }

    #[test]
    fn require_no_error_captures_the_error_text() {
        let acc = MessageAccumulator::default();
        let result: Result<(), String> = Err("asset volt does not exist".to_string());
        acc.require_no_error(result, "loading asset issues");

        assert_eq!(acc.messages(), vec!["loading asset issues: asset volt does not exist"]);
    }
}
