//! Per-call execution context supplied by the host.

use carelog_types::{BlockHeight, Principal};

/// Who is calling, and at what logical time.
///
/// The host serializes calls and guarantees `block_height` is
/// non-decreasing across the sequence; the ledger only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    caller: Principal,
    block_height: BlockHeight,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, block_height: BlockHeight) -> Self {
        Self {
            caller: caller.into(),
            block_height,
        }
    }

    #[must_use]
    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    #[must_use]
    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }
}
