//! Runtime invariants with contract checking
//!
//! Production code states an invariant with [`assert_invariant!`]; every
//! check is recorded per thread. Tests then call [`contract_test`] to prove
//! that the invariants they care about were actually evaluated, so a refactor
//! that silently drops a check fails loudly.
//!
//! ```rust,ignore
//! assert_invariant!(
//!     self.bytes_written == self.frame_count * frame_len,
//!     "Bytes written must be a whole number of frames",
//!     "Recorder::write_frame"
//! );
//!
//! #[test]
//! fn contract_frame_accounting() {
//!     // ... drive a recorder ...
//!     contract_test("frame accounting", &["Bytes written must be a whole number of frames"]);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::thread_local;

thread_local! {
    static CHECKED: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Assert an invariant and record that it was checked.
///
/// # Panics
/// Panics if the condition is false.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariant_ppt::__check_invariant($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariant_ppt::__check_invariant($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __check_invariant(condition: bool, message: &str, context: Option<&str>) {
    CHECKED.with(|checked| {
        if !checked.borrow().contains(message) {
            checked.borrow_mut().insert(message.to_string());
        }
    });

    if !condition {
        panic!(
            "INVARIANT VIOLATION [{}]: {}",
            context.unwrap_or("unknown"),
            message
        );
    }
}

/// Whether `message` has been checked on this thread
pub fn invariant_checked(message: &str) -> bool {
    CHECKED.with(|checked| checked.borrow().contains(message))
}

/// Panic unless every listed invariant was checked on this thread
pub fn contract_test(test_name: &str, required: &[&str]) {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|m| !invariant_checked(m))
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: invariants never checked:\n  - {}",
            test_name,
            missing.join("\n  - ")
        );
    }
}

pub fn clear_invariant_log() {
    CHECKED.with(|checked| checked.borrow_mut().clear());
}
