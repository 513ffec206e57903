//! Native stack growth for deeply nested evaluation.

/// Run `f`, first growing the native stack if it is close to exhausted.
///
/// Script recursion and deeply nested expression trees both recurse
/// through the evaluator; `stacker` moves evaluation onto a fresh segment
/// instead of overflowing.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const NEW_SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, NEW_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
