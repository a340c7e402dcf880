//! Thin wrappers over the rayon thread pool.

/// Run two closures, potentially in parallel, and return both results.
pub fn join<A, B, ReturnA, ReturnB>(oper_a: A, oper_b: B) -> (ReturnA, ReturnB)
where
    A: FnOnce() -> ReturnA + Send,
    B: FnOnce() -> ReturnB + Send,
    ReturnA: Send,
    ReturnB: Send,
{
    rayon::join(oper_a, oper_b)
}
