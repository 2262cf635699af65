//! Generic action entry point

use deferred_core::Value;

/// An action that knows how to enqueue itself
///
/// This is the conventional entry point the generic strategy calls when a
/// barrier fires. Closures of the right shape implement it:
///
/// ```
/// use deferred_dispatch::Handler;
/// use deferred_core::Value;
///
/// let handler = |args: &[Value]| -> anyhow::Result<()> {
///     assert!(args.is_empty());
///     Ok(())
/// };
/// handler.enqueue(&[]).unwrap();
/// ```
pub trait Handler: Send + Sync {
    /// Schedule the action with `args`
    fn enqueue(&self, args: &[Value]) -> anyhow::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync,
{
    fn enqueue(&self, args: &[Value]) -> anyhow::Result<()> {
        self(args)
    }
}
