/// Errors caused by misusing a pool or one of its items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// An item was released more often than it was acquired.
    ///
    /// This is always a bug on the caller side: some acquire/release pair is unbalanced.
    #[error("Pool item {descriptor} was released while not being referenced")]
    RefCountUnderflow { descriptor: String },

    /// The handle's item is not part of this pool, either because it got evicted
    /// after an unbalanced release or because the handle stems from another pool.
    #[error("Requested resource is not available")]
    ResourceNotAvailable,
}
