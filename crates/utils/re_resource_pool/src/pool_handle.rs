use std::{cell::Cell, fmt::Debug, rc::Rc};

use crate::{FrameIndex, ItemId, PoolItem, pool_item::Usage};

/// A reference counted handle to a pooled resource, as returned by [`crate::ResourcePool::alloc`].
///
/// Each handle counts as one user of the underlying item.
/// Once the last handle is dropped the item is stamped with the pool's current frame
/// and becomes available for reuse, or for eviction once it stayed unused for long enough.
///
/// A handle does not own the resource: the pool does.
/// Use [`crate::ResourcePool::get`] to access the payload, which borrows the pool for as long
/// as the payload is in use. Dropping the pool destroys all of its payloads, including the ones
/// that still have handles, and those handles have nothing left to resolve against.
pub struct PoolHandle<Desc: Debug, Frame: FrameIndex = u64> {
    id: ItemId,
    desc: Desc,
    usage: Rc<Usage<Frame>>,

    /// The owning pool's frame counter.
    current_frame: Rc<Cell<Frame>>,
}

impl<Desc: Debug + Clone, Frame: FrameIndex> PoolHandle<Desc, Frame> {
    pub(crate) fn new<Res>(
        item: &PoolItem<Desc, Res, Frame>,
        current_frame: Rc<Cell<Frame>>,
    ) -> Self {
        item.acquire();
        Self {
            id: item.id(),
            desc: item.descriptor().clone(),
            usage: Rc::clone(item.usage()),
            current_frame,
        }
    }
}

impl<Desc: Debug, Frame: FrameIndex> PoolHandle<Desc, Frame> {
    /// The item this handle points to.
    #[inline]
    pub fn item_id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &Desc {
        &self.desc
    }

    /// Number of users of the underlying item, this handle included.
    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.usage.ref_count()
    }
}

impl<Desc: Debug + Clone, Frame: FrameIndex> Clone for PoolHandle<Desc, Frame> {
    fn clone(&self) -> Self {
        self.usage.acquire();
        Self {
            id: self.id,
            desc: self.desc.clone(),
            usage: Rc::clone(&self.usage),
            current_frame: Rc::clone(&self.current_frame),
        }
    }
}

impl<Desc: Debug, Frame: FrameIndex> Drop for PoolHandle<Desc, Frame> {
    fn drop(&mut self) {
        self.usage.release(self.current_frame.get(), &self.desc);
    }
}

impl<Desc: Debug, Frame: FrameIndex> Debug for PoolHandle<Desc, Frame> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolHandle")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .field("ref_count", &self.usage.ref_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use crate::{PoolError, ResourcePool};

    /// Counts how often it got dropped.
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn clone_and_drop_balance_ref_count() {
        let mut pool = ResourcePool::<u8, String>::new();
        pool.begin_frame(4);

        let handle = pool.alloc(&1, |desc| format!("resource {desc}"));
        assert_eq!(handle.ref_count(), 1);
        assert_eq!(pool.get(&handle).map(String::as_str), Ok("resource 1"));
        assert_eq!(*handle.descriptor(), 1);

        let other = handle.clone();
        assert_eq!(handle.item_id(), other.item_id());
        assert_eq!(handle.ref_count(), 2);

        pool.begin_frame(5);
        drop(handle);
        assert_eq!(other.ref_count(), 1);
        assert_eq!(pool.item(other.item_id()).unwrap().last_use_frame(), 4, "still in use");

        pool.begin_frame(6);
        let id = other.item_id();
        drop(other);
        let item = pool.item(id).unwrap();
        assert!(item.is_idle());
        assert_eq!(item.last_use_frame(), 6);
    }

    #[test]
    fn dropping_pool_destroys_payloads_of_live_handles() {
        let num_dropped = Rc::new(Cell::new(0));
        let mut pool = ResourcePool::<u8, Tracked>::new();
        let handle = pool.alloc(&3, |_| Tracked(Rc::clone(&num_dropped)));
        assert_eq!(num_dropped.get(), 0);

        drop(pool);
        assert_eq!(num_dropped.get(), 1, "the pool is the only owner of the payload");

        // Releasing after the fact is harmless.
        assert_eq!(handle.ref_count(), 1);
        drop(handle);
        assert_eq!(num_dropped.get(), 1);
    }

    #[test]
    fn handles_only_resolve_in_their_own_pool() {
        let mut pool = ResourcePool::<u8, u32>::new();
        let mut other_pool = ResourcePool::<u8, u32>::new();

        let handle = pool.alloc(&0, |_| 1);
        drop(other_pool.alloc(&0, |_| 2));

        assert_eq!(pool.get(&handle), Ok(&1));
        assert_eq!(other_pool.get(&handle), Err(PoolError::ResourceNotAvailable));
    }

    #[test]
    fn in_use_handles_survive_eviction() {
        let mut pool = ResourcePool::<u8, ()>::new();
        let handle = pool.alloc(&0, |_| ());

        pool.evict(u64::MAX, 0);
        pool.clear();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&handle), Ok(&()));

        drop(handle);
        pool.clear();
        assert!(pool.is_empty());
    }
}
