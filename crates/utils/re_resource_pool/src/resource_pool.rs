use std::{cell::Cell, fmt::Debug, ops::Range, rc::Rc};

use crate::{EvictionPolicy, FrameIndex, ItemId, PoolError, PoolHandle, PoolItem};

/// Descriptors that know how much memory the resource they describe is going to take.
pub trait SizedResourceDesc {
    fn resource_size_in_bytes(&self) -> u64;
}

/// Cumulative counters of what happened in a [`ResourcePool`] since its creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStatistics {
    /// Items added to the pool, either via [`ResourcePool::insert`] or on an allocation miss.
    pub num_created: u64,

    /// Allocations that were served by an idle item already in the pool.
    pub num_reused: u64,

    /// Items dropped by eviction or clearing.
    pub num_evicted: u64,
}

/// Pool of resources, keyed by a descriptor that determines which resources are interchangeable.
///
/// Several items may share the same descriptor, e.g. a handful of same-sized render targets
/// that are all in flight at once. An item whose reference count is zero may be handed out again
/// to anyone asking for its descriptor, or reclaimed once it stayed unused for long enough.
///
/// The pool never creates or destroys resources on its own accord: creation is up to the caller
/// and destruction happens by dropping the payload once the item got evicted.
/// The pool is the only owner of its payloads. [`Self::find`] and [`Self::insert`] hand out
/// borrows, so no reference to an item can be held across [`Self::evict`] or [`Self::clear`].
/// Dropping the pool drops every payload, whether or not it is still in use.
///
/// A pool is meant to be owned by a single frame driven system and can't be shared across threads.
pub struct ResourcePool<Desc, Res, Frame: FrameIndex = u64> {
    /// All items, sorted by descriptor. Items with equal descriptors are contiguous.
    items: Vec<PoolItem<Desc, Res, Frame>>,

    /// Shared with all outstanding [`PoolHandle`]s so they can stamp the frame they got released at.
    current_frame: Rc<Cell<Frame>>,

    policy: EvictionPolicy,
    statistics: PoolStatistics,
}

impl<Desc, Res, Frame: FrameIndex> Default for ResourcePool<Desc, Res, Frame> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_frame: Rc::new(Cell::new(Frame::default())),
            policy: EvictionPolicy::default(),
            statistics: PoolStatistics::default(),
        }
    }
}

impl<Desc, Res, Frame> ResourcePool<Desc, Res, Frame>
where
    Desc: Ord + Debug,
    Frame: FrameIndex,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EvictionPolicy) {
        self.policy = policy;
    }

    /// The frame passed to the last [`Self::begin_frame`] or [`Self::evict`].
    #[inline]
    pub fn current_frame(&self) -> Frame {
        self.current_frame.get()
    }

    #[inline]
    pub fn statistics(&self) -> PoolStatistics {
        self.statistics
    }

    /// Index range of all items with the given descriptor.
    fn run_of(&self, desc: &Desc) -> Range<usize> {
        let start = self.items.partition_point(|item| item.descriptor() < desc);
        let len = self.items[start..].partition_point(|item| item.descriptor() <= desc);
        start..start + len
    }

    /// Looks for an unreferenced item with the given descriptor.
    ///
    /// Does not acquire the item! Use [`Self::alloc`] to find and reserve in one go.
    pub fn find(&self, desc: &Desc) -> Option<&PoolItem<Desc, Res, Frame>> {
        self.find_index(desc).map(|index| &self.items[index])
    }

    fn find_index(&self, desc: &Desc) -> Option<usize> {
        self.run_of(desc).find(|&index| self.items[index].is_idle())
    }

    /// Takes ownership of a newly created item, keeping the pool sorted.
    ///
    /// Returns a reference to the item as it is now stored in the pool.
    pub fn insert(&mut self, item: PoolItem<Desc, Res, Frame>) -> &PoolItem<Desc, Res, Frame> {
        let index = self.insert_sorted(item);
        &self.items[index]
    }

    fn insert_sorted(&mut self, item: PoolItem<Desc, Res, Frame>) -> usize {
        crate::profile_function!();

        let index = self
            .items
            .partition_point(|existing| existing.descriptor() < item.descriptor());

        log::trace!(
            "Inserting pool item {:?} at {index} of {}",
            item.descriptor(),
            self.items.len()
        );

        self.items.insert(index, item);
        self.statistics.num_created += 1;
        index
    }

    /// Looks up an item by id, whether it is in use or not.
    ///
    /// This is how callers doing their own acquire/release find their items again in later frames.
    pub fn item(&self, id: ItemId) -> Option<&PoolItem<Desc, Res, Frame>> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// The payload a handle refers to.
    ///
    /// Fails if the handle doesn't belong to this pool.
    pub fn get(&self, handle: &PoolHandle<Desc, Frame>) -> Result<&Res, PoolError> {
        self.items[self.run_of(handle.descriptor())]
            .iter()
            .find(|item| item.id() == handle.item_id())
            .map(PoolItem::payload)
            .ok_or(PoolError::ResourceNotAvailable)
    }

    /// Returns a handle to an item with the given descriptor,
    /// reusing an unreferenced one if possible and creating it otherwise.
    ///
    /// Looking up and acquiring happen in one step, so an item can never be handed out twice.
    pub fn alloc<F>(&mut self, desc: &Desc, creation_func: F) -> PoolHandle<Desc, Frame>
    where
        Desc: Clone,
        F: FnOnce(&Desc) -> Res,
    {
        let result = self.try_alloc(desc, |desc| {
            Ok::<_, std::convert::Infallible>(creation_func(desc))
        });
        match result {
            Ok(handle) => handle,
            Err(never) => match never {},
        }
    }

    /// Like [`Self::alloc`], but resource creation may fail.
    ///
    /// On failure nothing is added to the pool.
    pub fn try_alloc<F, E>(
        &mut self,
        desc: &Desc,
        creation_func: F,
    ) -> Result<PoolHandle<Desc, Frame>, E>
    where
        Desc: Clone,
        F: FnOnce(&Desc) -> Result<Res, E>,
    {
        crate::profile_function!();

        let index = if let Some(index) = self.find_index(desc) {
            log::trace!("Reclaimed previously used resource {desc:?}");
            self.statistics.num_reused += 1;
            index
        } else {
            let payload = creation_func(desc)?;
            self.insert_sorted(PoolItem::new(desc.clone(), payload, self.current_frame()))
        };

        Ok(PoolHandle::new(&self.items[index], Rc::clone(&self.current_frame)))
    }

    /// Drops every item that is unreferenced and hasn't been used for at least `min_idle_frames`.
    ///
    /// Also records `current_frame` as the frame at which released handles are stamped.
    pub fn evict(&mut self, current_frame: Frame, min_idle_frames: Frame) {
        crate::profile_function!();

        self.current_frame.set(current_frame);
        self.remove_where(|item| item.is_evictable(current_frame, min_idle_frames));
    }

    /// Called by the owner once per frame. Advances the frame and evicts according to the [`EvictionPolicy`].
    pub fn begin_frame(&mut self, frame_index: Frame) {
        crate::profile_function!();

        self.current_frame.set(frame_index);
        if let Some(min_idle_frames) = self.policy.min_idle_frames {
            self.evict(frame_index, Frame::saturating_from_u64(min_idle_frames));
        }
    }

    /// Drops every unreferenced item, no matter how recently it was used.
    ///
    /// Items that are still in use stay in the pool.
    pub fn clear(&mut self) {
        crate::profile_function!();

        self.remove_where(|item| item.is_idle());
    }

    fn remove_where(
        &mut self,
        mut should_remove: impl FnMut(&PoolItem<Desc, Res, Frame>) -> bool,
    ) {
        let num_before = self.items.len();
        self.items.retain(|item| !should_remove(item));

        let num_removed = num_before - self.items.len();
        if num_removed > 0 {
            log::debug!(
                "Dropped {num_removed} unused pool items at frame {:?}, {} remaining",
                self.current_frame(),
                self.items.len()
            );
            self.statistics.num_evicted += num_removed as u64;
        }
    }

    /// Total number of items, both in use and idle.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn num_in_use(&self) -> usize {
        self.items.iter().filter(|item| !item.is_idle()).count()
    }

    pub fn num_idle(&self) -> usize {
        self.len() - self.num_in_use()
    }

    /// All items in descriptor order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PoolItem<Desc, Res, Frame>> {
        self.items.iter()
    }

    pub fn total_resource_size_in_bytes(&self) -> u64
    where
        Desc: SizedResourceDesc,
    {
        self.items
            .iter()
            .map(|item| item.descriptor().resource_size_in_bytes())
            .sum()
    }
}

impl<'a, Desc, Res, Frame> IntoIterator for &'a ResourcePool<Desc, Res, Frame>
where
    Desc: Ord + Debug,
    Frame: FrameIndex,
{
    type Item = &'a PoolItem<Desc, Res, Frame>;
    type IntoIter = std::slice::Iter<'a, PoolItem<Desc, Res, Frame>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
