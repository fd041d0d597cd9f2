use std::{
    cell::Cell,
    fmt::Debug,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{FrameIndex, PoolError};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a [`PoolItem`] for as long as it lives, unique across all pools of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Reference count & last-use frame of an item.
///
/// Shared between an item and the [`crate::PoolHandle`]s pointing to it,
/// so that handles can be released without access to the pool.
/// The payload itself is never shared.
pub(crate) struct Usage<Frame> {
    /// Number of active users. Zero means the item may be handed out again or reclaimed.
    ref_count: Cell<u32>,

    /// Frame at which the item was inserted or at which its reference count last dropped to zero.
    last_use_frame: Cell<Frame>,
}

impl<Frame: FrameIndex> Usage<Frame> {
    fn new(frame: Frame) -> Self {
        Self {
            ref_count: Cell::new(0),
            last_use_frame: Cell::new(frame),
        }
    }

    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.ref_count.get()
    }

    pub fn acquire(&self) -> u32 {
        let Some(ref_count) = self.ref_count.get().checked_add(1) else {
            panic!("Pool item reference count overflowed");
        };
        self.ref_count.set(ref_count);
        ref_count
    }

    /// `None` if nobody was holding on to the item.
    pub fn try_release(&self, frame: Frame) -> Option<u32> {
        let ref_count = self.ref_count.get().checked_sub(1)?;
        self.ref_count.set(ref_count);
        if ref_count == 0 {
            self.last_use_frame.set(frame);
        }
        Some(ref_count)
    }

    /// Releases once, treating an unbalanced release as a bug on the caller side.
    pub fn release(&self, frame: Frame, desc: &impl Debug) {
        if self.try_release(frame).is_none() {
            let err = underflow(desc);
            crate::debug_panic!("{err}");
            log::error!("{err}");
        }
    }
}

fn underflow(desc: &impl Debug) -> PoolError {
    PoolError::RefCountUnderflow {
        descriptor: format!("{desc:?}"),
    }
}

/// A single pooled resource together with its usage bookkeeping.
///
/// The descriptor is fixed for the lifetime of the item.
/// Reference count and last-use frame are tracked with interior mutability so that a caller
/// borrowing an item from the pool can acquire and release it without a mutable borrow.
/// This also means that items, and thus pools, can't be shared across threads.
pub struct PoolItem<Desc, Res, Frame = u64> {
    id: ItemId,
    desc: Desc,
    payload: Res,
    usage: Rc<Usage<Frame>>,
}

impl<Desc, Res, Frame: FrameIndex> PoolItem<Desc, Res, Frame> {
    /// Creates an unreferenced item, marked as last used at `frame`.
    pub fn new(desc: Desc, payload: Res, frame: Frame) -> Self {
        Self {
            id: ItemId::next(),
            desc,
            payload,
            usage: Rc::new(Usage::new(frame)),
        }
    }

    /// Starts out with `ref_count` users instead of none.
    #[must_use]
    pub fn with_ref_count(self, ref_count: u32) -> Self {
        self.usage.ref_count.set(ref_count);
        self
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &Desc {
        &self.desc
    }

    #[inline]
    pub fn payload(&self) -> &Res {
        &self.payload
    }

    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.usage.ref_count()
    }

    #[inline]
    pub fn last_use_frame(&self) -> Frame {
        self.usage.last_use_frame.get()
    }

    /// Nobody is using this item right now.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.ref_count() == 0
    }

    /// How many frames passed since this item was last used, as seen from `current_frame`.
    ///
    /// Meaningless for items that are currently in use.
    #[inline]
    pub fn idle_frames(&self, current_frame: Frame) -> Frame {
        current_frame.frames_since(self.last_use_frame())
    }

    pub(crate) fn is_evictable(&self, current_frame: Frame, min_idle_frames: Frame) -> bool {
        self.is_idle() && self.idle_frames(current_frame) >= min_idle_frames
    }

    pub(crate) fn usage(&self) -> &Rc<Usage<Frame>> {
        &self.usage
    }

    /// Registers a new user, returning the new reference count.
    pub fn acquire(&self) -> u32 {
        self.usage.acquire()
    }
}

impl<Desc: Debug, Res, Frame: FrameIndex> PoolItem<Desc, Res, Frame> {
    /// Unregisters a user, returning the new reference count.
    ///
    /// Once the count drops to zero the item is stamped as last used at `frame`.
    /// Fails without touching the item if it wasn't referenced to begin with.
    pub fn try_release(&self, frame: Frame) -> Result<u32, PoolError> {
        self.usage
            .try_release(frame)
            .ok_or_else(|| underflow(&self.desc))
    }

    /// Like [`Self::try_release`], but treats an unbalanced release as a bug.
    ///
    /// Panics in debug builds. In release builds the error is logged and the count stays at zero.
    pub fn release(&self, frame: Frame) {
        self.usage.release(frame, &self.desc);
    }
}

impl<Desc: Debug, Res, Frame: Debug + Copy> Debug for PoolItem<Desc, Res, Frame> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolItem")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .field("ref_count", &self.usage.ref_count.get())
            .field("last_use_frame", &self.usage.last_use_frame.get())
            .finish_non_exhaustive()
    }
}
