/// Controls how [`crate::ResourcePool::begin_frame`] reclaims unused items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvictionPolicy {
    /// Number of frames an item has to stay unreferenced before it is dropped.
    ///
    /// `Some(0)` drops every unreferenced item on the next frame maintenance.
    /// `None` disables automatic eviction; [`crate::ResourcePool::evict`] can still be called explicitly.
    pub min_idle_frames: Option<u64>,
}

impl EvictionPolicy {
    /// Keep unused items around for a few frames,
    /// long enough to survive resources that flicker in and out of use.
    pub const DEFAULT_MIN_IDLE_FRAMES: u64 = 2;

    pub fn with_min_idle_frames(min_idle_frames: u64) -> Self {
        Self {
            min_idle_frames: Some(min_idle_frames),
        }
    }

    /// Drop anything that isn't referenced at the time of the next frame maintenance.
    pub fn aggressive() -> Self {
        Self::with_min_idle_frames(0)
    }

    /// Never reclaim anything automatically.
    pub fn never() -> Self {
        Self {
            min_idle_frames: None,
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::with_min_idle_frames(Self::DEFAULT_MIN_IDLE_FRAMES)
    }
}
