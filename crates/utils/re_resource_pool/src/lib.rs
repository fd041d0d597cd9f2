//! A pool of reference counted resources, keyed by a descriptor.
//!
//! Typical resources are GPU textures & buffers, compiled shaders or kernels: anything that is
//! expensive to create, interchangeable with any other instance of the same shape,
//! and used for a few frames at a time.
//!
//! A [`ResourcePool`] keeps its items sorted by descriptor.
//! Unreferenced items are handed out again to anyone asking for the same descriptor
//! and dropped once they weren't used for a configurable number of frames.
//!
//! ```
//! use re_resource_pool::{EvictionPolicy, ResourcePool};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
//! struct TextureDesc {
//!     width: u32,
//!     height: u32,
//! }
//!
//! let mut pool =
//!     ResourcePool::<TextureDesc, Vec<u8>>::with_policy(EvictionPolicy::with_min_idle_frames(2));
//! let desc = TextureDesc { width: 4, height: 4 };
//!
//! pool.begin_frame(0);
//! let texture = pool.alloc(&desc, |desc| vec![0; (desc.width * desc.height) as usize]);
//! assert_eq!(pool.get(&texture)?.len(), 16);
//! drop(texture);
//!
//! // The texture is reused rather than recreated.
//! pool.begin_frame(1);
//! let texture = pool.alloc(&desc, |_| unreachable!());
//! drop(texture);
//! assert_eq!(pool.len(), 1);
//!
//! // …and reclaimed once it stayed unused for long enough.
//! pool.begin_frame(2);
//! assert_eq!(pool.len(), 1);
//! pool.begin_frame(3);
//! assert!(pool.is_empty());
//! # Ok::<(), re_resource_pool::PoolError>(())
//! ```
//!
//! The pool is the sole owner of every payload. Handles only keep track of who is using an item,
//! and payloads are reached through [`ResourcePool::get`] while borrowing the pool.
//!
//! Callers that need finer control can use [`ResourcePool::find`] & [`ResourcePool::insert`]
//! and balance [`PoolItem::acquire`] & [`PoolItem::release`] themselves,
//! keeping track of items across frames by their [`ItemId`].

/// Wrapper around puffin profiler on native, no-op on wasm.
macro_rules! profile_function {
    ($($arg: tt)*) => {
        #[cfg(not(target_arch = "wasm32"))]
        puffin::profile_function!($($arg)*);
    };
}

pub(crate) use profile_function;

/// Panics in debug builds, with a "DEBUG PANIC: " prefix. No-op in release builds.
///
/// Callers are expected to log the problem themselves for release builds.
macro_rules! debug_panic {
    ($($arg: tt)+) => {
        ::core::debug_assert!(false, "DEBUG PANIC: {}", ::core::format_args!($($arg)+));
    };
}

pub(crate) use debug_panic;

mod config;
mod error;
mod frame_index;
mod pool_handle;
mod pool_item;
mod resource_pool;

pub use self::{
    config::EvictionPolicy,
    error::PoolError,
    frame_index::FrameIndex,
    pool_handle::PoolHandle,
    pool_item::{ItemId, PoolItem},
    resource_pool::{PoolStatistics, ResourcePool, SizedResourceDesc},
};
