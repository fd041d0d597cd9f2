//! Simulates a renderer allocating render targets from a pool over a couple of frames.
//!
//! Run with `RUST_LOG=trace` to see every reuse, insertion and eviction.

use re_resource_pool::{EvictionPolicy, PoolError, ResourcePool, SizedResourceDesc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RenderTargetDesc {
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
}

impl SizedResourceDesc for RenderTargetDesc {
    fn resource_size_in_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.bytes_per_pixel as u64
    }
}

struct RenderTarget {
    pixels: Vec<u8>,
}

fn create_render_target(desc: &RenderTargetDesc) -> RenderTarget {
    log::info!("Creating render target {desc:?}");
    RenderTarget {
        pixels: vec![0; desc.resource_size_in_bytes() as usize],
    }
}

fn main() -> Result<(), PoolError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let main_view = RenderTargetDesc {
        width: 640,
        height: 480,
        bytes_per_pixel: 4,
    };
    let thumbnail = RenderTargetDesc {
        width: 64,
        height: 64,
        bytes_per_pixel: 4,
    };

    let mut pool = ResourcePool::<RenderTargetDesc, RenderTarget>::with_policy(
        EvictionPolicy::with_min_idle_frames(3),
    );

    for frame_index in 0..10 {
        pool.begin_frame(frame_index);

        let color = pool.alloc(&main_view, create_render_target);
        let blur_ping = pool.alloc(&main_view, create_render_target);
        let blur_pong = pool.alloc(&main_view, create_render_target);

        // Thumbnails are only drawn for the first few frames, after that their target gets reclaimed.
        let thumbnail_target =
            (frame_index < 4).then(|| pool.alloc(&thumbnail, create_render_target));

        let mut num_bytes = 0;
        for target in [Some(&color), Some(&blur_ping), Some(&blur_pong), thumbnail_target.as_ref()]
            .into_iter()
            .flatten()
        {
            num_bytes += pool.get(target)?.pixels.len();
        }

        log::info!(
            "Frame {frame_index}: touched {num_bytes} bytes, pool holds {} targets ({} bytes)",
            pool.len(),
            pool.total_resource_size_in_bytes(),
        );
    }

    log::info!("{:?}", pool.statistics());
    Ok(())
}
