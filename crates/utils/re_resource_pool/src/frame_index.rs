/// A frame (or tick) counter as handed to the pool by its owner.
///
/// Counters are expected to advance once per frame and are allowed to wrap around.
/// Idle durations must therefore always be computed with [`FrameIndex::frames_since`],
/// which subtracts modulo the width of the counter, never by comparing two counters directly.
pub trait FrameIndex: Copy + Default + Eq + Ord + std::fmt::Debug + std::hash::Hash {
    /// Largest representable frame count.
    const MAX: Self;

    /// Number of frames that passed since `earlier`, modulo the counter width.
    fn frames_since(self, earlier: Self) -> Self;

    /// Converts a frame count into this counter's width, saturating at [`FrameIndex::MAX`].
    fn saturating_from_u64(frames: u64) -> Self;
}

macro_rules! impl_frame_index {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FrameIndex for $ty {
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn frames_since(self, earlier: Self) -> Self {
                    self.wrapping_sub(earlier)
                }

                #[inline]
                fn saturating_from_u64(frames: u64) -> Self {
                    Self::try_from(frames).unwrap_or(Self::MAX)
                }
            }
        )*
    };
}

impl_frame_index!(u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::FrameIndex;

    #[test]
    fn frames_since_without_wrap() {
        assert_eq!(5_u64.frames_since(5), 0);
        assert_eq!(20_u64.frames_since(10), 10);
        assert_eq!(15_u32.frames_since(10), 5);
    }

    #[test]
    fn frames_since_across_wrap() {
        // Last used three frames before the wrap, now two frames after it.
        let last_use = u32::MAX - 2;
        let current = 2_u32;
        assert_eq!(current.frames_since(last_use), 5);

        let last_use = u16::MAX;
        let current = 0_u16;
        assert_eq!(current.frames_since(last_use), 1);

        assert_eq!(3_u64.frames_since(u64::MAX), 4);
    }

    #[test]
    fn saturating_conversion() {
        assert_eq!(u16::saturating_from_u64(7), 7);
        assert_eq!(u16::saturating_from_u64(1 << 20), u16::MAX);
        assert_eq!(u32::saturating_from_u64(u64::MAX), u32::MAX);
        assert_eq!(u64::saturating_from_u64(u64::MAX), u64::MAX);
    }
}
