/// One-shot suppression of a contiguous run of noise frames.
///
/// While an ignore pattern is armed, every frame whose name contains it is
/// dropped. The first frame that does not contain it disarms the filter, and
/// all later frames pass regardless of their name. This trims logging and
/// wrapper frames sitting on top of the interesting part of the stack.
#[derive(Debug, Clone, Copy)]
pub struct FrameFilter<'a> {
    ignore: Option<&'a str>,
}

impl<'a> FrameFilter<'a> {
    #[inline]
    pub fn new(ignore: Option<&'a str>) -> Self {
        Self { ignore }
    }

    /// Whether the filter is still suppressing frames.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.ignore.is_some()
    }

    /// Decide whether the frame named `name` should be emitted.
    ///
    /// An empty name is never emitted, but it still disarms the filter when
    /// it does not contain the pattern.
    pub fn admit(&mut self, name: &str) -> bool {
        if let Some(pattern) = self.ignore {
            if name.contains(pattern) {
                return false;
            }
            self.ignore = None;
        }
        !name.is_empty()
    }
}
