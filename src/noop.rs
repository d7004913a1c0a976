use crate::{Frames, StackCapturer};

/// Capturer for targets without a stack walker. Always empty.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopCapturer;

impl StackCapturer for NoopCapturer {
    #[inline]
    fn frames(&self, _ignore_filter: Option<&str>) -> Frames {
        Frames::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_empty() {
        let capturer = NoopCapturer;
        assert!(capturer.frames(None).is_empty());
        assert_eq!(capturer.capture("  ", None), "");
        assert_eq!(capturer.capture("", Some("log::")), "");
    }
}
