/// Viewport classification
///
/// The host width is read once when the marquee is built and never
/// re-evaluated on resize.

/// Widths strictly below this are treated as mobile
pub const MOBILE_BREAKPOINT: f32 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    /// Classify a host width.
    ///
    /// `None` means there is no addressable viewport (headless, or the
    /// window size could not be read); that falls back to Desktop.
    pub fn classify(width: Option<f32>) -> Self {
        match width {
            Some(w) if w < MOBILE_BREAKPOINT => ViewportClass::Mobile,
            _ => ViewportClass::Desktop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_breakpoint_is_mobile() {
        assert_eq!(ViewportClass::classify(Some(320.0)), ViewportClass::Mobile);
        assert_eq!(ViewportClass::classify(Some(767.9)), ViewportClass::Mobile);
    }

    #[test]
    fn test_breakpoint_itself_is_desktop() {
        assert_eq!(ViewportClass::classify(Some(768.0)), ViewportClass::Desktop);
        assert_eq!(ViewportClass::classify(Some(1920.0)), ViewportClass::Desktop);
    }

    #[test]
    fn test_missing_viewport_is_desktop() {
        assert_eq!(ViewportClass::classify(None), ViewportClass::Desktop);
    }
}
