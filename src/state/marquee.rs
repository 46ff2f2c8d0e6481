/// Marquee layout selection
///
/// Turns an ordered list of posters plus a viewport class into either a
/// single parallax strip (desktop) or two crossing ribbons (mobile).
/// Nothing here touches iced; `ui::marquee` draws whatever this builds.
use std::time::Duration;

use super::data::ImageAsset;
use super::viewport::ViewportClass;

/// Maximum number of posters in the desktop strip
pub const DESKTOP_LIMIT: usize = 10;

/// Fixed horizontal offset of the desktop strip, as a fraction of its width
pub const DESKTOP_OFFSET: f32 = -0.6;

/// Horizontal pixels moved per scrolled pixel, per unit of speed
pub const PARALLAX_RATE: f32 = 0.1;

/// Tilt of each mobile ribbon in degrees (one positive, one negative)
pub const BAND_ROTATION_DEG: f32 = 15.0;

/// Width of a single poster slot in a mobile ribbon
pub const BAND_ITEM_WIDTH: f32 = 250.0;

/// Size requested from the image delivery layer for every poster
pub const POSTER_REQUEST: (u32, u32) = (500, 300);

/// Time for a ribbon to travel half its content width
pub const BAND_LOOP: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Content travels right to left
    Forward,
    /// Content travels left to right
    Reverse,
}

/// One tilted, continuously scrolling ribbon
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub items: Vec<ImageAsset>,
    pub direction: ScrollDirection,
    pub rotation_deg: f32,
}

impl Band {
    /// Total width of the ribbon's content
    pub fn content_width(&self) -> f32 {
        self.items.len() as f32 * BAND_ITEM_WIDTH
    }

    /// Horizontal translation at `phase` in `[0, 1)`.
    ///
    /// A full cycle moves the content by half its width; the second half
    /// repeats the first so the jump back is invisible.
    pub fn translation(&self, phase: f32) -> f32 {
        let half = self.content_width() / 2.0;
        let travel = phase * half;
        match self.direction {
            ScrollDirection::Forward => -travel,
            ScrollDirection::Reverse => travel - half,
        }
    }
}

/// Desktop strip bound to the page's scroll position
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopStrip {
    pub items: Vec<ImageAsset>,
    pub scroll_speed: f32,
}

impl DesktopStrip {
    /// Horizontal translation for a strip of `strip_width` pixels when the
    /// host page is scrolled `page_scroll` pixels down.
    pub fn translation(&self, strip_width: f32, page_scroll: f32) -> f32 {
        strip_width * DESKTOP_OFFSET + page_scroll * self.scroll_speed * PARALLAX_RATE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarqueeLayout {
    Strip(DesktopStrip),
    Ribbons {
        bands: [Band; 2],
        /// Frosted overlay across both ribbons
        blur: bool,
    },
}

impl MarqueeLayout {
    /// Pick a rendering strategy for `images`.
    ///
    /// Never fails: an empty list yields an empty strip or empty ribbons.
    pub fn build(images: &[ImageAsset], speed: f32, viewport: ViewportClass) -> Self {
        match viewport {
            ViewportClass::Desktop => MarqueeLayout::Strip(DesktopStrip {
                items: images.iter().take(DESKTOP_LIMIT).cloned().collect(),
                scroll_speed: speed,
            }),
            ViewportClass::Mobile => MarqueeLayout::Ribbons {
                bands: [
                    Band {
                        items: images.to_vec(),
                        direction: ScrollDirection::Reverse,
                        rotation_deg: BAND_ROTATION_DEG,
                    },
                    Band {
                        items: images.to_vec(),
                        direction: ScrollDirection::Forward,
                        rotation_deg: -BAND_ROTATION_DEG,
                    },
                ],
                blur: true,
            },
        }
    }

    /// Number of poster slots this layout draws
    pub fn render_count(&self) -> usize {
        match self {
            MarqueeLayout::Strip(strip) => strip.items.len(),
            MarqueeLayout::Ribbons { bands, .. } => bands.iter().map(|b| b.items.len()).sum(),
        }
    }

    /// Every asset this layout needs loaded, in draw order, duplicates included
    pub fn assets(&self) -> Vec<&ImageAsset> {
        match self {
            MarqueeLayout::Strip(strip) => strip.items.iter().collect(),
            MarqueeLayout::Ribbons { bands, .. } => {
                bands.iter().flat_map(|b| b.items.iter()).collect()
            }
        }
    }
}

/// Running phase of the ribbon animation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarqueeAnimation {
    phase: f32,
}

impl MarqueeAnimation {
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `elapsed`, wrapping at one full loop
    pub fn advance(&mut self, elapsed: Duration) {
        let step = elapsed.as_secs_f32() / BAND_LOOP.as_secs_f32();
        self.phase = (self.phase + step).rem_euclid(1.0);
    }
}
