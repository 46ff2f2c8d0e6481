/// Canvas renderer for the poster marquee
use iced::mouse::Cursor;
use iced::widget::canvas::{self, Frame};
use iced::widget::image::Handle;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme, Vector};
use std::collections::HashMap;

use crate::state::marquee::{Band, DesktopStrip, MarqueeLayout, BAND_ITEM_WIDTH};
use crate::Message;

/// The desktop strip is this many times wider than the canvas
const STRIP_WIDTH_FACTOR: f32 = 2.5;
const STRIP_GAP: f32 = 8.0;
const POSTER_ASPECT: f32 = 300.0 / 500.0;
const BAND_PADDING: f32 = 4.0;

/// Height of the marquee canvas for a layout
pub fn canvas_height(layout: &MarqueeLayout) -> f32 {
    match layout {
        MarqueeLayout::Strip(_) => 240.0,
        MarqueeLayout::Ribbons { .. } => 520.0,
    }
}

/// Draws a `MarqueeLayout` at the current animation phase.
///
/// Posters that have not loaded yet are drawn as faint placeholders.
pub struct MarqueeCanvas<'a> {
    pub layout: &'a MarqueeLayout,
    pub images: &'a HashMap<String, Handle>,
    pub poster_dir: &'a str,
    /// Ribbon phase in `[0, 1)`
    pub phase: f32,
    /// Vertical scroll of the host page, drives the strip's parallax
    pub page_scroll: f32,
}

impl canvas::Program<Message> for MarqueeCanvas<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        match self.layout {
            MarqueeLayout::Strip(strip) => self.draw_strip(&mut frame, strip, bounds.size()),
            MarqueeLayout::Ribbons { bands, blur } => {
                let centers = [bounds.height * 0.35, bounds.height * 0.65];
                for (band, center_y) in bands.iter().zip(centers) {
                    self.draw_band(&mut frame, band, bounds.size(), center_y);
                }
                if *blur {
                    // Frosted wash standing in for a backdrop blur
                    frame.fill_rectangle(
                        Point::ORIGIN,
                        bounds.size(),
                        Color::from_rgba(0.85, 0.9, 1.0, 0.06),
                    );
                }
            }
        }

        vec![frame.into_geometry()]
    }
}

impl MarqueeCanvas<'_> {
    fn draw_strip(&self, frame: &mut Frame, strip: &DesktopStrip, size: Size) {
        let count = strip.items.len();
        if count == 0 {
            return;
        }

        let strip_width = size.width * STRIP_WIDTH_FACTOR;
        let item_width = (strip_width - STRIP_GAP * (count as f32 - 1.0)) / count as f32;
        let item_height = (item_width * POSTER_ASPECT).min(size.height);
        let top = (size.height - item_height) / 2.0;
        let start = strip.translation(size.width, self.page_scroll);

        for (i, asset) in strip.items.iter().enumerate() {
            let x = start + i as f32 * (item_width + STRIP_GAP);
            if x + item_width < 0.0 || x > size.width {
                continue;
            }
            let slot = Rectangle::new(Point::new(x, top), Size::new(item_width, item_height));
            self.draw_poster(frame, &asset.path(self.poster_dir), slot, 0.03);
        }
    }

    fn draw_band(&self, frame: &mut Frame, band: &Band, size: Size, center_y: f32) {
        let item_height = BAND_ITEM_WIDTH * POSTER_ASPECT;
        let slot_height = item_height + BAND_PADDING * 2.0;
        // Ribbons are twice the canvas width so their ends stay off-screen when tilted
        let left = -size.width;
        let offset = band.translation(self.phase);

        frame.with_save(|frame| {
            frame.translate(Vector::new(size.width / 2.0, center_y));
            frame.rotate(band.rotation_deg.to_radians());
            frame.translate(Vector::new(-size.width / 2.0, -slot_height / 2.0));

            for (i, asset) in band.items.iter().enumerate() {
                let x = left + offset + i as f32 * BAND_ITEM_WIDTH;
                if x + BAND_ITEM_WIDTH < left || x > size.width * 2.0 {
                    continue;
                }
                let slot = Rectangle::new(
                    Point::new(x + BAND_PADDING, BAND_PADDING),
                    Size::new(BAND_ITEM_WIDTH - BAND_PADDING * 2.0, item_height),
                );
                self.draw_poster(frame, &asset.path(self.poster_dir), slot, 0.01);
            }
        });
    }

    fn draw_poster(&self, frame: &mut Frame, path: &str, slot: Rectangle, tint: f32) {
        match self.images.get(path) {
            Some(handle) => frame.draw_image(slot, canvas::Image::new(handle.clone())),
            None => frame.fill_rectangle(
                slot.position(),
                slot.size(),
                Color::from_rgba(1.0, 1.0, 1.0, 0.05),
            ),
        }
        // Light blue wash over every poster
        frame.fill_rectangle(
            slot.position(),
            slot.size(),
            Color::from_rgba(0.576, 0.773, 0.992, tint),
        );
    }
}
