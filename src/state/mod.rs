/// State management module
///
/// This module holds the view-models, free of any iced types:
/// - Shared data structures (data.rs)
/// - Viewport classification (viewport.rs)
/// - Marquee layout and animation phase (marquee.rs)
/// - Modal shell state machine and presets (modal.rs)
/// - Avatar catalog, selection and cached profile (avatar.rs)

pub mod avatar;
pub mod data;
pub mod marquee;
pub mod modal;
pub mod viewport;
