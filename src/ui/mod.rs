/// iced views over the state module
///
/// - `marquee.rs` - canvas program drawing the poster strip or ribbons
/// - `modal.rs` - backdrop + panel shell
/// - `avatar_grid.rs` - avatar tiles inside the shell

pub mod avatar_grid;
pub mod marquee;
pub mod modal;
