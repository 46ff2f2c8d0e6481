use iced::widget::image::Handle;
use iced::widget::{button, center, container, image, scrollable, text};
use iced::{Background, Border, Color, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use crate::state::avatar::AVATAR_REQUEST;
use crate::state::data::AvatarOption;
use crate::Message;

/// Tile width; two fit side by side in an `md` panel, one on mobile
const TILE_WIDTH: f32 = 200.0;
const GRID_HEIGHT: f32 = 320.0;

/// Selectable avatar tiles, in the order the server returned them
pub fn avatar_grid<'a>(
    options: &'a [AvatarOption],
    images: &'a HashMap<String, Handle>,
    loading: bool,
) -> Element<'a, Message> {
    if options.is_empty() {
        let placeholder = if loading { "Loading avatars…" } else { "" };
        return container(text(placeholder).size(14))
            .height(Length::Fixed(GRID_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(GRID_HEIGHT))
            .into();
    }

    let tiles: Vec<Element<'a, Message>> = options
        .iter()
        .enumerate()
        .map(|(index, option)| tile(index, option, images.get(&option.url)))
        .collect();

    let grid = Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0);

    container(scrollable(container(grid).padding(8)).height(Length::Fixed(GRID_HEIGHT)))
        .padding(16)
        .width(Length::Fill)
        .into()
}

fn tile<'a>(index: usize, option: &'a AvatarOption, handle: Option<&Handle>) -> Element<'a, Message> {
    let (w, h) = AVATAR_REQUEST;
    let face: Element<'a, Message> = match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(w as f32))
            .height(Length::Fixed(h as f32))
            .into(),
        None => text(option.name.as_str()).size(14).into(),
    };

    button(center(face).height(Length::Fixed(h as f32 + 16.0)))
        .width(Length::Fixed(TILE_WIDTH))
        .padding(8)
        .on_press(Message::AvatarChosen(index))
        .style(|_, status| {
            let hover = matches!(status, button::Status::Hovered | button::Status::Pressed);
            button::Style {
                background: hover.then(|| Background::Color(Color::from_rgba(0.6, 0.55, 0.9, 0.2))),
                border: Border {
                    color: Color::from_rgba(0.6, 0.55, 0.9, 0.3),
                    width: 1.0,
                    radius: 12.0.into(),
                },
                text_color: Color::WHITE,
                ..Default::default()
            }
        })
        .into()
}
