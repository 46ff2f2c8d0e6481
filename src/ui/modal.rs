/// Modal shell: dimmed backdrop plus a centered panel laid over `base`
use iced::widget::{
    button, center, column, container, horizontal_rule, mouse_area, opaque, row, stack, text,
    Space,
};
use iced::{alignment, Background, Border, Color, Element, Length, Shadow, Vector};

use crate::state::modal::{CloseReason, ModalConfig, ModalState};
use crate::state::viewport::ViewportClass;

pub fn modal<'a, Message>(
    base: impl Into<Element<'a, Message>>,
    state: &ModalState,
    config: &ModalConfig,
    viewport: ViewportClass,
    on_close: fn(CloseReason) -> Message,
    content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let base = base.into();
    if !state.is_visible() {
        return base;
    }

    let opacity = state.opacity();
    let radius = config.rounded.radius();

    let backdrop = container(Space::new(Length::Fill, Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| container::Style {
            background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.25 * opacity))),
            ..Default::default()
        });

    let title = text(config.title.clone())
        .size(18)
        .width(Length::Fill)
        .align_x(if config.center_title() {
            alignment::Horizontal::Center
        } else {
            alignment::Horizontal::Left
        });

    let mut header = row![title].align_y(alignment::Vertical::Center).padding(20);
    if config.show_close_button() {
        header = header.push(
            button(text("✕").size(18))
                .on_press(on_close(CloseReason::CloseButton))
                .style(button::text),
        );
    }

    let mut body = column![header];
    if config.show_divider() {
        body = body.push(horizontal_rule(1).style(move |theme| {
            let mut style = iced::widget::rule::default(theme);
            style.color.a = 0.3 * opacity;
            style
        }));
    }
    body = body.push(content.into());

    let panel = container(body)
        .width(Length::Fill)
        .max_width(config.max_width(viewport) * state.scale())
        .style(move |_| container::Style {
            background: Some(Background::Color(Color::from_rgba(
                0.18,
                0.16,
                0.36,
                0.7 * opacity,
            ))),
            text_color: Some(Color::from_rgba(0.95, 0.95, 0.97, opacity)),
            border: Border {
                radius: radius.into(),
                ..Default::default()
            },
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.3 * opacity),
                offset: Vector::new(0.0, 8.0),
                blur_radius: 24.0,
            },
        });

    stack![
        base,
        opaque(mouse_area(backdrop).on_press(on_close(CloseReason::Backdrop))),
        center(opaque(panel)).padding(16),
    ]
    .into()
}
