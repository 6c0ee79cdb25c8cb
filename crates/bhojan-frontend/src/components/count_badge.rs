use gpui::{
    IntoElement, ParentElement, SharedString, Styled, div, prelude::FluentBuilder, px,
};
use gpui_component::{ActiveTheme, StyledExt};

/// Pill with an unread count next to a label. A `None` count renders the
/// label alone.
#[derive(IntoElement)]
pub struct CountBadge {
    label: SharedString,
    count: Option<String>,
}

impl CountBadge {
    pub fn new(label: impl Into<SharedString>) -> Self {
        Self {
            label: label.into(),
            count: None,
        }
    }

    pub fn count(mut self, count: Option<String>) -> Self {
        self.count = count;
        self
    }
}

impl gpui::RenderOnce for CountBadge {
    fn render(self, _: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        div()
            .flex()
            .items_center()
            .gap_1()
            .child(self.label)
            .when_some(self.count, |this, count| {
                this.child(
                    div()
                        .px_1p5()
                        .min_w(px(18.0))
                        .rounded_full()
                        .bg(cx.theme().danger)
                        .text_color(cx.theme().danger_foreground)
                        .text_xs()
                        .font_semibold()
                        .flex()
                        .justify_center()
                        .child(count),
                )
            })
    }
}
