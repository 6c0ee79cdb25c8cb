use std::time::Instant;

use bhojan_bridge::{MessageToBackend, feed::Category};
use chrono::Utc;
use gpui::{Context, IntoElement, ParentElement, Render, Styled, Window, div, prelude::FluentBuilder};
use gpui_component::{
    Disableable, Sizable, StyledExt,
    button::{Button, ButtonVariants},
    h_flex,
    switch::Switch,
    v_flex,
};

use crate::{
    components::{alert_banner::AlertBanner, count_badge::CountBadge},
    entities::DataEntities,
    views::{interact, panel_view::render_panel},
};

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Orders => "Orders",
        Category::Messages => "Messages",
        Category::Reviews => "Reviews",
        Category::General => "General",
    }
}

/// Bell with its badges, the panel-wide controls and the transient alert.
pub struct HeaderView {
    data: DataEntities,
}

impl HeaderView {
    pub fn new(data: &DataEntities, cx: &mut Context<Self>) -> Self {
        cx.observe(&data.panel, |_, _, cx| cx.notify()).detach();
        Self { data: data.clone() }
    }
}

impl Render for HeaderView {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let view = render_panel(self.data.panel.read(cx), Utc::now(), Instant::now());
        let data = self.data.clone();

        let badges = h_flex()
            .gap_4()
            .items_center()
            .child(CountBadge::new("🔔").count(view.badge.main.clone()))
            .children(view.badge.categories.iter().map(|(category, count)| {
                CountBadge::new(category_label(*category)).count(count.clone())
            }));

        let controls = h_flex()
            .gap_2()
            .items_center()
            .child(
                Switch::new("mute")
                    .checked(view.muted)
                    .label("Mute")
                    .on_click(|_, _, cx| {
                        crate::dispatch(MessageToBackend::ToggleMuteRequest, cx);
                    }),
            )
            .child(
                Button::new("refresh")
                    .small()
                    .ghost()
                    .label("Refresh")
                    .on_click(|_, _, cx| crate::dispatch(MessageToBackend::RefreshRequest, cx)),
            )
            .child({
                let data = data.clone();
                Button::new("mark-all-read")
                    .small()
                    .primary()
                    .label(view.mark_all_read.label.clone())
                    .disabled(!view.mark_all_read.enabled)
                    .on_click(move |_, window, cx| {
                        interact(&data, window, cx, |panel| panel.request_mark_all_read());
                    })
            });

        let bulk = h_flex().gap_2().children(view.bulk.iter().map(|(action, control)| {
            let action = *action;
            let data = data.clone();
            Button::new(("bulk", action as usize))
                .small()
                .label(control.label.clone())
                .disabled(!control.enabled)
                .on_click(move |_, window, cx| {
                    interact(&data, window, cx, |panel| panel.request_bulk(action));
                })
        }));

        v_flex()
            .w_full()
            .gap_3()
            .child(
                h_flex()
                    .w_full()
                    .justify_between()
                    .child(div().child("Notifications").text_xl().font_bold())
                    .child(badges),
            )
            .child(controls)
            .when(!view.bulk.is_empty(), |this| this.child(bulk))
            .when_some(view.alert, |this, alert| this.child(AlertBanner::new(alert)))
    }
}
