use std::time::Instant;

use chrono::Utc;
use gpui::{
    Context, InteractiveElement, IntoElement, ParentElement, Render, StatefulInteractiveElement,
    Styled, Window, div, prelude::FluentBuilder,
};
use gpui_component::{
    ActiveTheme, Disableable, Sizable, StyledExt,
    button::{Button, ButtonVariants},
    checkbox::Checkbox,
    h_flex, v_flex,
};

use crate::{
    entities::DataEntities,
    views::{
        interact,
        panel_view::{Icon, ItemView, render_panel},
    },
};

/// List of the current notifications with their per-item actions.
pub struct DropdownView {
    data: DataEntities,
}

impl DropdownView {
    pub fn new(data: &DataEntities, cx: &mut Context<Self>) -> Self {
        cx.observe(&data.panel, |_, _, cx| cx.notify()).detach();
        Self { data: data.clone() }
    }

    fn render_item(&self, item: ItemView, selectable: bool, cx: &Context<Self>) -> impl IntoElement {
        let position = item.position;
        let muted = cx.theme().muted_foreground;

        let content = {
            let data = self.data.clone();
            let id = item.id.clone();
            v_flex()
                .id(("open", position))
                .flex_1()
                .gap_1()
                .cursor_pointer()
                .child(
                    div()
                        .child(item.title)
                        .when(item.unread, |this| this.font_bold()),
                )
                .child(div().text_sm().child(item.body))
                .when_some(item.time_label, |this, label| {
                    this.child(div().text_xs().text_color(muted).child(label))
                })
                .on_click(move |_, window, cx| {
                    interact(&data, window, cx, |panel| panel.request_open(&id));
                })
        };

        let actions = h_flex()
            .gap_1()
            .when(item.unread, |this| {
                let data = self.data.clone();
                let id = item.id.clone();
                this.child(
                    Button::new(("mark-read", position))
                        .small()
                        .ghost()
                        .label(item.mark_read.label)
                        .disabled(!item.mark_read.enabled)
                        .on_click(move |_, window, cx| {
                            interact(&data, window, cx, |panel| panel.request_mark_read(&id));
                        }),
                )
            })
            .child({
                let data = self.data.clone();
                let id = item.id.clone();
                Button::new(("delete", position))
                    .small()
                    .danger()
                    .label(item.delete.label)
                    .disabled(!item.delete.enabled)
                    .on_click(move |_, window, cx| {
                        interact(&data, window, cx, |panel| panel.request_delete(&id));
                    })
            });

        h_flex()
            .w_full()
            .gap_3()
            .p_2()
            .border_b_1()
            .border_color(cx.theme().border)
            .when(item.unread, |this| this.bg(cx.theme().accent))
            .when(item.removing, |this| this.opacity(0.4))
            .when(selectable, |this| {
                let data = self.data.clone();
                let id = item.id.clone();
                this.child(
                    Checkbox::new(("select", position))
                        .checked(item.selected)
                        .on_click(move |checked, _, cx| {
                            data.panel.update(cx, |panel, cx| {
                                panel.set_selected(id.clone(), *checked);
                                cx.notify();
                            });
                        }),
                )
            })
            .child(div().text_lg().child(item.icon.glyph()))
            .child(content)
            .child(actions)
    }
}

impl Render for DropdownView {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let view = render_panel(self.data.panel.read(cx), Utc::now(), Instant::now());
        let selectable = !view.bulk.is_empty();

        let list = v_flex()
            .id("dropdown")
            .size_full()
            .overflow_y_scroll()
            .border_1()
            .rounded_md()
            .border_color(cx.theme().border);

        if view.items.is_empty() {
            return list.child(
                div()
                    .p_4()
                    .text_color(cx.theme().muted_foreground)
                    .child(format!("{} No notifications", Icon::Bell.glyph())),
            );
        }

        let items: Vec<_> = view
            .items
            .into_iter()
            .map(|item| self.render_item(item, selectable, cx))
            .collect();
        list.children(items)
    }
}
