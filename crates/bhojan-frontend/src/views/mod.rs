mod dropdown_view;
mod header_view;
pub mod panel_view;

use gpui::{
    App, AppContext, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::{Root, WindowExt};

use crate::{
    entities::{
        DataEntities,
        panel_entity::{NotificationPanel, Request},
    },
    views::{dropdown_view::DropdownView, header_view::HeaderView},
};

pub struct FrontendUi {
    header: Entity<HeaderView>,
    dropdown: Entity<DropdownView>,
}

impl FrontendUi {
    pub fn new(data: &DataEntities, _: &mut Window, cx: &mut Context<Self>) -> Self {
        Self {
            header: cx.new(|cx| HeaderView::new(data, cx)),
            dropdown: cx.new(|cx| DropdownView::new(data, cx)),
        }
    }
}

impl Render for FrontendUi {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let dialog_layer = Root::render_dialog_layer(window, cx);

        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_3()
            .p_4()
            .child(self.header.clone())
            .child(self.dropdown.clone())
            .children(dialog_layer)
    }
}

/// Runs `action` against the panel and carries out whatever it asks for.
pub(crate) fn interact(
    data: &DataEntities,
    window: &mut Window,
    cx: &mut App,
    action: impl FnOnce(&mut NotificationPanel) -> Request,
) {
    let request = data.panel.update(cx, |panel, cx| {
        let request = action(panel);
        cx.notify();
        request
    });
    perform(data, request, window, cx);
}

fn perform(data: &DataEntities, request: Request, window: &mut Window, cx: &mut App) {
    match request {
        Request::Send(message) => crate::dispatch(message, cx),
        Request::Confirm(confirmation) => {
            let panel = data.panel.clone();
            let prompt = confirmation.prompt();
            window.open_dialog(cx, move |dialog, _, _| {
                let panel = panel.clone();
                let confirmation = confirmation.clone();
                dialog
                    .title("Please confirm")
                    .child(prompt.clone())
                    .confirm()
                    .on_ok(move |_, _, cx| {
                        let request = panel.update(cx, |panel, cx| {
                            let request = panel.confirm(confirmation.clone());
                            cx.notify();
                            request
                        });
                        if let Request::Send(message) = request {
                            crate::dispatch(message, cx);
                        }
                        true
                    })
            });
        }
        Request::Navigate(target) => {
            let url = data.settings.read(cx).absolute_url(&target);
            log::info!("Opening {url}");
            cx.open_url(&url);
        }
        Request::Nothing => {}
    }
}
