use bhojan_bridge::alert::{AlertKind, AlertMessage};
use gpui::{IntoElement, ParentElement, Styled, div};
use gpui_component::{ActiveTheme, Icon, IconName, h_flex};

#[derive(IntoElement)]
pub struct AlertBanner {
    alert: AlertMessage,
}

impl AlertBanner {
    pub fn new(alert: AlertMessage) -> Self {
        Self { alert }
    }
}

impl gpui::RenderOnce for AlertBanner {
    fn render(self, _: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        let theme = cx.theme();
        let (icon, color) = match self.alert.kind {
            AlertKind::Info => (IconName::Info, theme.info),
            AlertKind::Success => (IconName::CircleCheck, theme.success),
            AlertKind::Warning => (IconName::TriangleAlert, theme.warning),
            AlertKind::Error => (IconName::CircleX, theme.danger),
        };

        h_flex()
            .w_full()
            .gap_2()
            .px_3()
            .py_2()
            .rounded_md()
            .border_1()
            .border_color(color)
            .text_color(color)
            .text_sm()
            .child(Icon::new(icon))
            .child(div().child(self.alert.message))
    }
}
