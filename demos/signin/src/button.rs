use tally_core::*;
use tally_ui::Button;

/// Stateless counter button. `body` is whatever content the parent nested
/// inside it; it is only logged.
pub fn ButtonView(count: u64, on_click: impl Fn() + 'static, body: impl std::fmt::Debug) -> View {
    log::debug!("button body: {body:?}");
    Button(format!("Clicked {count}"), on_click)
        .modifier(Modifier::new().test_tag("count-button"))
}
