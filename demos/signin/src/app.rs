use std::rc::Rc;

use tally_core::*;
use tally_ui::*;

use crate::button::ButtonView;

pub const IMAGE_SRC: &str = "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQSN5kyGXRsJTnCvfM371Ycg8u7k9viw1gW-g&s";

pub fn sign_in_line(signed_in: bool) -> &'static str {
    if signed_in {
        "You are now signed in\n"
    } else {
        "You are now not signed in\n"
    }
}

/// Everything the root view owns. Lives in a remembered slot, so it is
/// dropped when the root unmounts.
#[derive(Clone, Debug)]
pub struct SignInState {
    pub click_count: Signal<u64>,
    pub text_value: Signal<String>,
    pub signed_in: Signal<bool>,
    pub log_text: Signal<String>,
    pub collected: Signal<Vec<String>>,
}

impl Default for SignInState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInState {
    pub fn new() -> Self {
        Self {
            click_count: signal(0),
            text_value: signal(String::new()),
            signed_in: signal(false),
            log_text: signal(String::new()),
            collected: signal(Vec::new()),
        }
    }

    pub fn increment_count(&self) {
        self.click_count.update(|n| *n += 1);
    }

    pub fn toggle_signed_in(&self) {
        self.signed_in.update(|s| *s = !*s);
    }

    /// Handlers run in a batch: the count read here is the value committed
    /// before this event, and the queued writes below apply in order.
    pub fn handle_text_change(&self, value: String) {
        if self.click_count.get() % 4 == 0 {
            self.toggle_signed_in();
        }
        self.increment_count();
        self.text_value.set(value.clone());

        let line = format!("{value}\n");
        self.collected.update(move |c| c.push(value));
        self.log_text.update(move |log| log.push_str(&line));
    }

    /// Items shown by the list: all collected values while the count is a
    /// positive multiple of ten, nothing otherwise.
    pub fn visible_items(&self) -> Vec<String> {
        let count = self.click_count.get();
        if count > 0 && count % 10 == 0 {
            self.collected.get()
        } else {
            Vec::new()
        }
    }
}

pub fn RootView(_s: &mut Scheduler) -> View {
    let state: Rc<SignInState> = remember_with_key("signin", SignInState::new);

    disposable_effect((), || {
        log::info!("root view mounted");
        Dispose::new(|| log::info!("root view unmounted"))
    });

    let count = state.click_count.get();
    launched_effect!(count, move || set_window_title(format!("Clicked: {count}")));

    let signed_in = state.signed_in.get();
    launched_effect!(signed_in, {
        let log_text = state.log_text.clone();
        move || log_text.set(sign_in_line(signed_in).to_string())
    });

    let items: Vec<View> = state
        .visible_items()
        .into_iter()
        .enumerate()
        .map(|(i, v)| ListItem(Modifier::new().key(format!("li-{i}")), v))
        .collect();

    Column(Modifier::new()).child((
        signed_in.then(|| {
            Heading(1, "Welcome Back").modifier(Modifier::new().test_tag("welcome"))
        }),
        ButtonView(
            count,
            {
                let state = state.clone();
                move || state.increment_count()
            },
            0,
        ),
        TextField(state.text_value.get(), "type something", {
            let state = state.clone();
            move |v| state.handle_text_change(v)
        })
        .state_key(1)
        .modifier(Modifier::new().test_tag("text-input")),
        Image(Modifier::new(), IMAGE_SRC, ""),
        List(Modifier::new().test_tag("collected")).child(items),
        TextArea(Modifier::new().test_tag("log"), state.log_text.get()),
    ))
}
