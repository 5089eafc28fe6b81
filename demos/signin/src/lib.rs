#![allow(non_snake_case)]
//! The sign-in demo: a root view that counts text edits, toggles a
//! "signed in" banner every fourth edit, and keeps a running log.

pub mod app;
pub mod button;

pub use app::{RootView, SignInState, sign_in_line};
pub use button::ButtonView;

#[cfg(test)]
mod tests;
