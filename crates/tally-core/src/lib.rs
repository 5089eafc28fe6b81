//! # State, Signals, and Effects
//!
//! Tally uses a small reactive core instead of a retained widget tree with
//! mutable fields. The pieces:
//!
//! - `Signal<T>`: observable, reactive value.
//! - `batch`: groups writes so they commit together.
//! - `remember*`: lifecycle‑aware storage bound to composition.
//! - `launched_effect!` / `disposable_effect`: side‑effects keyed on watched
//!   values, run after a composition pass commits.
//!
//! ## Signals and commits
//!
//! ```rust
//! use tally_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//!
//! batch(|| {
//!     count.update(|v| *v += 1);
//!     count.update(|v| *v += 1);
//!     // still the committed value
//!     assert_eq!(count.get(), 2);
//! });
//! assert_eq!(count.get(), 4);
//! ```
//!
//! Every event handler dispatched by the scheduler runs in a batch, so a
//! handler reads one consistent snapshot and its queued updates compose.
//!
//! ## Remembered state
//!
//! UI state is held in `remember_*` slots rather than globals:
//!
//! ```rust,ignore
//! fn counter() -> View {
//!     let count = remember_with_key("count", || signal(0));
//!     tally_ui::Button(format!("Count = {}", count.get()), {
//!         let count = count.clone();
//!         move || count.update(|c| *c += 1)
//!     })
//! }
//! ```
//!
//! - `remember` is order‑based: the Nth call in a composition always refers
//!   to the Nth stored value.
//! - `remember_with_key` is key‑based and stable across conditional branches.
//!
//! All slots are released when the scheduler unmounts.
//!
//! ## Effects
//!
//! ```rust,ignore
//! launched_effect!(count.get(), move || set_window_title(format!("Clicked: {n}")));
//! ```
//!
//! The key is the watch-list. It is compared against the previous pass; when
//! it differs the effect is queued and runs once composition has committed.
//! If an effect writes state the composition read, the scheduler composes
//! again before producing the frame.

pub mod chrome;
pub mod effects;
pub mod error;
pub mod modifier;
pub mod prelude;
pub mod reactive;
pub mod runtime;
pub mod scope;
pub mod semantics;
pub mod signal;
pub mod view;

pub use chrome::*;
pub use effects::*;
pub use error::*;
pub use modifier::*;
pub use reactive::{ObserverId, SignalId, batch, is_batching, untracked};
pub use runtime::*;
pub use scope::*;
pub use semantics::*;
pub use signal::*;
pub use view::*;
