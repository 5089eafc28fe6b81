pub use crate::chrome::{WindowChrome, set_window_title};
pub use crate::effects::{Dispose, disposable_effect, effect, on_unmount};
pub use crate::error::{CoreError, ErrorBoundary, ErrorInfo};
pub use crate::launched_effect;
pub use crate::modifier::Modifier;
pub use crate::reactive::{batch, untracked};
pub use crate::runtime::{Frame, Scheduler, remember, remember_with_key};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::semantics::{Role, Semantics};
pub use crate::signal::{Signal, signal};
pub use crate::view::{Scene, SceneNode, View, ViewId, ViewKind};
