//! Store Bindings
//!
//! A [`Binding`] gives a component a locally held mirror of the parts of one
//! store it declared, kept current by store notifications.
//!
//! # Lifecycle
//!
//! 1. **Resolve**: the [`StoreDescriptor`] becomes a `(handle, identity)`
//!    pair. Failure is fatal and happens before anything else.
//! 2. **Snapshot**: declarations are normalized and the initial mirror is
//!    read from the store.
//! 3. **Attach**: one listener per resolved topic.
//! 4. **Patch**: each notification runs through the applier; the result
//!    becomes the new mirror and observers are told.
//! 5. **Unmount**: every listener is removed exactly once. Dropping the
//!    binding unmounts it.
//!
//! ```rust,ignore
//! let binding = Binding::mount("app", &["count".into()], &registry, &MirrorConfig::default())?;
//! binding.on_change(|mirror| render(mirror));
//! ```

mod cell;
mod descriptor;
mod single;

pub(crate) use cell::MirrorCell;
pub use cell::Observer;
pub use descriptor::{resolve_descriptor, ResolvedStore, StoreDescriptor};
pub use single::Binding;
