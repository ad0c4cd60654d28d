//! Observer and event dispatch.
//!
//! Both registries sit on top of [`dispatch_list::DispatchList`], which keeps
//! per-dispatch cursors consistent while callbacks add or remove entries
//! mid-walk. The registries never run callbacks themselves: they hand out the
//! next callback and the store invokes it with no lock held.

mod dispatch_list;
mod event_bus;
mod key_existence;
mod observer;

pub(crate) use dispatch_list::CycleId;
pub(crate) use event_bus::EventBus;
pub use event_bus::ListenerFn;
pub use event_bus::ListenerId;
pub(crate) use observer::ObserverRegistry;
pub use observer::ObserverFn;
pub use observer::ObserverId;
