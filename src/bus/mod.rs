//! Message bus access
//!
//! The sync core talks to the bus only through [`Transport`]. Values cross
//! the boundary as [`DynamicValue`] and are type-checked once, in the codecs.

pub mod memory;
pub mod session;
pub mod transport;
pub mod value;

pub use memory::MemoryTransport;
pub use session::ZbusTransport;
pub use transport::{BusMessage, MatchRule, Notification, TimerMethod, Transport, TransportError};
pub use value::{DynamicValue, PropertyMap};

/// Well-known name of the timer service
pub const TIMER_SERVICE: &str = "org.gnome.Pomodoro";
/// Object path of the timer
pub const TIMER_PATH: &str = "/org/gnome/Pomodoro";
/// Interface carrying the timer properties and control methods
pub const TIMER_INTERFACE: &str = "org.gnome.Pomodoro";

pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

pub const NOTIFICATIONS_SERVICE: &str = "org.freedesktop.Notifications";
pub const NOTIFICATIONS_PATH: &str = "/org/freedesktop/Notifications";
pub const NOTIFICATIONS_INTERFACE: &str = "org.freedesktop.Notifications";
