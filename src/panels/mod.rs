mod central_panel;
mod notifications;
mod saved_drawings;
mod tools_panel;

pub use central_panel::central_panel;
pub use notifications::{Notification, NotificationLevel, Notifications};
pub use saved_drawings::saved_drawings_window;
pub use tools_panel::tools_panel;
