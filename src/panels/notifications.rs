use eframe::egui::{self, Color32};

/// Seconds a notification stays on screen
pub const NOTIFICATION_LIFETIME: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

impl NotificationLevel {
    fn color(&self) -> Color32 {
        match self {
            NotificationLevel::Success => Color32::from_rgb(46, 160, 67),
            NotificationLevel::Info => Color32::from_rgb(56, 132, 244),
            NotificationLevel::Error => Color32::from_rgb(218, 54, 51),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// UI time of the first frame it was shown
    shown_at: Option<f64>,
}

/// Short-lived toasts in the top-right corner
#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Error => log::error!("{}", message),
            _ => log::info!("{}", message),
        }
        self.queue.push(Notification {
            level,
            message,
            shown_at: None,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    pub fn messages(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    /// Stamp new notifications with `now` and drop the expired ones
    pub fn prune(&mut self, now: f64) {
        for notification in &mut self.queue {
            notification.shown_at.get_or_insert(now);
        }
        self.queue
            .retain(|n| n.shown_at.is_some_and(|shown| now - shown < NOTIFICATION_LIFETIME));
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.prune(ctx.input(|i| i.time));
        if self.queue.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for notification in &self.queue {
                    egui::Frame::popup(ui.style())
                        .fill(notification.level.color())
                        .show(ui, |ui| {
                            ui.colored_label(Color32::WHITE, &notification.message);
                        });
                }
            });

        // Keep repainting so toasts disappear without further input
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
