/// Urgency class of a user-visible notification.
///
/// Frontends map the class to presentation; the engine only decides how
/// loud a message should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Neutral status information.
    Info,
    /// An operation finished as requested.
    Success,
    /// Something went sideways but the session can continue.
    Warning,
    /// An operation failed and needs the user's attention.
    Error,
}

/// A notification payload intended for the user interface.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// How urgently the message should be presented.
    pub notification_type: NotificationType,
    /// The text content to display to the user.
    pub message: String,
}
