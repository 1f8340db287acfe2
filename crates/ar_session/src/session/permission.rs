//! Camera permission gate
//!
//! The platform owns the permission state and its request dialog. The session
//! only asks whether the camera may be used and, when it may not, starts the
//! request flow. The answer comes back later as a host event.

/// Camera permission oracle and request flow
pub trait PermissionGate: Send + Sync {
    /// Whether camera access is currently granted
    fn has_camera_permission(&self) -> bool;

    /// Ask the user for camera access
    ///
    /// Fire-and-forget: the result arrives asynchronously as
    /// [`PermissionResult`] through the host event channel.
    fn request_camera_permission(&self);

    /// Open the system settings page where the user can grant access manually
    fn open_permission_settings(&self);
}

/// Outcome of a permission request, delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResult {
    /// Whether access was granted
    pub granted: bool,
    /// The user denied and asked not to be prompted again
    pub dont_ask_again: bool,
}

impl PermissionResult {
    /// Access granted
    pub fn granted() -> Self {
        Self { granted: true, dont_ask_again: false }
    }

    /// Access denied; the request may be shown again later
    pub fn denied() -> Self {
        Self { granted: false, dont_ask_again: false }
    }

    /// Access denied permanently; only system settings can grant it now
    pub fn denied_permanently() -> Self {
        Self { granted: false, dont_ask_again: true }
    }
}
