//! Permission vocabulary.
//!
//! Permissions are flat names; roles are named bundles of them. There is
//! no hierarchy and no wildcard.

/// See live screens and device inventory.
pub const DEVICE_VIEW: &str = "device.view";
/// Send commands to devices.
pub const DEVICE_CONTROL: &str = "device.control";
/// Edit roles, assignments, and policy documents.
pub const POLICY_EDIT: &str = "policy.edit";
/// Broadcast messages to a class.
pub const CLASS_BROADCAST: &str = "class.broadcast";
/// Put devices into exam mode.
pub const EXAM_MODE: &str = "exam.mode";
/// Lock student screens.
pub const SCREEN_LOCK: &str = "student.screen.lock";
/// Block applications on student devices.
pub const APP_BLOCK: &str = "student.app.block";
/// Manage printers.
pub const PRINTER_MANAGE: &str = "printer.manage";
/// Manage network settings.
pub const NETWORK_MANAGE: &str = "network.manage";
/// Manage certificates.
pub const CERTIFICATE_MANAGE: &str = "certificate.manage";

/// The full fixed vocabulary.
pub const ALL_PERMISSIONS: [&str; 10] = [
    DEVICE_VIEW,
    DEVICE_CONTROL,
    POLICY_EDIT,
    CLASS_BROADCAST,
    EXAM_MODE,
    SCREEN_LOCK,
    APP_BLOCK,
    PRINTER_MANAGE,
    NETWORK_MANAGE,
    CERTIFICATE_MANAGE,
];

/// Whether a permission name belongs to the fixed vocabulary.
pub fn is_known_permission(name: &str) -> bool {
    ALL_PERMISSIONS.contains(&name)
}
