//! Role name constants shared by the auth layer and handlers.

/// Students sign up, check in/out, and earn points.
pub const ROLE_STUDENT: &str = "student";

/// Teachers organize activities and review attendance.
pub const ROLE_TEACHER: &str = "teacher";

/// Admins can do everything a teacher can, everywhere.
pub const ROLE_ADMIN: &str = "admin";
