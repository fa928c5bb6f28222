//! Navigation surface used on terminal session loss.

/// Routes the application to its unauthenticated entry point.
///
/// Called by the session invalidation handler at most once per lost
/// session, after credentials have been cleared.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);

    /// Called when new credentials are established after a login.
    fn session_established(&self) {}
}
