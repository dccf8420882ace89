/// Narrow capability interface for the presentation side effects the engine
/// requests on state changes. The engine never touches a UI tree directly;
/// hosts implement whatever focus/scroll-lock/submenu wiring their toolkit
/// needs.
pub trait PresentationEffects: Send + Sync {
    /// Applied when the primary surface becomes visible or hidden
    /// (e.g. a page scroll lock).
    fn apply_visibility_effect(&self, _visible: bool) {}

    /// Move input focus to the primary surface.
    fn request_focus(&self) {}

    /// One-time modal wiring after the surface becomes visible
    /// (e.g. submenu interactivity).
    fn wire_modal(&self) {}
}

/// Does nothing; the default for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl PresentationEffects for NoEffects {}
