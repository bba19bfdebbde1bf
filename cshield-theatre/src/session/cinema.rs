//! Presentation ("cinema") mode
//!
//! Tracks the enlarged layout, the injected exit control and the Escape
//! handler together so none of them can be added twice.

use tracing::debug;

use super::surface::MediaSurface;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CinemaMode {
    active: bool,
    control_injected: bool,
    escape_handler: bool,
}

impl CinemaMode {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether Escape is currently bound to leaving presentation mode
    pub fn handles_escape(&self) -> bool {
        self.escape_handler
    }

    /// Enter presentation mode; returns false when already active
    pub fn enter(&mut self, surface: &dyn MediaSurface) -> bool {
        if self.active {
            debug!("Cinema mode already active");
            return false;
        }
        surface.set_enlarged(true);
        if !self.control_injected {
            surface.inject_exit_control();
            self.control_injected = true;
        }
        self.escape_handler = true;
        self.active = true;
        true
    }

    /// Leave presentation mode; returns false when not active
    pub fn exit(&mut self, surface: &dyn MediaSurface) -> bool {
        if !self.active {
            return false;
        }
        surface.set_enlarged(false);
        if self.control_injected {
            surface.remove_exit_control();
            self.control_injected = false;
        }
        self.escape_handler = false;
        self.active = false;
        true
    }

    /// Flip the mode; returns the new state
    pub fn toggle(&mut self, surface: &dyn MediaSurface) -> bool {
        if self.active {
            self.exit(surface);
        } else {
            self.enter(surface);
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::RecordingSurface;

    #[test]
    fn test_double_enter_injects_one_control() {
        let surface = RecordingSurface::default();
        let mut cinema = CinemaMode::default();

        assert!(cinema.enter(&surface));
        assert!(!cinema.enter(&surface));
        assert_eq!(surface.exit_controls(), 1);
        assert_eq!(surface.max_exit_controls(), 1);
        assert!(cinema.handles_escape());
    }

    #[test]
    fn test_exit_removes_control_and_handler() {
        let surface = RecordingSurface::default();
        let mut cinema = CinemaMode::default();

        cinema.enter(&surface);
        assert!(cinema.exit(&surface));
        assert!(!cinema.exit(&surface));
        assert_eq!(surface.exit_controls(), 0);
        assert!(!cinema.handles_escape());
        assert!(!surface.is_enlarged());
    }

    #[test]
    fn test_toggle_cycles_keep_single_control() {
        let surface = RecordingSurface::default();
        let mut cinema = CinemaMode::default();

        for _ in 0..5 {
            cinema.toggle(&surface);
        }
        assert!(cinema.is_active());
        assert_eq!(surface.exit_controls(), 1);
        assert_eq!(surface.max_exit_controls(), 1);
    }
}
