pub mod sidebar;
pub mod state;
pub mod theme;
