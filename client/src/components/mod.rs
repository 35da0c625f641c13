//! Reusable view components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages compose these for their frame, tables, badges and error panels so
//! every screen shares the same structure and class names.

pub mod error_panel;
pub mod page_frame;
