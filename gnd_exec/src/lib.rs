//! # Ground executable library
//!
//! Operator dashboard displays for the rover basestation. Each display is a module implementing
//! `util::module::State`, taking decoded telemetry in and producing a render model out.

pub mod data_store;
pub mod disp_style;
pub mod map_disp;
pub mod orient_disp;
pub mod params;
