//! Greenbank: a terminal form that computes a vehicle-usage borrowing rate.
//!
//! The crate is split into a small widget toolkit (text input, drop-down
//! list, button, labelled field wrapper), a form controller that owns focus
//! and validation, and the rate tables the controller queries.

pub mod app;
pub mod button;
pub mod config;
pub mod controller;
pub mod dropdown;
pub mod error;
pub mod event;
pub mod rates;
pub mod render;
pub mod selector;
pub mod terminal;
pub mod text_input;
mod text_utils;
pub mod types;
pub mod validate;
pub mod widget;

pub use app::App;
pub use config::Config;
pub use controller::{Controller, Outcome, View};
pub use error::{AppError, Result};
pub use rates::{RateCalculator, RateTables, VehicleProfile};
pub use widget::{PointerStyle, Widget};
