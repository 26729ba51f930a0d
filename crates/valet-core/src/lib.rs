//! Core types and utilities for the valet booking service.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - **Identifiers**: Strongly-typed IDs for valets, rotas, and bookings
//! - **Clock types**: Minute-of-day slot times, weekdays, and strict calendar dates
//! - **Error types**: Parse errors shared across crates
//!
//! # Example
//!
//! ```
//! use valet_core::{parse_date, SlotTime, ValetId, Weekday};
//!
//! let valet_id = ValetId::generate();
//! let date = parse_date("2024-06-03").unwrap();
//! assert_eq!(Weekday::of(date), Weekday::Monday);
//!
//! let nine = SlotTime::parse("09:00").unwrap();
//! assert_eq!(nine.minutes(), 540);
//! # let _ = valet_id;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod time;

pub use error::{IdError, TimeError};
pub use ids::{BookingId, RotaId, ValetId};
pub use time::{format_date, parse_date, SlotTime, Weekday};
