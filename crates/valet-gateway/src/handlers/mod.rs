//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod availability;
pub mod bookings;
pub mod health;
pub mod settings;
pub mod valets;
