//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click event model and queue wire format
//! - [`click_worker`] - Click queue consumer loop
//!
//! # Click Processing Flow
//!
//! 1. The resolver builds a [`click_event::ClickEvent`] for every successful redirect
//! 2. [`crate::infrastructure::queue::ClickPublisher`] enqueues it on a detached task
//! 3. [`click_worker::run_click_worker`] receives it, possibly in another process
//! 4. The event is stored via [`repositories::ClickEventRepository`] and acknowledged

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
