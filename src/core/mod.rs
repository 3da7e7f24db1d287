//! Core types: component contract, autocomplete navigation, keys, events,
//! suggestion data, and the rendering surface.

pub mod autocomplete;
pub mod component;
pub mod input_event;
pub mod keys;
pub mod model;
pub mod surface;
pub mod text;
