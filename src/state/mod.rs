//! State module for link classification
//!
//! # Components
//!
//! - `LinkState`: what one fetch said about a link (reachable, rate limited, unreachable)

mod link_state;

pub use link_state::LinkState;
