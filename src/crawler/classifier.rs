//! Status classification
//!
//! Maps the outcome of a fetch onto a [`LinkState`].
//!
//! | Outcome | State |
//! |---------|-------|
//! | 200, 201, 202 | Reachable |
//! | 429 | RateLimited |
//! | any other status (3xx, 4xx, 5xx, 0) | Unreachable |
//! | transport error | Unreachable |

use crate::crawler::fetcher::{FetchError, HeadResponse};
use crate::state::LinkState;

const REACHABLE_STATUSES: [u16; 3] = [200, 201, 202];
const TOO_MANY_REQUESTS: u16 = 429;

/// Classifies a HEAD outcome
pub fn classify(outcome: &Result<HeadResponse, FetchError>) -> LinkState {
    match outcome {
        Ok(head) => classify_status(head.status),
        Err(_) => LinkState::Unreachable,
    }
}

/// Classifies a bare status code
pub fn classify_status(status: u16) -> LinkState {
    if REACHABLE_STATUSES.contains(&status) {
        LinkState::Reachable
    } else if status == TOO_MANY_REQUESTS {
        LinkState::RateLimited
    } else {
        LinkState::Unreachable
    }
}
