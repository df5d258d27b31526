//! Two-attempt state machine behind a comparison.
//!
//! GitHub's compare endpoint is directional and two tag names do not say
//! which one is older. The first request uses the order given; if it comes
//! back with no commits and no files, the reverse order is tried once.

use super::normalize::Resolved;
use super::types::Direction;
use crate::github::types::ComparePayload;

/// Final answer of a directional comparison.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub payload: ComparePayload,
    pub resolved: Resolved,
}

#[derive(Debug, Clone)]
pub enum DirectionalCompare {
    /// Nothing requested yet
    Initial { base: String, head: String },
    /// The forward request was empty; the reverse one is pending
    Swapped { base: String, head: String },
    Done(Outcome),
}

impl DirectionalCompare {
    pub fn new(base: impl Into<String>, head: impl Into<String>) -> Self {
        DirectionalCompare::Initial {
            base: base.into(),
            head: head.into(),
        }
    }

    /// The `(base, head)` pair to request next, or `None` once done.
    pub fn next_request(&self) -> Option<(&str, &str)> {
        match self {
            DirectionalCompare::Initial { base, head } => Some((base.as_str(), head.as_str())),
            DirectionalCompare::Swapped { base, head } => Some((head.as_str(), base.as_str())),
            DirectionalCompare::Done(_) => None,
        }
    }

    /// Feed the payload returned for `next_request()`.
    pub fn advance(self, payload: ComparePayload) -> Self {
        match self {
            DirectionalCompare::Initial { base, head } if payload.is_empty() => {
                DirectionalCompare::Swapped { base, head }
            }
            DirectionalCompare::Initial { base, head } => DirectionalCompare::Done(Outcome {
                payload,
                resolved: Resolved {
                    from_version: base,
                    to_version: head,
                    direction: Direction::AsRequested,
                },
            }),
            DirectionalCompare::Swapped { base, head } => {
                let direction = if payload.is_empty() {
                    Direction::NoDifferences
                } else {
                    Direction::Swapped
                };
                DirectionalCompare::Done(Outcome {
                    payload,
                    resolved: Resolved {
                        from_version: head,
                        to_version: base,
                        direction,
                    },
                })
            }
            done @ DirectionalCompare::Done(_) => done,
        }
    }

    pub fn outcome(self) -> Option<Outcome> {
        match self {
            DirectionalCompare::Done(outcome) => Some(outcome),
            _ => None,
        }
    }
}
