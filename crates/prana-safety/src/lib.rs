//! Keyword-based health-risk screening for wellness questions.
//!
//! [`SafetyClassifier::classify`] is a total function: it lower-cases the
//! query, reports every matched phrase and category, and picks one message
//! by [`SafetyCategory::PRIORITY`] so a user sees a single warning while the
//! full match set stays available for audit.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

mod alternatives;
mod category;
mod classifier;
mod message;

pub use alternatives::safe_alternatives;
pub use category::SafetyCategory;
pub use classifier::{SafetyClassifier, SafetyVerdict, compose_safe_response};
pub use message::SafetyMessage;
