//! Reporting client module
//!
//! This module contains the SentryMp handle and its extra-key constants.

mod sentry_mp;
pub use sentry_mp::{
    SentryMp, ERROR_CONTEXT_EXTRA, ORIGINAL_ERROR_EXTRA, UNHANDLED_REJECTION_EXTRA,
    UNHANDLED_REJECTION_MESSAGE,
};
