//! Verification tools for generated settings.
//!
//! # Key Components
//!
//! - [`oracle`]: pure checks returning pass/fail verdicts
//! - [`fixtures`]: canonical requests and the style/profile/shape matrix
//! - [`report`]: plain-text summaries of a generated setting

pub mod fixtures;
pub mod oracle;
pub mod report;

pub use fixtures::HarnessError;
pub use oracle::OracleVerdict;
pub use report::SettingReport;
