pub mod expected;
pub mod report;

pub use expected::ExpectedFields;
pub use report::{VerificationReport, VerifyStatus};
