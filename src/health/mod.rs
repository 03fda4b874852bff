//! Experiment health checks.
//!
//! These run on assignment counts rather than metric values and flag
//! problems with randomisation or logging that invalidate every metric.

mod srm;

pub use srm::{srm_check, srm_check_with_alpha};
