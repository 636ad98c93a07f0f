//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod diff;
pub mod images;
pub mod patch;
pub mod subtest;
pub mod version;

// Re-export handlers for convenient access
pub use diff::{execute_diff, load_baseline, render_mismatches};
pub use images::{execute_check_images, image_fields};
pub use patch::execute_patch;
pub use subtest::{
    build_subtest_config, default_work_dir, detection_interpreter, execute_subtest,
};
pub use version::{execute_version_id, resolve_version_id};
