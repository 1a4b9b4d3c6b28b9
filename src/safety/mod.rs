//! What may ever be touched, and the last check before it is.

pub mod policy;
pub mod rules;
pub mod temp_roots;
pub mod validator;

pub use policy::{PolicyConfig, SafetyPolicy};
pub use rules::{
    age_cutoff, is_allowed_path, is_old_enough, is_within, is_protected_path, is_under_allowlist, normalize_path,
    normalize_root, path_root, retention_days,
};
pub use validator::{is_installer_like, validate, validate_at, SafetyCheck};
