//! Auto-filtering of dependency rows that carry no audit value (spec
//! §4.3, resolving Open Question 1).
//!
//! Grounded in `examples/original_source/lib/deprules.c::gather_deprules_by_type`,
//! which skips a row when the name:
//! - is exactly `debuginfo(build-id)`,
//! - has `-debuginfo`/`-debugsource` as a **suffix**, *or* **contains**
//!   either as a substring (both checks, not suffix alone),
//! - or matches `rpmlib(...)`/`rtld(...)` (prefix `rpmlib(`/`rtld(` and
//!   suffix `)`).

const DEBUGINFO_SUFFIX: &str = "-debuginfo";
const DEBUGSOURCE_SUFFIX: &str = "-debugsource";

pub fn is_noise_dependency(name: &str) -> bool {
    if name == "debuginfo(build-id)" {
        return true;
    }
    if name.ends_with(DEBUGINFO_SUFFIX) || name.contains(DEBUGINFO_SUFFIX) {
        return true;
    }
    if name.ends_with(DEBUGSOURCE_SUFFIX) || name.contains(DEBUGSOURCE_SUFFIX) {
        return true;
    }
    if (name.starts_with("rpmlib(") || name.starts_with("rtld(")) && name.ends_with(')') {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_literal_build_id() {
        assert!(is_noise_dependency("debuginfo(build-id)"));
    }

    #[test]
    fn filters_debuginfo_suffix() {
        assert!(is_noise_dependency("foo-debuginfo"));
    }

    #[test]
    fn filters_debuginfo_substring_not_just_suffix() {
        assert!(is_noise_dependency("foo-debuginfo(x86-64)"));
    }

    #[test]
    fn filters_debugsource_suffix_and_substring() {
        assert!(is_noise_dependency("foo-debugsource"));
        assert!(is_noise_dependency("foo-debugsource(x86-64)"));
    }

    #[test]
    fn filters_rpmlib_and_rtld() {
        assert!(is_noise_dependency("rpmlib(CompressedFileNames)"));
        assert!(is_noise_dependency("rtld(GNU_HASH)"));
    }

    #[test]
    fn does_not_filter_ordinary_dependency() {
        assert!(!is_noise_dependency("libfoo.so.0()(64bit)"));
        assert!(!is_noise_dependency("bash"));
    }

    #[test]
    fn does_not_filter_rpmlib_without_closing_paren() {
        assert!(!is_noise_dependency("rpmlib(broken"));
    }
}
