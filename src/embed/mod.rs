//! Embedded static resources.
//!
//! The default theme ships inside the binary; a `build.theme_dir` template
//! with the same name takes precedence.

pub mod theme {
    /// Default page layout.
    pub const BASE_HTML: &str = include_str!("base.html");

    /// Look up an embedded template by name.
    pub fn get(name: &str) -> Option<&'static str> {
        match name {
            "base.html" => Some(BASE_HTML),
            _ => None,
        }
    }
}
