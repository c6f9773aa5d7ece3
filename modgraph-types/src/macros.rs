/// Compiles a regular expression exactly once and returns a `'static` reference to it.
///
/// Mirrors the once-cell-backed regex cache used throughout this workspace for
/// validating identifier-shaped strings without re-compiling the pattern on
/// every call.
macro_rules! regex_once {
    ($pattern:expr) => {{
        static CELL: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
        CELL.get_or_init(|| regex::Regex::new($pattern).expect("static regex is valid"))
    }};
}

pub(crate) use regex_once;
