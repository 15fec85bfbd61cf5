//! Helpers forwarded to the host's [`ViewContext`](crate::runtime::view::ViewContext).
//!
//! Only names listed here (or registered explicitly by the host) ever reach the
//! view; the sandbox never forwards an arbitrary name.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HelperSpec {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub summary: &'static str,
}

pub static STANDARD_HELPERS: &[HelperSpec] = &[
    HelperSpec {
        name: "t",
        params: &["key"],
        summary: "Looks up a translation.",
    },
    HelperSpec {
        name: "asset_path",
        params: &["path"],
        summary: "URL of a static asset.",
    },
    HelperSpec {
        name: "image_path",
        params: &["path"],
        summary: "URL of an image asset.",
    },
];
