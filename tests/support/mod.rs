//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

/// Digest of `b"hello world"` in the catalog's format.
pub const HELLO_WORLD_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

/// Search page listing one `Dune` epub whose digest is [`HELLO_WORLD_MD5`].
#[must_use]
pub fn search_page_html() -> String {
    format!(
        r#"<html><body><table class="c">
<tr><td>ID</td><td>Author(s)</td><td>Title</td><td>Publisher</td><td>Year</td><td>Pages</td><td>Language</td><td>Size</td><td>Extension</td></tr>
<tr><td>1001</td><td>Frank Herbert</td><td><a href="book/index.php?md5={HELLO_WORLD_MD5}">Dune <i>9780441013593</i></a></td><td>Ace</td><td>1990</td><td>535</td><td>English</td><td>11 b</td><td>epub</td></tr>
<tr><td>1002</td><td>Frank Herbert</td><td><a href="book/index.php?md5=ffffffffffffffffffffffffffffffff">Dune</a></td><td>Ace</td><td>1990</td><td>535</td><td>German</td><td>1 mb</td><td>pdf</td></tr>
</table></body></html>"#
    )
}

/// Search page with only the header row.
pub const EMPTY_SEARCH_PAGE: &str =
    r#"<html><body><table class="c"><tr><td>ID</td></tr></table></body></html>"#;

/// Mirror page whose direct link points at `download_url`.
#[must_use]
pub fn mirror_page_html(download_url: &str) -> String {
    format!(
        r#"<html><body>
<div id="download"><h2><a href="{download_url}">GET</a></h2><ul><li>a</li><li>b</li></ul></div>
<div id="info"><h1>Dune</h1><p>x</p><p>y</p><p>Author(s): Frank Herbert</p></div>
</body></html>"#
    )
}
