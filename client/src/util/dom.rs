//! DOM lookups that sit outside the Leptos view tree.
//!
//! Views bind their own handlers; what remains here is the content container
//! id the router mounts into and the `<meta>` configuration reader. Outside
//! the browser the reader returns `None`.

/// Id of the router's content container.
pub const CONTENT_ID: &str = "app-content";

/// `content` of `<meta name="...">`, ignoring blank values.
pub fn meta_content(name: &str) -> Option<String> {
    #[cfg(feature = "csr")]
    {
        let selector = format!(r#"meta[name="{name}"]"#);
        let el = web_sys::window()?.document()?.query_selector(&selector).ok()??;
        el.get_attribute("content").filter(|v| !v.trim().is_empty())
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = name;
        None
    }
}
