use crate::services::host::Host;

/// Body markup for a dialog: raw HTML, or an element whose outer HTML is used verbatim
#[derive(Debug, Clone, PartialEq)]
pub enum Content<N> {
    Html(String),
    Node(N),
}

impl<N> Content<N> {
    /// Resolve to the markup string injected into the content region
    pub fn to_html<H>(&self, host: &H) -> String
    where
        H: Host<Node = N>,
    {
        match self {
            Content::Html(html) => html.clone(),
            Content::Node(node) => host.outer_html(node),
        }
    }
}

impl<N> From<&str> for Content<N> {
    fn from(html: &str) -> Self {
        Content::Html(html.to_string())
    }
}

impl<N> From<String> for Content<N> {
    fn from(html: String) -> Self {
        Content::Html(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::headless::HeadlessHost;

    #[test]
    fn test_node_content_uses_outer_html() {
        let host = HeadlessHost::new();
        let node = host.create_element("p").unwrap();
        host.set_inner_html(&node, "Hi");

        let content = Content::Node(node);
        assert_eq!(content.to_html(&host), "<p>Hi</p>");

        let content: Content<_> = "<p>Hi</p>".into();
        assert_eq!(content.to_html(&host), "<p>Hi</p>");
    }
}
