use scraper::{Html, Selector};

/// Text content of the first `<pre>` element, if the document has one.
pub fn extract_summary(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let pre = Selector::parse("pre").ok()?;
    doc.select(&pre)
        .next()
        .map(|node| node.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::extract_summary;

    #[test]
    fn takes_first_pre_block_verbatim() {
        let html = "<html><body><h1>Done</h1><pre>\nOverall Summary:\nTotal papers found: 2</pre><pre>second</pre></body></html>";
        // The parser drops a single newline right after `<pre>`.
        assert_eq!(
            extract_summary(html).as_deref(),
            Some("Overall Summary:\nTotal papers found: 2")
        );
    }

    #[test]
    fn nested_markup_contributes_its_text() {
        let html = "<pre>Total <b>papers</b> found: 1</pre>";
        assert_eq!(
            extract_summary(html).as_deref(),
            Some("Total papers found: 1")
        );
    }

    #[test]
    fn document_without_pre_has_no_summary() {
        assert_eq!(extract_summary("<html><body><p>x</p></body></html>"), None);
    }
}
