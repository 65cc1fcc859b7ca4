use scraper::ElementRef;

/// Text content of an element with whitespace collapsed, approximating the
/// browser's `innerText` closely enough for matching and display.
pub(crate) fn collapsed_text(el: ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
