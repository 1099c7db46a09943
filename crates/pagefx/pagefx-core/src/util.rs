//! Small helpers shared by the pipeline and the event dispatch.

use crate::host::Dom;

/// Walk from `el` up through its ancestors and return the first element carrying
/// the attribute `marker`, `el` itself included.
pub fn closest<D: Dom>(dom: &D, el: &D::Element, marker: &str) -> Option<D::Element> {
    closest_by(dom, el, |dom, candidate| dom.has_attribute(candidate, marker))
}

/// Same walk as [`closest`] with an arbitrary predicate.
pub fn closest_by<D, F>(dom: &D, el: &D::Element, mut predicate: F) -> Option<D::Element>
where
    D: Dom,
    F: FnMut(&D, &D::Element) -> bool,
{
    let mut current = Some(el.clone());
    while let Some(candidate) = current {
        if predicate(dom, &candidate) {
            return Some(candidate);
        }
        current = dom.parent(&candidate);
    }
    None
}

/// Normalize a computed `content` value into a bare breakpoint name.
///
/// Drops leading quotes, every whitespace character, every backslash, runs of `;}`
/// (optionally `; }`), and a single quote at the very end.
pub fn unquote(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() && is_quote(chars[i]) {
        i += 1;
    }

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == '\\' {
            i += 1;
            continue;
        }
        if c == ';' {
            let run = semicolon_brace_run(&chars[i..]);
            if run > 0 {
                i += run;
                continue;
            }
        }
        if is_quote(c) && i + 1 == chars.len() {
            break;
        }
        out.push(c);
        i += 1;
    }
    out
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Length of a `(;\s?})+` match at the start of `chars`, 0 when there is none.
fn semicolon_brace_run(chars: &[char]) -> usize {
    let mut len = 0;
    loop {
        let rest = &chars[len..];
        match rest {
            [';', '}', ..] => len += 2,
            [';', ws, '}', ..] if ws.is_whitespace() => len += 3,
            _ => return len,
        }
    }
}

/// Split off the fragment of `href` when it points into the document at `location`.
///
/// Returns `None` for links to other documents and for bare `#` links.
pub fn same_document_fragment<'a>(href: &'a str, location: &str) -> Option<&'a str> {
    let (target, fragment) = href.split_once('#')?;
    let current = location.split_once('#').map_or(location, |(doc, _)| doc);
    if target != current || fragment.is_empty() {
        return None;
    }
    Some(fragment)
}

/// Coalesces bursts of events into one callback per animation frame.
///
/// The host requests a frame for every event and hands the frame handle to
/// [`FrameDebounce::schedule`]; whatever handle comes back must be cancelled. When a
/// frame callback runs it calls [`FrameDebounce::fire`] first.
#[derive(Debug)]
pub struct FrameDebounce<H> {
    pending: Option<H>,
}

impl<H> FrameDebounce<H> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Record a freshly requested frame; returns the superseded one.
    pub fn schedule(&mut self, handle: H) -> Option<H> {
        self.pending.replace(handle)
    }

    /// Consume the pending frame. `false` means nothing was scheduled.
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending frame without running it; the handle must be cancelled.
    pub fn cancel(&mut self) -> Option<H> {
        self.pending.take()
    }
}

impl<H> Default for FrameDebounce<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_strips_css_string_quotes() {
        assert_eq!(unquote("\"small\""), "small");
        assert_eq!(unquote("'medium'"), "medium");
        assert_eq!(unquote("large"), "large");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn unquote_drops_escapes_whitespace_and_brace_runs() {
        assert_eq!(unquote("sm\\all"), "small");
        assert_eq!(unquote("\"sm all\""), "small");
        assert_eq!(unquote("small;}"), "small");
        assert_eq!(unquote("small; };}"), "small");
        assert_eq!(unquote("a;b"), "a;b");
    }

    #[test]
    fn unquote_only_trims_a_quote_at_the_very_end() {
        // the closing quote is followed by whitespace, so it is not at the end of input
        assert_eq!(unquote("\"small\" "), "small\"");
        assert_eq!(unquote("sm\"all"), "sm\"all");
    }

    #[test]
    fn fragment_of_same_document() {
        let here = "https://example.test/about";
        assert_eq!(
            same_document_fragment("https://example.test/about#team", here),
            Some("team")
        );
        assert_eq!(
            same_document_fragment("https://example.test/about#team", "https://example.test/about#intro"),
            Some("team")
        );
        assert_eq!(same_document_fragment("https://example.test/other#team", here), None);
        assert_eq!(same_document_fragment("https://example.test/about#", here), None);
        assert_eq!(same_document_fragment("https://example.test/about", here), None);
    }

    #[test]
    fn debounce_coalesces_to_latest_frame() {
        let mut d = FrameDebounce::new();
        assert_eq!(d.schedule(1), None);
        assert_eq!(d.schedule(2), Some(1));
        assert_eq!(d.schedule(3), Some(2));
        assert!(d.is_pending());
        assert!(d.fire());
        assert!(!d.fire());
        assert!(!d.is_pending());
    }

    #[test]
    fn cancel_hands_back_pending_frame() {
        let mut d = FrameDebounce::new();
        assert_eq!(d.cancel(), None);
        d.schedule(7);
        assert_eq!(d.cancel(), Some(7));
        assert!(!d.fire());
    }
}
