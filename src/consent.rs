//! Consent gate and privacy policy document
//!
//! Every form carries a privacy-policy checkbox that must be ticked before a
//! submission is allowed. [`ConsentState`] tracks the box and whether its
//! error is on screen. [`PolicyDocument`] is the read-only text shown in the
//! policy modal, built from catalog sections whose lines may embed
//! `<1>…</1>` style markup for emphasis and the contact mail link.

use serde::Deserialize;

use crate::i18n::Translator;

/// Link target for the contact address mentioned in the policy.
pub const CONTACT_MAILTO: &str = "mailto:info@2bitesco.com";

/// Policy checkbox state of one form instance.
///
/// `show_error` only becomes true through [`ConsentState::require`] (a
/// submit attempt) and is cleared as soon as the box is ticked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentState {
    accepted: bool,
    show_error: bool,
}

impl ConsentState {
    /// Whether the policy is accepted.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Whether the consent error is displayed.
    pub fn show_error(&self) -> bool {
        self.show_error
    }

    /// Tick or untick the box.
    pub fn set(&mut self, accepted: bool) {
        self.accepted = accepted;
        if accepted {
            self.show_error = false;
        }
    }

    /// Gate check on submit: flags the error when not accepted.
    ///
    /// ```
    /// use bites_forms::consent::ConsentState;
    ///
    /// let mut consent = ConsentState::default();
    /// assert!(!consent.require());
    /// assert!(consent.show_error());
    ///
    /// consent.set(true);
    /// assert!(!consent.show_error());
    /// assert!(consent.require());
    /// ```
    pub fn require(&mut self) -> bool {
        self.show_error = !self.accepted;
        self.accepted
    }

    /// Back to unticked with no error.
    pub fn reset(&mut self) {
        *self = ConsentState::default();
    }
}

/// What a numbered markup tag renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Emphasised text
    Strong,
    /// Hyperlink to the given target
    Link(&'static str),
}

/// One run of rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text
    Text(String),
    /// Emphasised text
    Strong(String),
    /// Hyperlink
    Link {
        /// Target URL
        href: String,
        /// Visible text
        text: String,
    },
}

/// Text with inline emphasis and links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText(pub Vec<Segment>);

impl RichText {
    /// Parse `<N>inner</N>` markup, mapping each tag number through
    /// `components`. Tags without a component render their inner text
    /// plainly; anything that is not a well-formed numbered tag is text.
    ///
    /// ```
    /// use bites_forms::consent::{Component, RichText, Segment};
    ///
    /// let rich = RichText::parse(
    ///     "Escríbenos a <2>info@2bitesco.com</2>.",
    ///     &[(1, Component::Strong), (2, Component::Link("mailto:info@2bitesco.com"))],
    /// );
    /// assert_eq!(rich.0[1], Segment::Link {
    ///     href: "mailto:info@2bitesco.com".into(),
    ///     text: "info@2bitesco.com".into(),
    /// });
    /// assert_eq!(rich.plain_text(), "Escríbenos a info@2bitesco.com.");
    /// ```
    pub fn parse(markup: &str, components: &[(u8, Component)]) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = markup;

        while let Some(start) = rest.find('<') {
            text.push_str(&rest[..start]);
            let tail = &rest[start..];

            let Some((index, open_len)) = open_tag(tail) else {
                text.push('<');
                rest = &tail[1..];
                continue;
            };
            let close = format!("</{index}>");
            let body = &tail[open_len..];
            let Some(end) = body.find(&close) else {
                text.push('<');
                rest = &tail[1..];
                continue;
            };

            let inner = &body[..end];
            match components.iter().find(|(i, _)| *i == index) {
                Some((_, component)) => {
                    flush(&mut text, &mut segments);
                    segments.push(match component {
                        Component::Strong => Segment::Strong(inner.to_string()),
                        Component::Link(href) => Segment::Link {
                            href: href.to_string(),
                            text: inner.to_string(),
                        },
                    });
                }
                None => text.push_str(inner),
            }
            rest = &body[end + close.len()..];
        }

        text.push_str(rest);
        flush(&mut text, &mut segments);
        RichText(segments)
    }

    /// Visible text without formatting.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) | Segment::Strong(text) => text.as_str(),
                Segment::Link { text, .. } => text.as_str(),
            })
            .collect()
    }
}

// `<N>` at the start of `s`: tag number and byte length of the tag.
fn open_tag(s: &str) -> Option<(u8, usize)> {
    let body = s.strip_prefix('<')?;
    let end = body.find('>')?;
    let digits = &body[..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, end + 2))
}

fn flush(text: &mut String, segments: &mut Vec<Segment>) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

/// One titled block of the privacy policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySection {
    /// Section heading
    pub title: String,
    /// Optional paragraph; `<1>` is the contact link
    #[serde(default)]
    pub content: Option<String>,
    /// Optional lines; `<1>` is emphasis, `<2>` the contact link
    #[serde(default)]
    pub lines: Vec<String>,
    /// Optional bullet list
    #[serde(default)]
    pub list_items: Vec<String>,
}

impl PolicySection {
    /// The paragraph as rich text.
    pub fn rich_content(&self) -> Option<RichText> {
        self.content
            .as_deref()
            .map(|content| RichText::parse(content, &[(1, Component::Link(CONTACT_MAILTO))]))
    }

    /// The lines as rich text.
    pub fn rich_lines(&self) -> Vec<RichText> {
        self.lines
            .iter()
            .map(|line| {
                RichText::parse(
                    line,
                    &[(1, Component::Strong), (2, Component::Link(CONTACT_MAILTO))],
                )
            })
            .collect()
    }
}

/// The policy modal's content in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    /// Modal title
    pub title: String,
    /// Label of the dismiss button
    pub close_label: String,
    /// Sections in display order
    pub sections: Vec<PolicySection>,
}

impl PolicyDocument {
    /// Build the document from the `policyModal` catalog entry.
    pub fn load(i18n: &Translator) -> Self {
        PolicyDocument {
            title: i18n.text("policyModal.title"),
            close_label: i18n.text("policyModal.closeButton"),
            sections: i18n.lookup("policyModal.sections").unwrap_or_default(),
        }
    }
}
