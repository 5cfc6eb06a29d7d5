//! Markup front-end: turns source text into a flat stream of tag, text and
//! comment tokens.
//!
//! Markdown is rendered to HTML with pulldown-cmark first. HTML (including the
//! output of rst and AsciiDoc converters) is run through the html5ever
//! tokenizer without a tree builder, so the stream holds exactly the tags that
//! appear in the source. Elements left open at the end of input get no end token.

use crate::config::SourceFormat;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token as HtmlToken, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use pulldown_cmark::{Options, Parser, html};
use std::borrow::Cow;
use std::cell::RefCell;

/// One event of the markup stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An opening tag with its attributes in source order
    Start { name: String, attrs: Vec<(String, String)> },
    /// A closing tag
    End { name: String },
    /// Character data, entities already decoded
    Text(String),
    /// A comment body, without delimiters
    Comment(String),
    /// The stream cannot continue; nothing after this token is read
    Error(String),
}

impl Token {
    pub fn start(name: &str, attrs: &[(&str, &str)]) -> Self {
        Token::Start {
            name: name.to_string(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn end(name: &str) -> Self {
        Token::End { name: name.to_string() }
    }

    pub fn text(text: &str) -> Self {
        Token::Text(text.to_string())
    }

    /// Attribute value of a start token
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } => attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// Render Markdown to HTML with the extensions prose documents commonly use
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// HTML for a source document of the given format
pub fn to_html(format: SourceFormat, source: &str) -> Cow<'_, str> {
    match format {
        SourceFormat::Markdown => Cow::Owned(render_markdown(source)),
        SourceFormat::Html | SourceFormat::ReStructuredText | SourceFormat::AsciiDoc => Cow::Borrowed(source),
    }
}

/// Collects tokenizer output into [`Token`]s
struct Collector<'a> {
    tokens: &'a RefCell<Vec<Token>>,
}

impl TokenSink for Collector<'_> {
    type Handle = ();

    fn process_token(&self, token: HtmlToken, _line_number: u64) -> TokenSinkResult<()> {
        let mut tokens = self.tokens.borrow_mut();
        match token {
            HtmlToken::TagToken(tag) => {
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let raw = raw_text_kind(&name);
                        tokens.push(Token::Start {
                            name,
                            attrs: tag
                                .attrs
                                .iter()
                                .map(|attr| (attr.name.local.to_string(), String::from(&*attr.value)))
                                .collect(),
                        });
                        // The tokenizer has no tree builder to tell it about raw text elements
                        if !tag.self_closing
                            && let Some(kind) = raw
                        {
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                    TagKind::EndTag => tokens.push(Token::End { name }),
                }
            }
            HtmlToken::CharacterTokens(text) => match tokens.last_mut() {
                Some(Token::Text(last)) => last.push_str(&text),
                _ => tokens.push(Token::Text(String::from(&*text))),
            },
            HtmlToken::CommentToken(text) => tokens.push(Token::Comment(String::from(&*text))),
            HtmlToken::ParseError(error) => log::debug!("Recovered from markup error: {error}"),
            HtmlToken::NullCharacterToken | HtmlToken::DoctypeToken(_) | HtmlToken::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Elements whose content is character data up to the matching end tag
fn raw_text_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => Some(RawKind::Rawtext),
        "textarea" | "title" => Some(RawKind::Rcdata),
        _ => None,
    }
}

/// Tokenize an HTML fragment
pub fn tokenize_html(markup: &str) -> Vec<Token> {
    let tokens = RefCell::new(Vec::new());
    let tokenizer = Tokenizer::new(Collector { tokens: &tokens }, TokenizerOpts::default());

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));
    let _ = tokenizer.feed(&input);
    tokenizer.end();
    drop(tokenizer);

    tokens.into_inner()
}

/// Tokenize a source document of the given format
pub fn tokenize(format: SourceFormat, source: &str) -> Vec<Token> {
    tokenize_html(&to_html(format, source))
}
