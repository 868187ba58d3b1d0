//! HTML rendering of the study session
//!
//! Everything typed by the user or returned by the model is untrusted. Plain
//! text goes through [`escape`]; answers are rendered as Markdown with raw HTML
//! turned back into text and links restricted to safe schemes.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use std::fmt::Write;

use crate::session::Session;
use crate::types::settings::{Bounds, CHUNK_SIZE_BOUNDS, TEMPERATURE_BOUNDS, TOP_K_BOUNDS};
use crate::types::{Message, Role, SourcePreview};

/// Banner severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "notice success",
            Self::Info => "notice info",
            Self::Warning => "notice warning",
            Self::Error => "notice error",
        }
    }
}

/// A status or error banner shown above the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

const TIPS: [&str; 4] = [
    "Upload multiple PDFs for comprehensive coverage",
    "Ask specific questions about topics",
    "Request explanations, summaries, or examples",
    "Use follow-up questions for deeper understanding",
];

const EXAMPLE_QUESTIONS: [&str; 8] = [
    "Explain the concept of [topic]",
    "What are the key points about [subject]?",
    "Summarize chapter [X]",
    "Give me examples of [concept]",
    "What's the difference between [A] and [B]?",
    "How does [process] work?",
    "List the main topics in [chapter]",
    "Quiz me on [subject]",
];

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:320px;padding:1rem;background:#f4f4f8;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
.notice{padding:.6rem 1rem;border-radius:6px;margin:.5rem 0}\
.success{background:#e3f6e8}.info{background:#e6f0fb}.warning{background:#fff4d6}.error{background:#fde4e4}\
.message{padding:.8rem 1rem;border-radius:8px;margin:.6rem 0}\
.user{background:#eef2ff}.assistant{background:#f6f6f6}\
pre.source{white-space:pre-wrap}\
footer{color:gray;text-align:center;margin-top:2rem}";

/// HTML-escape plain text for use in element bodies
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    out
}

/// Render an answer as Markdown. Raw HTML in the answer is shown as text;
/// links and images with an unsafe destination keep only their text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // One entry per open link or image: whether its tags were dropped
    let mut dropped: Vec<bool> = Vec::new();

    let events = Parser::new_ext(markdown, options).filter_map(move |event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::Start(tag) => {
            let safe = destination(&tag).map(is_safe_url);
            match safe {
                Some(false) => {
                    dropped.push(true);
                    None
                }
                Some(true) => {
                    dropped.push(false);
                    Some(Event::Start(tag))
                }
                None => Some(Event::Start(tag)),
            }
        }
        Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
            if dropped.pop().unwrap_or(false) {
                None
            } else {
                Some(Event::End(end))
            }
        }
        other => Some(other),
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn destination<'a>(tag: &'a Tag<'_>) -> Option<&'a str> {
    match tag {
        Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => Some(&**dest_url),
        _ => None,
    }
}

/// Relative URLs and http, https and mailto links
fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if url[i..].starts_with(':') => {
            matches!(url[..i].to_ascii_lowercase().as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// Render the whole page for the current session state
pub fn render_page(session: &Session, notices: &[Notice]) -> String {
    let mut page = String::with_capacity(8 * 1024);

    let _ = write!(
        page,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>AI Study Partner</title><style>{}</style></head><body>",
        STYLE
    );

    render_sidebar(&mut page, session);

    page.push_str("<main><h1>AI Study Partner</h1>");
    page.push_str("<p>Upload your syllabus and chat with an AI that knows your study materials.</p>");

    for notice in notices {
        render_notice(&mut page, notice);
    }

    for message in session.conversation() {
        render_message(&mut page, message);
    }

    if session.can_chat() {
        page.push_str(
            "<form method=\"post\" action=\"/ask\">\
             <input type=\"text\" name=\"question\" placeholder=\"Ask a question about your syllabus...\" \
             size=\"60\" autofocus required> <button type=\"submit\">Ask</button></form>",
        );
    } else {
        for hint in hints(session) {
            render_notice(&mut page, &hint);
        }
        page.push_str("<h3>Example Questions You Can Ask:</h3><ul>");
        for question in EXAMPLE_QUESTIONS {
            let _ = write!(page, "<li>{}</li>", escape(question));
        }
        page.push_str("</ul>");
    }

    page.push_str(
        "<footer>Built with Rust and Groq AI | Your personal AI study companion</footer>\
         </main></body></html>",
    );
    page
}

/// Hints shown while chatting is unavailable
pub fn hints(session: &Session) -> Vec<Notice> {
    if !session.has_credential() {
        vec![Notice::warning("Please enter your Groq API key in the sidebar!")]
    } else if !session.has_documents() {
        vec![Notice::info(
            "Please upload PDF files and click 'Process Documents' to start chatting!",
        )]
    } else {
        Vec::new()
    }
}

fn render_notice(page: &mut String, notice: &Notice) {
    let _ = write!(
        page,
        "<div class=\"{}\">{}</div>",
        notice.level.css_class(),
        escape(&notice.text)
    );
}

fn render_sidebar(page: &mut String, session: &Session) {
    page.push_str("<aside><h2>Configuration</h2>");

    let key_status = if session.has_credential() { "API key set" } else { "No API key" };
    let _ = write!(
        page,
        "<form method=\"post\" action=\"/credential\">\
         <label>Enter Groq API Key:<br><input type=\"password\" name=\"api_key\" autocomplete=\"off\"></label> \
         <button type=\"submit\">Save</button></form>\
         <p><small>{}</small> | <a href=\"https://console.groq.com/keys\">Get your Groq API key</a></p>",
        key_status
    );

    page.push_str(
        "<h2>Upload Syllabus PDFs</h2>\
         <form method=\"post\" action=\"/process\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"files\" accept=\".pdf,.txt,.md\" multiple><br>\
         <button type=\"submit\">Process Documents</button></form>",
    );

    let files = session.processed_files();
    if !files.is_empty() {
        let _ = write!(
            page,
            "<div class=\"notice success\">{} file(s) processed</div>\
             <details><summary>View processed files</summary><ul>",
            files.len()
        );
        for file in files {
            let _ = write!(page, "<li>{}</li>", escape(file));
        }
        page.push_str("</ul></details>");
    }

    let settings = session.settings();
    page.push_str("<h2>Settings</h2><form method=\"post\" action=\"/settings\">");
    render_slider(page, "Response Creativity", "temperature", TEMPERATURE_BOUNDS, settings.temperature);
    render_slider(page, "Chunk Size", "chunk_size", CHUNK_SIZE_BOUNDS, settings.chunk_size);
    render_slider(page, "Relevant Chunks", "top_k", TOP_K_BOUNDS, settings.top_k);
    page.push_str("<button type=\"submit\">Apply</button></form>");

    page.push_str(
        "<form method=\"post\" action=\"/reset\"><button type=\"submit\">Clear Chat History</button></form>",
    );

    page.push_str("<h2>Tips</h2><ul>");
    for tip in TIPS {
        let _ = write!(page, "<li>{}</li>", tip);
    }
    page.push_str("</ul></aside>");
}

fn render_slider<T: std::fmt::Display>(page: &mut String, label: &str, name: &str, bounds: Bounds<T>, value: T) {
    let _ = write!(
        page,
        "<label>{label}: <output>{value}</output><br>\
         <input type=\"range\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" \
         oninput=\"this.previousElementSibling.previousElementSibling.value=this.value\"></label><br>",
        label = label,
        name = name,
        min = bounds.min,
        max = bounds.max,
        step = bounds.step,
        value = value
    );
}

fn render_message(page: &mut String, message: &Message) {
    match message.role {
        Role::User => {
            let _ = write!(
                page,
                "<div class=\"message user\"><strong>You:</strong><div>{}</div></div>",
                escape(&message.content)
            );
        }
        Role::Assistant => {
            let _ = write!(
                page,
                "<div class=\"message assistant\"><strong>AI Study Partner:</strong><div>{}</div>",
                render_markdown(&message.content)
            );
            render_sources(page, &SourcePreview::from_fragments(&message.sources));
            page.push_str("</div>");
        }
    }
}

fn render_sources(page: &mut String, sources: &[SourcePreview]) {
    if sources.is_empty() {
        return;
    }

    page.push_str("<details><summary>View Sources</summary>");
    for source in sources {
        let _ = write!(
            page,
            "<p><strong>Source {}:</strong> {}</p><pre class=\"source\">{}</pre><hr>",
            source.index,
            escape(&source.filename),
            escape(&source.preview)
        );
    }
    page.push_str("</details>");
}
