//! HTML views
//!
//! Message bodies and source chunks are CommonMark; raw HTML inside them is
//! shown as text. Everything else is escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};
use lymegpt_agent::SourceChunk;
use lymegpt_core::config::UiConfig;
use lymegpt_core::session::ChatMessage;
use pulldown_cmark::{html, Event, Options, Parser};

const STYLE: &str = r#"
body {
    font-family: Menlo, ui-monospace, SFMono-Regular, Monaco, Consolas,
        "Liberation Mono", "Courier New", monospace;
    font-weight: 100;
    font-size: 14px;
    line-height: 20px;
    color: rgb(255, 255, 255);
    background-color: black;
    max-width: 760px;
    margin: 0 auto;
    padding: 24px;
}
* { font-family: inherit; font-weight: 100; border-radius: 0 !important; }
h1 { font-size: 36px; line-height: 40px; }
.chat-message { border: 1px solid #333; padding: 8px 12px; margin: 12px 0; }
.chat-message .role { color: #888; font-size: 12px; text-transform: uppercase; }
details.source { border: 1px solid #333; margin: 6px 0; padding: 4px 8px; }
details.source summary { cursor: pointer; }
a:hover, details.source summary:hover, details.source div:hover { color: rgb(84, 232, 179); }
.error { border: 1px solid #b33; color: #f88; padding: 8px 12px; margin: 12px 0; }
form.chat-input { display: flex; gap: 8px; margin-top: 16px; }
input, button { background: black; color: white; border: 1px solid #555; padding: 8px; }
form.chat-input input { flex: 1; }
form.login label { display: block; margin-top: 12px; }
form.reset { margin-top: 24px; }
"#;

/// What to show under the transcript for the turn that produced this page
#[derive(Debug, Clone, Copy)]
pub enum TurnNotice<'a> {
    /// The new answer's sources
    Sources(&'a [SourceChunk]),
    /// The turn failed
    Failure(&'a str),
}

/// Render CommonMark to HTML with raw HTML neutralised
pub fn markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// One block per message, in order, labelled by role
pub fn render_history(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let role = message.role.as_str();
        out.push_str(&format!(
            "<div class=\"chat-message {role}\"><div class=\"role\">{role}</div>\
             <div class=\"content\">{}</div></div>\n",
            markdown(&message.content)
        ));
    }
    out
}

/// The Sources section of one answer. The header is always present.
pub fn render_sources(sources: &[SourceChunk]) -> String {
    let mut out = String::from("<div class=\"sources\"><h3>Sources:</h3>\n");
    for chunk in sources {
        out.push_str(&format!(
            "<details class=\"source\"><summary>{}</summary><div>{}</div></details>\n",
            encode_text(&chunk.title()),
            markdown(&chunk.text)
        ));
    }
    out.push_str("</div>\n");
    out
}

fn page(ui: &UiConfig, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = encode_text(&ui.title),
    )
}

/// Login view, optionally with an inline error
pub fn login_page(ui: &UiConfig, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(error) = error {
        body.push_str(&format!("<div class=\"error\">{}</div>\n", encode_text(error)));
    }
    body.push_str(
        "<form class=\"login\" method=\"post\" action=\"/login\">\n\
         <label>Username <input name=\"username\" autocomplete=\"username\"></label>\n\
         <label>Password <input name=\"password\" type=\"password\" \
         autocomplete=\"current-password\"></label>\n\
         <p><button type=\"submit\">Login</button></p>\n</form>\n",
    );
    page(ui, &body)
}

/// Chat view: transcript, the latest turn's notice, and the input box
pub fn chat_page(
    ui: &UiConfig,
    messages: &[ChatMessage],
    notice: Option<TurnNotice<'_>>,
) -> String {
    let mut body = render_history(messages);
    match notice {
        Some(TurnNotice::Sources(sources)) => body.push_str(&render_sources(sources)),
        Some(TurnNotice::Failure(message)) => body.push_str(&format!(
            "<div class=\"error\">Could not get an answer: {}</div>\n",
            encode_text(message)
        )),
        None => {}
    }
    body.push_str(&format!(
        "<form class=\"chat-input\" method=\"post\" action=\"/chat\">\n\
         <input name=\"question\" placeholder=\"{}\" autofocus autocomplete=\"off\">\n\
         <button type=\"submit\">Send</button>\n</form>\n\
         <form class=\"reset\" method=\"post\" action=\"/reset\">\
         <button type=\"submit\">Reset session</button></form>\n",
        encode_double_quoted_attribute(&ui.input_placeholder)
    ));
    page(ui, &body)
}
