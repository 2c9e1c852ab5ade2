//! Header ribbon, transcript and chat input.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::session::SessionState;

/// Header ribbon: logo, assistant title and tagline in three columns.
pub fn header_ribbon(logo_html: &str) -> String {
    format!(
        r#"
    <header class="ribbon">
        <div class="ribbon-logo">{logo_html}</div>
        <div class="ribbon-title">
            <h1 style='font-family:Helvetica; color:#6B96C3;'><b>Ask Me Anything: <br> Credit Risk Assistant</b></h1>
        </div>
        <div class="ribbon-tagline">
            <h2><i>Document Based Question Answering</i></h2>
        </div>
    </header>"#
    )
}

/// Render one chat bubble.
///
/// User messages sit on the right, assistant messages on the left, and data
/// messages are shown as a preformatted block.
pub fn message_func(content: &str, is_user: bool, is_data: bool) -> String {
    if is_data {
        return format!(
            r#"<div class="message message-data"><pre class="data-block">{}</pre></div>"#,
            encode_text(content)
        );
    }

    let body = encode_text(content).replace('\n', "<br>");
    let (side, avatar, label) = if is_user {
        ("message-user", "You", "user")
    } else {
        ("message-assistant", "AI", "assistant")
    };
    format!(
        r#"<div class="message {side}" data-role="{label}">
            <span class="avatar">{avatar}</span>
            <div class="bubble">{body}</div>
        </div>"#
    )
}

/// The transcript section, swapped as a whole after every turn.
pub fn transcript(state: &SessionState, notice: Option<&str>) -> String {
    let messages = state.render_transcript(message_func).concat();
    format!(
        r#"<section id="transcript" class="transcript" aria-live="polite" aria-label="Chat messages">
        {messages}
        {notice}
    </section>"#,
        notice = notice.unwrap_or_default(),
    )
}

/// Question input; posts to the session's message endpoint.
pub fn input_area(session_id: &str) -> String {
    let action = format!("/sessions/{session_id}/messages");
    let action = encode_double_quoted_attribute(&action);
    format!(
        r##"
    <form class="chat-input" method="post" action="{action}"
          hx-post="{action}" hx-target="#transcript" hx-swap="outerHTML"
          hx-on--after-request="this.reset()">
        <input type="text" name="question" placeholder="Your question here..." autocomplete="off" autofocus>
        <button type="submit" class="btn btn-primary">Send</button>
    </form>"##
    )
}
