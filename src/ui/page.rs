//! Page shells.

use crate::assets::StaticAssets;
use crate::documents::UploadedDocumentRecord;
use crate::session::SessionState;

use super::{chat, sidebar};

/// Everything needed to render the chat page for one session.
#[derive(Debug)]
pub struct ChatPage<'a> {
    pub session_id: &'a str,
    pub state: &'a SessionState,
    pub documents: &'a [UploadedDocumentRecord],
    pub assets: &'a StaticAssets,
    /// Notice shown under the transcript.
    pub transcript_notice: Option<&'a str>,
    /// Notice shown above the document cards.
    pub sidebar_notice: Option<&'a str>,
}

/// Generate the HTML shell for the application.
pub fn html_shell(title: &str, styles_html: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Multi-Hop Document Question Answering">
    <title>{title} - MHDQA-GUI</title>

    <script src="/static/vendor/htmx-2.0.8.min.js"></script>
    <link rel="stylesheet" href="/static/app.css">
    <style>
        .block-container {{ max-width: 1200px; }}
        .btn {{ border-radius: 10px; }}
        .chat-input input {{ border-radius: 25px; }}
        .sidebar .block-container {{ border-radius: 10px; }}
        .file-info-box {{
            background-color: black;
            border-radius: 15px;
            padding: 10px;
            margin: 10px 0;
            color: white;
        }}
    </style>
</head>
<body>
    <nav class="top-nav">
        <a href="/">New chat</a>
        <a href="/about">About</a>
    </nav>
    {content}
    {styles_html}
</body>
</html>"#
    )
}

impl ChatPage<'_> {
    /// Render the full page: sidebar, header ribbon, transcript and input.
    #[must_use]
    pub fn render(&self) -> String {
        let content = format!(
            r#"
    <div class="layout">
        {sidebar}
        <main class="block-container">
            {ribbon}
            {transcript}
            {input}
        </main>
    </div>"#,
            sidebar = sidebar::sidebar(self.session_id, self.documents, self.sidebar_notice),
            ribbon = chat::header_ribbon(self.assets.logo.html()),
            transcript = chat::transcript(self.state, self.transcript_notice),
            input = chat::input_area(self.session_id),
        );
        html_shell("Chat", self.assets.styles.html(), &content)
    }
}

/// About page content.
pub fn about_page(assets: &StaticAssets) -> String {
    let content = r##"
    <main class="block-container about">
        <h1>Multi-Hop Document Based Open-Domain Question Answering</h1>
        <blockquote>
            <p>To use the application, upload all your necessary documents and ask a question.</p>
            <p>For the background documentation refer: <a href="#">Confluence Page</a></p>
        </blockquote>
        <a href="/" class="btn btn-primary">Start Chatting</a>
    </main>"##;
    html_shell("About", assets.styles.html(), content)
}
