//! Sidebar: document upload, uploaded document cards and restart.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::documents::{ACCEPTED_EXTENSIONS, UploadedDocumentRecord};

/// Full sidebar.
pub fn sidebar(session_id: &str, records: &[UploadedDocumentRecord], notice: Option<&str>) -> String {
    let base = encode_double_quoted_attribute(&format!("/sessions/{session_id}")).into_owned();
    let accept = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r##"
    <aside class="sidebar">
        <h1 style='font-family:sans-serif; color:#000;'>MHDQA: <br> Multi-Hop Document Question Answering</h1>

        <h2>&#128196; <b>Documents</b></h2>
        <p><b>Upload your documents here &darr;</b><br><i>(Use PDFs preferably)</i></p>

        <form class="upload-form" method="post" action="{base}/documents" enctype="multipart/form-data"
              hx-post="{base}/documents" hx-encoding="multipart/form-data"
              hx-target="#document-list" hx-swap="outerHTML">
            <label for="files"><b>+ New Document</b></label>
            <input id="files" type="file" name="files" accept="{accept}" multiple>
            <button type="submit" class="btn btn-secondary">Upload</button>
        </form>

        <hr class="divider">
        {list}
        <hr>
        <form method="post" action="{base}/restart"
              hx-post="{base}/restart" hx-target="#transcript" hx-swap="outerHTML">
            <button type="submit" class="btn btn-restart">Restart Chat</button>
        </form>
    </aside>"##,
        list = document_list(session_id, records, notice),
    )
}

/// The "Uploaded Documents" banner followed by one card per document.
///
/// Swapped as a whole after uploads and removals.
pub fn document_list(
    session_id: &str,
    records: &[UploadedDocumentRecord],
    notice: Option<&str>,
) -> String {
    let mut html = String::from(r#"<section id="document-list" class="document-list">"#);
    html.push_str(
        r#"<div class="uploaded-banner"><b> Uploaded Documents : </b></div><hr class="divider">"#,
    );
    if let Some(notice) = notice {
        html.push_str(notice);
    }
    for record in records {
        html.push_str(&document_card(session_id, record));
    }
    html.push_str("</section>");
    html
}

/// Card for one document, with its open and remove actions.
pub fn document_card(session_id: &str, record: &UploadedDocumentRecord) -> String {
    let base = encode_double_quoted_attribute(&format!("/sessions/{session_id}")).into_owned();
    let name_attr = encode_double_quoted_attribute(&record.file_name);
    let name_text = encode_text(&record.file_name);
    format!(
        r##"
        <div class="document-entry">
            <form method="post" action="{base}/documents/open"
                  hx-post="{base}/documents/open" hx-target="#document-list" hx-swap="outerHTML">
                <input type="hidden" name="name" value="{name_attr}">
                <button type="submit" class="btn btn-link">{name_text}</button>
            </form>
            <div class="file-info-box">
                <p>File Name: {name_text}</p>
                <p>File Size: {size}</p>
                <p>Upload Date: {date}</p>
                <p>Total Pages: {pages}</p>
            </div>
            <form method="post" action="{base}/documents/remove"
                  hx-post="{base}/documents/remove" hx-target="#document-list" hx-swap="outerHTML">
                <input type="hidden" name="name" value="{name_attr}">
                <button type="submit" class="btn btn-ghost">Remove</button>
            </form>
            <hr>
        </div>"##,
        size = record.display_size(),
        date = record.display_date(),
        pages = record.number_of_pages,
    )
}
