use axum::{http::header, response::IntoResponse};

const ROUTES: &[(&str, &[&str])] = &[
    (
        "/[YOUR-SHORTENER-KEY]",
        &[
            "URI that your shortener works.",
            "If your shortener exists, you will be redirected to its destination.",
            "If not, you will be redirected to add the shortener.",
        ],
    ),
    (
        "/add/[YOUR-SHORTENER-KEY]",
        &[
            "URI where you can add a new shortener.",
            "If your shortener does not exist, you can add it.",
            "If it exists, you will be redirected to edit it.",
        ],
    ),
    (
        "/edit/[YOUR-SHORTENER-KEY]",
        &[
            "URI where you can edit a shortener.",
            "If your shortener exists, you can edit it.",
            "If not, you will be redirected to add it.",
        ],
    ),
    (
        "/remove/[YOUR-SHORTENER-KEY]",
        &["URI where you can remove a shortener."],
    ),
    ("/help", &["Your current URI, listing every URI above."]),
];

/// Render the route listing: route in a 40-column gutter, one line per sentence.
pub fn help_text() -> String {
    let mut out = String::new();
    for (route, lines) in ROUTES {
        for (i, line) in lines.iter().enumerate() {
            let gutter = if i == 0 { *route } else { "" };
            out.push_str(&format!("{gutter:<40}{line}\n"));
        }
        out.push('\n');
    }
    out
}

/// GET /help
pub async fn help() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        help_text(),
    )
}
