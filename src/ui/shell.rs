//! Full HTML pages.

use crate::conversation::ConversationState;
use crate::research::Screen;
use crate::session::Session;

use super::html::{conversation, escape};

const STYLES: &str = r"
:root { --bg: #0f1115; --surface: #181b22; --text: #e6e8ee; --muted: #9aa0ab; --accent: #6ea8fe; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); }
header.top { display: flex; gap: 1rem; align-items: center; padding: .75rem 1.5rem; background: var(--surface); }
header.top a { color: var(--muted); text-decoration: none; }
header.top a.active, header.top a:hover { color: var(--text); }
main { max-width: 56rem; margin: 0 auto; padding: 1.5rem; }
.turn { margin: 1rem 0; }
.turn.user .bubble { margin-left: auto; max-width: 80%; width: fit-content; padding: .6rem .9rem; border-radius: 1rem; background: var(--accent); color: #0b0d12; }
.card { background: var(--surface); border-radius: .75rem; padding: 1rem; margin: .75rem 0; }
.card-header { display: flex; justify-content: space-between; gap: 1rem; }
.card-title, .card-link { color: var(--accent); }
.card-meta { display: flex; flex-wrap: wrap; gap: .75rem; color: var(--muted); font-size: .85rem; margin: .4rem 0; }
mark.hl { background: #f5d76e; color: #111; padding: 0 .1rem; }
.results-heading { font-weight: 600; }
.results-empty { color: var(--muted); }
.sources-panel { position: fixed; top: 0; right: 0; width: 22rem; height: 100vh; overflow-y: auto; background: var(--surface); padding: 1rem; }
.source { margin: .75rem 0; }
.source-label { font-weight: 600; }
.loading .spinner { display: inline-block; width: 1rem; height: 1rem; border: 2px solid var(--muted); border-top-color: transparent; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
form.composer { display: flex; gap: .5rem; position: sticky; bottom: 0; padding: 1rem 0; background: var(--bg); }
form.composer input { flex: 1; padding: .7rem; border-radius: .5rem; border: 1px solid var(--muted); background: var(--surface); color: var(--text); }
";

/// Generate the HTML shell for the application.
pub fn html_shell(title: &str, active: Option<Screen>, content: &str) -> String {
    let nav: String = Screen::ALL
        .iter()
        .map(|screen| {
            let class = if Some(*screen) == active { " class=\"active\"" } else { "" };
            format!(
                r#"<a href="/{slug}"{class}>{label}</a>"#,
                slug = screen.slug(),
                label = screen.label()
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="https://unpkg.com/htmx.org@2.0.8"></script>
    <style>{STYLES}</style>
</head>
<body>
    <header class="top">
        <a href="/"><strong>Legal Research</strong></a>
        <nav>{nav}</nav>
    </header>
    <main id="app">
        {content}
    </main>
</body>
</html>"#,
        title = escape(title)
    )
}

/// Landing page linking every screen.
pub fn landing_page() -> String {
    let links: String = Screen::ALL
        .iter()
        .map(|screen| {
            format!(
                r#"<li><a class="card-title" href="/{}">{}</a> <span class="results-empty">{}</span></li>"#,
                screen.slug(),
                screen.label(),
                screen.title()
            )
        })
        .collect();
    html_shell(
        "Legal Research",
        None,
        &format!(r#"<h1>Legal Research</h1><ul class="screens">{links}</ul>"#),
    )
}

/// Chat page for one session: conversation region plus the prompt form.
pub fn chat_page(session: &Session, state: &ConversationState) -> String {
    let screen = session.screen();
    let content = format!(
        r##"{conversation}
<form class="composer" hx-post="/conversations/{id}/submit" hx-target="#conversation" hx-swap="outerHTML" hx-disabled-elt="find button" hx-on::after-request="if (event.detail.successful) this.reset()">
    <input type="text" name="prompt" placeholder="{placeholder}" autocomplete="off" autofocus>
    <button type="submit">Send</button>
</form>"##,
        conversation = conversation(session, state),
        id = escape(session.id()),
        placeholder = escape(screen.placeholder()),
    );
    html_shell(screen.title(), Some(screen), &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_links_every_screen() {
        let page = landing_page();
        for screen in Screen::ALL {
            assert!(page.contains(&format!("href=\"/{}\"", screen.slug())));
        }
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_shell_marks_active_screen() {
        let page = html_shell("t", Some(Screen::Draft), "<p>body</p>");
        assert!(page.contains(r#"<a href="/draft" class="active">"#));
        assert!(page.contains(r#"<a href="/research">"#));
        assert!(page.contains("<p>body</p>"));
    }
}
