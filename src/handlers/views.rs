//! Server-rendered HTML pages.
//!
//! Markup is kept deliberately plain; every user-supplied string goes through
//! [`escape`] before it reaches the page.

use crate::domain::User;
use axum::response::Html;

/// Minimal HTML escaping for text and attribute values.
pub fn escape(raw: &str) -> String {
    // ---
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    // ---
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <nav><a href="/">Home</a> | <a href="/favoritos">Favorites</a></nav>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

pub fn home_page(user: Option<&User>) -> Html<String> {
    // ---
    let body = match user {
        Some(user) => format!(
            r#"    <h1>Hello, {name}!</h1>
    <p>You have {count} favorite joke(s).</p>
    <ul>
      <li><a href="/favoritos">My favorites</a></li>
      <li><a href="/logout">Log out</a></li>
      <li><a href="/removeAccount">Delete my account</a></li>
    </ul>"#,
            name = escape(&user.name),
            count = user.favorites.len(),
        ),
        None => r#"    <h1>Welcome!</h1>
    <p><a href="/login">Log in</a> or <a href="/registrar">create an account</a> to keep your favorite jokes.</p>"#
            .to_string(),
    };

    layout("Jokes", &body)
}

pub fn login_page() -> Html<String> {
    // ---
    layout(
        "Log in",
        r#"    <h1>Log in</h1>
    <form method="post" action="/login">
      <label>Username <input name="username" required></label>
      <label>Password <input name="password" type="password" required></label>
      <button type="submit">Log in</button>
    </form>
    <p>No account? <a href="/registrar">Register</a>.</p>"#,
    )
}

pub fn register_page() -> Html<String> {
    // ---
    layout(
        "Register",
        r#"    <h1>Register</h1>
    <form method="post" action="/registrar">
      <label>Username <input name="username" required></label>
      <label>Password <input name="password" type="password" required></label>
      <button type="submit">Create account</button>
    </form>
    <p>Already registered? <a href="/login">Log in</a>.</p>"#,
    )
}

/// Favorites with their current positions. Positions shift after every removal,
/// so each remove button is only good until the page is re-rendered.
pub fn favorites_page(user: &User, favorites: &[String]) -> Html<String> {
    // ---
    let items = if favorites.is_empty() {
        "    <p class=\"empty\">No favorites yet.</p>".to_string()
    } else {
        let rows: Vec<String> = favorites
            .iter()
            .enumerate()
            .map(|(index, item)| {
                format!(
                    r#"      <li data-index="{index}">{item}
        <form method="post" action="/removeFromFavorites/{index}"><button type="submit">Remove</button></form>
      </li>"#,
                    item = escape(item),
                )
            })
            .collect();
        format!("    <ol start=\"0\">\n{}\n    </ol>", rows.join("\n"))
    };

    let body = format!(
        r#"    <h1>{name}'s favorites</h1>
{items}
    <form method="post" action="/addToFavorites">
      <label>Joke <input name="joke" required></label>
      <button type="submit">Add</button>
    </form>"#,
        name = escape(&user.name),
    );

    layout("Favorites", &body)
}
