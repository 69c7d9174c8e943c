//! Server-rendered pages. Markup is intentionally minimal; pages exist to
//! carry the forms and the user-facing messages the handlers render.

use axum::response::Html;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/styles.css\">\n\
         </head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

/// Escape text destined for element content. Emails come from user input
/// (registration or the OAuth provider) and must not render as markup.
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!("<p class=\"error\">{msg}</p>\n"),
        None => String::new(),
    }
}

pub fn index_page(user: Option<&str>) -> Html<String> {
    let account = match user {
        Some(email) => format!(
            "<span>Signed in as {}</span> <a href=\"/secrets\">Secrets</a> \
             <a href=\"/logout\">Log out</a>",
            escape_html(email)
        ),
        None => "<a href=\"/login\">Log in</a> <a href=\"/register\">Register</a>".to_string(),
    };
    let body = format!(
        "<nav><a href=\"/\">Home</a> <a href=\"/contact\">Contact</a> {account}</nav>\n\
         <h1>Welcome</h1>\n\
         <p>Personal portfolio and project showcase.</p>"
    );
    layout("Home Page", &body)
}

pub fn contact_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Contact</h1>\n{}\
         <form method=\"post\" action=\"/submit\">\n\
         <label>Name <input type=\"text\" name=\"name\"></label>\n\
         <label>Email <input type=\"text\" name=\"email\"></label>\n\
         <label>Comment <textarea name=\"comment-text\"></textarea></label>\n\
         <button type=\"submit\">Send</button>\n\
         </form>",
        error_banner(error)
    );
    layout("Contact Page", &body)
}

pub fn submit_page(result: &str) -> Html<String> {
    let body = format!(
        "<h1>Contact</h1>\n<p>{result}</p>\n<p><a href=\"/contact\">Back to the form</a></p>"
    );
    layout("Contact Page", &body)
}

pub fn login_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1>\n{}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Email <input type=\"email\" name=\"username\"></label>\n\
         <label>Password <input type=\"password\" name=\"password\"></label>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n\
         <p><a href=\"/auth/google\">Sign in with Google</a></p>\n\
         <p>New here? <a href=\"/register\">Register</a></p>",
        error_banner(error)
    );
    layout("Login", &body)
}

pub fn register_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Register</h1>\n{}\
         <form method=\"post\" action=\"/register\">\n\
         <label>Email <input type=\"email\" name=\"username\"></label>\n\
         <label>Password <input type=\"password\" name=\"password\"></label>\n\
         <button type=\"submit\">Register</button>\n\
         </form>\n\
         <p><a href=\"/auth/google\">Sign up with Google</a></p>\n\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
        error_banner(error)
    );
    layout("Register", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_renders_error_banner() {
        let Html(page) = login_page(Some("Invalid email or password."));
        assert!(page.contains("Invalid email or password."));
        assert!(page.contains("class=\"error\""));
    }

    #[test]
    fn contact_page_has_no_banner_by_default() {
        let Html(page) = contact_page(None);
        assert!(!page.contains("class=\"error\""));
        assert!(page.contains("name=\"comment-text\""));
    }

    #[test]
    fn index_page_swaps_nav_for_signed_in_user() {
        let Html(anon) = index_page(None);
        assert!(anon.contains("href=\"/login\""));

        let Html(signed) = index_page(Some("a@x.com"));
        assert!(signed.contains("Signed in as a@x.com"));
        assert!(signed.contains("href=\"/logout\""));
    }

    #[test]
    fn index_page_escapes_markup_in_the_email() {
        let Html(page) = index_page(Some("<script>alert(1)</script>@x.com"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("Signed in as &lt;script&gt;alert(1)&lt;/script&gt;@x.com"));
    }
}
