//! Scraping helpers for the OAuth login dialog.
//!
//! The dialog is a plain HTML page. We only need to find the login form,
//! carry over its hidden fields, spot the "Allow" link on the consent page,
//! and pull the authorization code out of a redirect URL.

use regex::Regex;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `id` of the login form on the OAuth dialog page.
pub const LOGIN_FORM_ID: &str = "login-form";

/// Text of the link that grants the application access.
pub const ALLOW_LINK_TEXT: &str = "Allow";

static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form\s*>").expect("valid regex"));

static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").expect("valid regex"));

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("valid regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// A form found on the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Raw `action` attribute; `None` submits back to the page itself.
    pub action: Option<String>,
    /// Lowercased `method`, `post` when absent.
    pub method: String,
    /// Successful controls in document order.
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    pub fn is_get(&self) -> bool {
        self.method == "get"
    }

    /// Form fields with `login` and `password` filled in.
    pub fn with_credentials(&self, login: &str, password: &str) -> Vec<(String, String)> {
        let mut fields = self.fields.clone();
        set_field(&mut fields, "login", login);
        set_field(&mut fields, "password", password);
        fields
    }
}

fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    match fields.iter_mut().find(|(n, _)| n == name) {
        Some(field) => field.1 = value.to_string(),
        None => fields.push((name.to_string(), value.to_string())),
    }
}

/// Parse the attributes of a tag body (everything after the tag name).
///
/// Names are lowercased; valueless attributes map to an empty string.
fn parse_attributes(tag: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(tag)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

/// Decode the handful of entities that show up in attribute values.
fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn form_fields(form_body: &str) -> Vec<(String, String)> {
    INPUT_RE
        .captures_iter(form_body)
        .filter_map(|caps| {
            let attrs = parse_attributes(&caps[1]);
            let name = attrs.get("name").filter(|n| !n.is_empty())?;
            let kind = attrs
                .get("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string());

            match kind.as_str() {
                "submit" | "button" | "image" | "reset" | "file" => None,
                "checkbox" | "radio" if !attrs.contains_key("checked") => None,
                "checkbox" | "radio" => Some((
                    name.clone(),
                    attrs.get("value").cloned().unwrap_or_else(|| "on".to_string()),
                )),
                _ => Some((name.clone(), attrs.get("value").cloned().unwrap_or_default())),
            }
        })
        .collect()
}

/// Find the form whose `id` is `login-form` (case-insensitive).
pub fn find_login_form(html: &str) -> Option<LoginForm> {
    FORM_RE.captures_iter(html).find_map(|caps| {
        let attrs = parse_attributes(&caps[1]);
        let id = attrs.get("id")?;
        if !id.eq_ignore_ascii_case(LOGIN_FORM_ID) {
            return None;
        }

        Some(LoginForm {
            action: attrs.get("action").filter(|a| !a.is_empty()).cloned(),
            method: attrs
                .get("method")
                .map(|m| m.to_ascii_lowercase())
                .unwrap_or_else(|| "post".to_string()),
            fields: form_fields(&caps[2]),
        })
    })
}

/// `href` of the first link whose visible text contains `text`.
pub fn find_link_with_text(html: &str, text: &str) -> Option<String> {
    LINK_RE.captures_iter(html).find_map(|caps| {
        let visible = TAG_RE.replace_all(&caps[2], "");
        if !visible.contains(text) {
            return None;
        }
        parse_attributes(&caps[1])
            .remove("href")
            .filter(|href| !href.is_empty())
    })
}

/// The `code` query parameter of a URL, if any.
pub fn authorization_code(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// Look for the code on the URL just reached, then on its `Location` target.
pub fn code_from_redirect(current: &Url, location: Option<&str>) -> Option<String> {
    authorization_code(current).or_else(|| {
        location
            .and_then(|loc| current.join(loc).ok())
            .and_then(|target| authorization_code(&target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
<html><body>
  <form id="search" action="/search"><input name="q"></form>
  <form ID="Login-Form" action="/session?client_id=abc&amp;x=1" method="POST">
    <input type="hidden" name="authenticity_token" value="tok==">
    <input type='hidden' name='return_to' value='/dialog/oauth'>
    <input type="text" name="login">
    <input type="password" name="password">
    <input type="checkbox" name="remember_me" value="1">
    <input type="checkbox" name="terms" checked>
    <input type="submit" name="commit" value="Log In">
  </form>
</body></html>"#;

    #[test]
    fn test_find_login_form() {
        let form = find_login_form(LOGIN_PAGE).unwrap();
        assert_eq!(form.action.as_deref(), Some("/session?client_id=abc&x=1"));
        assert!(!form.is_get());
        assert_eq!(
            form.fields,
            vec![
                ("authenticity_token".to_string(), "tok==".to_string()),
                ("return_to".to_string(), "/dialog/oauth".to_string()),
                ("login".to_string(), String::new()),
                ("password".to_string(), String::new()),
                ("terms".to_string(), "on".to_string()),
            ]
        );
    }

    #[test]
    fn test_login_form_not_found() {
        assert!(find_login_form("<form id=\"other\"></form>").is_none());
        assert!(find_login_form("<p>Maintenance</p>").is_none());
    }

    #[test]
    fn test_with_credentials() {
        let form = find_login_form(LOGIN_PAGE).unwrap();
        let fields = form.with_credentials("me@example.com", "hunter2");

        assert!(fields.contains(&("login".to_string(), "me@example.com".to_string())));
        assert!(fields.contains(&("password".to_string(), "hunter2".to_string())));
        assert_eq!(fields.len(), form.fields.len());

        let bare = LoginForm {
            action: None,
            method: "get".to_string(),
            fields: vec![],
        };
        assert!(bare.is_get());
        assert_eq!(bare.with_credentials("a", "b").len(), 2);
    }

    #[test]
    fn test_find_allow_link() {
        let html = r#"
            <a href="/deny?x=1">Deny</a>
            <a class="btn" href="/oauth2/decision?allow=1&amp;state=s"><span>Allow</span> access</a>"#;
        assert_eq!(
            find_link_with_text(html, ALLOW_LINK_TEXT).as_deref(),
            Some("/oauth2/decision?allow=1&state=s")
        );
        assert!(find_link_with_text("<a href=\"/x\">Nope</a>", ALLOW_LINK_TEXT).is_none());
    }

    #[test]
    fn test_authorization_code() {
        let url = Url::parse("https://app.example.com/callback?code=AbC123&state=z").unwrap();
        assert_eq!(authorization_code(&url).as_deref(), Some("AbC123"));

        let url = Url::parse("https://app.example.com/callback?error=denied").unwrap();
        assert!(authorization_code(&url).is_none());
    }

    #[test]
    fn test_code_from_redirect() {
        let current = Url::parse("https://www.yammer.com/session").unwrap();
        assert_eq!(
            code_from_redirect(&current, Some("https://app.example.com/cb?code=xyz")).as_deref(),
            Some("xyz")
        );
        assert_eq!(
            code_from_redirect(&current, Some("/cb?code=rel")).as_deref(),
            Some("rel")
        );
        assert!(code_from_redirect(&current, None).is_none());
    }
}
