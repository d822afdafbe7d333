//! Bare-bones HTML pages. Markup is kept to what a browser needs to drive
//! the login flow and read posts.

use axum::response::Html;

use crate::broadcasts::BroadcastView;
use crate::context::RequestContext;
use crate::locale::TranslationCatalog;
use crate::posts::{PostView, ThreadView};
use crate::principal::Principal;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wraps `body` in the shared page chrome: navigation, flash messages and
/// (for logged-in users) the notification panel.
pub fn page(
    ctx: &RequestContext,
    catalog: &TranslationCatalog,
    title: &str,
    body: &str,
) -> Html<String> {
    let t = |key: &str| escape(&catalog.translate(&ctx.locale, key));
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<nav>",
        escape(&ctx.locale),
        escape(title)
    ));
    html.push_str(&format!(
        "<a href=\"/\">{}</a> <a href=\"/posts\">{}</a>",
        t("nav.home"),
        t("nav.posts")
    ));
    if ctx.is_admin() {
        html.push_str(&format!(
            " <a href=\"/users\">{}</a> <a href=\"/broadcasts\">{}</a>",
            t("nav.users"),
            t("nav.broadcasts")
        ));
    }
    match &ctx.principal {
        Some(principal) => {
            html.push_str(&format!(
                " <span class=\"who\">{}</span><form method=\"post\" action=\"/session/logout\"><button>{}</button></form>",
                escape(&principal.display_name),
                t("nav.logout")
            ));
        }
        None => {
            html.push_str(&format!(
                " <a href=\"/session/new\">{}</a>",
                t("nav.login")
            ));
        }
    }
    html.push_str("</nav>\n");

    for message in ctx.messages() {
        html.push_str(&format!(
            "<p class=\"flash {}\">{}</p>\n",
            message.level.as_str(),
            escape(&message.text)
        ));
    }

    html.push_str(&format!(
        "<main>\n<h1>{}</h1>\n{}\n</main>\n",
        escape(title),
        body
    ));

    if ctx.principal.is_some() && !ctx.notifications.is_empty() {
        html.push_str(&format!(
            "<aside><h2>{}</h2><ul>",
            t("notifications.title")
        ));
        for notification in &ctx.notifications {
            html.push_str(&format!("<li>{}</li>", escape(&notification.content)));
        }
        html.push_str("</ul></aside>\n");
    }

    html.push_str("</body>\n</html>\n");
    Html(html)
}

pub fn login_form(catalog: &TranslationCatalog, locale: &str) -> String {
    let t = |key: &str| escape(&catalog.translate(locale, key));
    format!(
        "<form method=\"post\" action=\"/session\">\
         <label>{}<input name=\"login\"></label>\
         <label>{}<input name=\"password\" type=\"password\"></label>\
         <button>{}</button></form>",
        t("session.login"),
        t("session.password"),
        t("session.submit")
    )
}

pub fn post_list(posts: &[PostView]) -> String {
    let mut html = String::from("<ul class=\"posts\">");
    for post in posts {
        html.push_str(&format!(
            "<li><a href=\"/posts/{}\">{}</a> <small>{}</small></li>",
            post.id,
            escape(&post.title),
            escape(post.author.as_deref().unwrap_or("anonymous"))
        ));
    }
    html.push_str("</ul>");
    html
}

pub fn thread(view: &ThreadView) -> String {
    let mut html = format!(
        "<article><p>{}</p><small>{}</small></article>",
        escape(&view.post.body),
        escape(view.post.author.as_deref().unwrap_or("anonymous"))
    );
    for reply in &view.replies {
        html.push_str(&format!(
            "<article class=\"reply\"><h3>{}</h3><p>{}</p><small>{}</small></article>",
            escape(&reply.title),
            escape(&reply.body),
            escape(reply.author.as_deref().unwrap_or("anonymous"))
        ));
    }
    let thread_id = view.post.thread_id.unwrap_or(view.post.id);
    html.push_str(&format!(
        "<form method=\"post\" action=\"/posts/{thread_id}/replies\">\
         <input name=\"title\"><textarea name=\"body\"></textarea>\
         <label><input type=\"checkbox\" name=\"anonymous\" value=\"true\">anonymous</label>\
         <button>Reply</button></form>"
    ));
    html
}

pub fn new_post_form() -> &'static str {
    "<form method=\"post\" action=\"/posts\">\
     <input name=\"title\"><textarea name=\"body\"></textarea>\
     <label><input type=\"checkbox\" name=\"anonymous\" value=\"true\">anonymous</label>\
     <button>Post</button></form>"
}

pub fn search_form(query: &str) -> String {
    format!(
        "<form method=\"get\" action=\"/posts/search\"><input name=\"q\" value=\"{}\"><button>Search</button></form>",
        escape(query)
    )
}

pub fn user_list(users: &[Principal]) -> String {
    let mut html = String::from("<table><tr><th>login</th><th>name</th><th>role</th></tr>");
    for user in users {
        html.push_str(&format!(
            "<tr><td><a href=\"/users/{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
            user.id,
            escape(&user.login),
            escape(&user.display_name),
            user.role
        ));
    }
    html.push_str("</table>");
    html
}

pub fn broadcast_list(broadcasts: &[BroadcastView]) -> String {
    let mut html = String::from(
        "<form method=\"post\" action=\"/broadcasts\">\
         <textarea name=\"content\"></textarea>\
         <input name=\"feeds\" value=\"notification\">\
         <button>Broadcast</button></form><ul>",
    );
    for view in broadcasts {
        html.push_str(&format!(
            "<li>{} <small>{}</small></li>",
            escape(&view.broadcast.content),
            escape(&view.feeds.join(", "))
        ));
    }
    html.push_str("</ul>");
    html
}
