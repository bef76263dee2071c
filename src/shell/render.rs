//! Terminal tables for URLs and visits.

use colored::*;
use url_shortener_client::ApiClient;
use url_shortener_client::domain::entities::{ShortUrl, Visit};
use url_shortener_client::infrastructure::http::endpoint_url;

const URL_WIDTH: usize = 48;

/// Public link for `short_id`, served by the url area.
pub fn short_link(client: &ApiClient, short_id: &str) -> String {
    let base = client.urls().transport().base_url();
    endpoint_url(base, &[short_id])
        .map(String::from)
        .unwrap_or_else(|_| short_id.to_string())
}

pub fn print_created(client: &ApiClient, short_id: &str) {
    println!("{}", "✓ Short URL created".green().bold());
    println!("  {:<10} {}", "Short ID:".bright_white(), short_id.bright_yellow());
    println!("  {:<10} {}", "Link:".bright_white(), short_link(client, short_id).cyan());
}

pub fn print_urls(client: &ApiClient, urls: &[ShortUrl]) {
    if urls.is_empty() {
        println!("{}", "No short URLs yet.".yellow());
        return;
    }

    println!("{}", format!("Your URLs ({})", urls.len()).bright_blue().bold());
    println!();
    println!(
        "{:<12} {:<width$} {:>7}  {:<16}",
        "SHORT ID".bright_white().bold(),
        "DESTINATION".bright_white().bold(),
        "VISITS".bright_white().bold(),
        "CREATED".bright_white().bold(),
        width = URL_WIDTH
    );
    println!("{}", "─".repeat(12 + URL_WIDTH + 27).bright_black());

    for url in urls {
        let created = url
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<12} {:<width$} {:>7}  {:<16}",
            url.short_id.bright_yellow(),
            truncate(&url.redirect_url, URL_WIDTH),
            url.visit_count.to_string().green(),
            created.bright_black(),
            width = URL_WIDTH
        );
    }

    println!();
    println!(
        "{} {}/{}",
        "Links:".bright_white(),
        client.urls().transport().base_url().as_str().trim_end_matches('/').cyan(),
        "<short id>".bright_black()
    );
}

pub fn print_visits(short_id: &str, visits: &[Visit]) {
    println!(
        "{} {} {}",
        "Analytics for".bright_blue().bold(),
        short_id.trim().bright_yellow().bold(),
        format!("({} visits)", visits.len()).bright_white()
    );

    if visits.is_empty() {
        println!("{}", "No visits recorded.".yellow());
        return;
    }

    println!();
    println!(
        "{:<16} {:<14} {:<14} {:<10} {:<22} {}",
        "WHEN".bright_white().bold(),
        "BROWSER".bright_white().bold(),
        "OS".bright_white().bold(),
        "DEVICE".bright_white().bold(),
        "LOCATION".bright_white().bold(),
        "REFERRER".bright_white().bold(),
    );

    for visit in visits {
        let when = visit
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<16} {:<14} {:<14} {:<10} {:<22} {}",
            when.bright_black(),
            or_dash(&visit.browser),
            or_dash(&visit.os),
            or_dash(&visit.device),
            truncate(&location(visit), 22),
            truncate(or_dash(&visit.referrer), 40).bright_black(),
        );
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("-")
}

fn location(visit: &Visit) -> String {
    let parts: Vec<&str> = [&visit.city, &visit.region, &visit.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

/// Shortens `value` to at most `max` characters, marking the cut with `…`.
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
