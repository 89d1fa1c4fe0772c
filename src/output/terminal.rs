// Colored terminal output for post listings and feeds.
//
// This module handles all terminal-specific formatting; the main.rs
// display paths delegate here.

use colored::Colorize;

use super::truncate_chars;
use crate::store::models::Post;

/// Display a list of posts as a table.
pub fn display_posts(title: &str, posts: &[Post]) {
    println!("\n{}", format!("=== {title} ({}) ===", posts.len()).bold());

    if posts.is_empty() {
        println!("  (nothing here)");
        return;
    }

    println!(
        "  {:>6}  {:<52} {:<16} {}",
        "Id".dimmed(),
        "Header".dimmed(),
        "Author".dimmed(),
        "Posted".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for post in posts {
        println!(
            "  {:>6}  {:<52} {:<16} {}",
            post.id,
            truncate_chars(&post.header, 50),
            truncate_chars(&post.author, 14),
            post.posted_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

/// Display a single post in full.
pub fn display_post(post: &Post) {
    println!("\n{}", format!("=== Post {} ===", post.id).bold());
    println!("  {}", post.header.bold());
    println!("  {} · {}", post.author, post.posted_at.format("%Y-%m-%d %H:%M"));
    if post.photo.is_some() {
        println!("  {}", "[photo attached]".dimmed());
    }
    println!("\n{}", post.text);
}

/// Display the page footer for paginated listings.
pub fn display_page_info(page: usize, total_pages: usize) {
    println!("\n  {}", format!("page {page} of {total_pages}").dimmed());
}
