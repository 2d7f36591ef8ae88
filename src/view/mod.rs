use crate::details::{DetailState, DetailStatus};
use crate::models::WatchedEntry;
use crate::search::SearchState;
use crate::stats::WatchedStats;
use std::fmt::Write;

pub fn render_search(state: &SearchState) -> String {
    let mut out = format!("Found {} results\n", state.results.len());

    if state.loading {
        out.push_str("Loading.....\n");
    } else if let Some(ref error) = state.error {
        let _ = writeln!(out, "⛔ {}", error);
    } else {
        for (i, movie) in state.results.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {} (🗓 {}) [{}]", i + 1, movie.title, movie.year, movie.id);
        }
    }
    out
}

/// `rating` filled stars out of `max`.
pub fn render_stars(rating: Option<u8>, max: u8) -> String {
    let filled = rating.unwrap_or(0).min(max) as usize;
    let mut stars = "★".repeat(filled);
    stars.push_str(&"☆".repeat(max as usize - filled));
    stars
}

pub fn render_detail(state: &DetailState, already_watched: Option<&WatchedEntry>, max_stars: u8) -> String {
    let mut out = String::new();

    let detail = match state.status {
        DetailStatus::Idle => return out,
        DetailStatus::Loading => return "Loading.....\n".to_string(),
        DetailStatus::Failed(ref message) => {
            let _ = writeln!(out, "⛔ {}", message);
            return out;
        }
        DetailStatus::Loaded(ref detail) => detail,
    };

    let _ = writeln!(out, "{}", detail.title);
    let _ = writeln!(out, "{} • {} • {}", detail.year, detail.runtime, detail.genre);
    match detail.rating {
        Some(rating) => {
            let _ = writeln!(out, "⭐ {} IMDb rating", rating);
        }
        None => out.push_str("⭐ N/A IMDb rating\n"),
    }
    out.push('\n');

    match already_watched {
        Some(entry) => {
            let _ = writeln!(out, "You have already rated this movie with {}⭐", entry.user_rating);
        }
        None => {
            let _ = writeln!(
                out,
                "{} {}",
                render_stars(state.user_rating, max_stars),
                state.user_rating.map(|r| r.to_string()).unwrap_or_default()
            );
            out.push_str("Rate with :rate <n>, then :add to add it to your watched list\n");
        }
    }
    out.push('\n');

    let _ = writeln!(out, "{}", detail.plot);
    let _ = writeln!(out, "Starring: {}", detail.actors);
    let _ = writeln!(out, "Directed by: {}", detail.director);
    out
}

pub fn render_stats(stats: &WatchedStats) -> String {
    format!(
        "Movies you watched\n#️⃣ {} movies  ⭐️ {:.2}  🌟 {:.2}  ⏳ {:.0} min\n",
        stats.count, stats.avg_critic_rating, stats.avg_user_rating, stats.avg_runtime_minutes
    )
}

pub fn render_watched(entries: &[WatchedEntry]) -> String {
    let mut out = String::new();
    for (i, movie) in entries.iter().enumerate() {
        let critic = movie
            .critic_rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let runtime = movie
            .runtime_minutes
            .map(|m| m.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            out,
            "{:>3}. {} [{}]  ⭐️ {}  🌟 {}  ⏳ {} min",
            i + 1,
            movie.title,
            movie.id,
            critic,
            movie.user_rating,
            runtime
        );
    }
    out
}
