//! Category slugging and URL path resolution.
//!
//! Feed category strings are `" / "`-delimited paths with inconsistent
//! casing and whitespace (`"Psy / Sucha karma / Bezzbożowa"`). Storefront
//! URLs use ASCII kebab-case segments (`psy/sucha-karma/bezzbozowa`).
//! [`slugify`] maps feed segments into URL space; matching a URL path back
//! onto feed strings happens in slug space so diacritic segments compare
//! equal to their own slugs. Default Unicode case folding does not touch
//! `ł` or `ó`, hence the explicit fold table.

/// Polish Latin-Extended characters folded to their base Latin letter.
fn fold_char(c: char) -> char {
    match c {
        'ą' => 'a',
        'ć' => 'c',
        'ę' => 'e',
        'ł' => 'l',
        'ń' => 'n',
        'ó' => 'o',
        'ś' => 's',
        'ź' | 'ż' => 'z',
        _ => c,
    }
}

/// Converts one category segment into its URL slug: lowercase, diacritics
/// folded, whitespace runs collapsed to single hyphens, everything else
/// non-alphanumeric dropped (`"Karma wg. wieku"` → `"karma-wg-wieku"`).
#[must_use]
pub fn slugify(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_hyphen = false;
    for c in segment.trim().chars() {
        if c.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        let folded = fold_char(c.to_lowercase().next().unwrap_or(c));
        if folded.is_ascii_alphanumeric() || folded == '-' {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(folded);
        }
    }
    out
}

/// Splits a feed category path on `/` and trims each segment, tolerating
/// the feed's uneven spacing around the separator.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The slug of every segment of a feed category path, in order.
#[must_use]
pub fn slug_segments(category: &str) -> Vec<String> {
    split_path(category).into_iter().map(slugify).collect()
}

/// Returns `true` if the feed category path matches the requested URL
/// path: the category's slugified segments must start with the URL path's
/// segments. Prefix-based and case-insensitive by construction; a lossy
/// best-effort match, never exact equality.
#[must_use]
pub fn category_matches_path(category: &str, url_path: &str) -> bool {
    let wanted = slug_segments(url_path);
    if wanted.is_empty() {
        return false;
    }
    let have = slug_segments(category);
    have.len() >= wanted.len() && have[..wanted.len()] == wanted[..]
}

/// Reconstructs a human-readable category prefix from a URL path:
/// `"psy/sucha-karma"` → `"Psy / Sucha karma"`. Each segment gets its
/// hyphens turned back into spaces and only its first letter capitalized.
/// Diacritics lost by slugging are not recovered.
#[must_use]
pub fn title_case_path(url_path: &str) -> String {
    split_path(url_path)
        .into_iter()
        .map(|segment| {
            let words = segment.replace('-', " ");
            let mut chars = words.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Resolves a URL path to the distinct original-casing feed category
/// strings it matches, preserving first-seen order.
#[must_use]
pub fn resolve_path<'a, I>(categories: I, url_path: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for category in categories {
        if category_matches_path(category, url_path) && !seen.iter().any(|s| s == category) {
            seen.push(category.to_string());
        }
    }
    seen
}
