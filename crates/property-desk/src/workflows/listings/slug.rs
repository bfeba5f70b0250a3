use rand::Rng;

const MAX_BASE_LEN: usize = 80;
const SUFFIX_LEN: usize = 5;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// URL-safe slug for a title: lowercase, dash separated, ASCII word characters only.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_dash = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(ch);
    }

    if pending_dash && !slug.is_empty() {
        slug.push('-');
    }

    slug.truncate(MAX_BASE_LEN);
    slug
}

/// Title slug plus a random base-36 suffix. Uniqueness is enforced by the store, not here.
pub fn listing_slug<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    let base = slugify(title);
    let base = if base.is_empty() {
        "listing".to_string()
    } else {
        base
    };

    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    format!("{base}-{suffix}")
}
