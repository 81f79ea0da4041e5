/// `LIKE` pattern used by tour search.
///
/// The user's text is wrapped in `%...%` as-is. Any `%` or `_` it contains
/// keeps its wildcard meaning; nothing is escaped, and `\` is an ordinary
/// character (Postgres runs the pattern with `ESCAPE ''`). Matching ignores
/// case through Unicode lowercasing; Postgres folds according to the database
/// locale, which agrees for the usual UTF-8 locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern(String);

impl SearchPattern {
    /// A missing query searches for the empty string, i.e. `%%`.
    pub fn from_query(query: Option<&str>) -> Self {
        SearchPattern(format!("%{}%", query.unwrap_or_default()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, text: &str) -> bool {
        let pattern: Vec<char> = self.0.chars().flat_map(char::to_lowercase).collect();
        let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
        like(&pattern, &text)
    }
}

// Iterative LIKE with single-star backtracking.
fn like(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(&'%') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&'_') => {
                p += 1;
                t += 1;
            }
            Some(&c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
