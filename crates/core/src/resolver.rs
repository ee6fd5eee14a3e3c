use std::collections::HashMap;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Source of values for placeholders in configured paths and URLs.
pub trait Environment: Send + Sync {
    /// Value for `$NAME` / `${NAME}`.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Value for a leading `@alias` token.
    fn alias(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Reads placeholders from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment whose values can be swapped between calls.
#[derive(Debug, Default)]
pub struct StaticEnvironment {
    vars: RwLock<HashMap<String, String>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(self, name: &str, value: &str) -> Self {
        self.set_var(name, value);
        self
    }

    pub fn with_alias(self, name: &str, value: &str) -> Self {
        self.aliases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn set_var(&self, name: &str, value: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }
}

impl Environment for StaticEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn alias(&self, name: &str) -> Option<String> {
        self.aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Substitute recognized placeholders, leaving everything else untouched.
pub fn interpolate(env: &dyn Environment, raw: &str) -> String {
    let raw = expand_alias(env, raw);
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.as_str();

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                let value = if name_len(name) == name.len() {
                    env.lookup(name)
                } else {
                    None
                };
                if let Some(value) = value {
                    out.push_str(&value);
                    rest = &braced[end + 1..];
                    continue;
                }
            }
        } else {
            let len = name_len(after);
            if len > 0 {
                if let Some(value) = env.lookup(&after[..len]) {
                    out.push_str(&value);
                    rest = &after[len..];
                    continue;
                }
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}

fn expand_alias(env: &dyn Environment, raw: &str) -> String {
    let Some(body) = raw.strip_prefix('@') else {
        return raw.to_string();
    };
    let end = body.find(['/', '\\']).unwrap_or(body.len());
    match env.alias(&body[..end]) {
        Some(value) => format!("{value}{}", &body[end..]),
        None => raw.to_string(),
    }
}

/// Length of the placeholder name at the start of `s` (ASCII identifier).
fn name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// Lexically normalize a path to the platform separator.
///
/// `.` segments are dropped, `name/..` pairs are folded, repeated separators
/// collapse and the trailing separator is removed unless the result is the
/// filesystem root.
pub fn normalize_path(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let unified = raw.replace('\\', "/");
    let (drive, rest) = split_drive(&unified);
    let absolute = rest.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let sep = MAIN_SEPARATOR.to_string();
    let mut out = drive.to_string();
    if absolute {
        out.push(MAIN_SEPARATOR);
    }
    out.push_str(&segments.join(&sep));

    if out.is_empty() {
        ".".to_string()
    } else {
        out
    }
}

fn split_drive(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if cfg!(windows) && bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        path.split_at(2)
    } else {
        ("", path)
    }
}

/// Turns configured roots and URLs into concrete values.
///
/// Nothing is memoized: the environment is consulted on every call.
#[derive(Clone)]
pub struct PathResolver {
    env: Arc<dyn Environment>,
    base_dir: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            base_dir: None,
        }
    }

    /// Directory that relative roots are resolved against. Defaults to the
    /// current working directory at resolution time.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn resolve_root(&self, raw: &str) -> String {
        let resolved = normalize_path(&interpolate(self.env.as_ref(), raw));
        if resolved.is_empty() || Path::new(&resolved).is_absolute() {
            return resolved;
        }

        let base = match &self.base_dir {
            Some(dir) => Some(dir.clone()),
            None => std::env::current_dir().ok(),
        };
        match base {
            Some(base) => normalize_path(&base.join(&resolved).to_string_lossy()),
            None => resolved,
        }
    }

    /// Resolve a base URL to end in exactly one `/`. Empty input stays empty.
    pub fn resolve_url(&self, raw: &str) -> String {
        let resolved = interpolate(self.env.as_ref(), raw);
        let trimmed = resolved.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        format!("{}/", trimmed.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(env: StaticEnvironment) -> PathResolver {
        PathResolver::new(Arc::new(env)).with_base_dir("/work")
    }

    #[test]
    fn interpolates_known_placeholders() {
        let env = StaticEnvironment::new()
            .with_var("STORAGE", "/srv/files")
            .with_var("SITE", "blog");
        assert_eq!(interpolate(&env, "$STORAGE/uploads"), "/srv/files/uploads");
        assert_eq!(interpolate(&env, "${STORAGE}/${SITE}x"), "/srv/files/blogx");
    }

    #[test]
    fn leaves_unknown_placeholders_untouched() {
        let env = StaticEnvironment::new();
        assert_eq!(interpolate(&env, "$MISSING/a"), "$MISSING/a");
        assert_eq!(interpolate(&env, "${MISSING}/a"), "${MISSING}/a");
        assert_eq!(interpolate(&env, "price $5 and $"), "price $5 and $");
        assert_eq!(interpolate(&env, "${unterminated"), "${unterminated");
        assert_eq!(interpolate(&env, "@webroot/a"), "@webroot/a");
    }

    #[test]
    fn expands_leading_alias() {
        let env = StaticEnvironment::new().with_alias("webroot", "/var/www/html");
        assert_eq!(interpolate(&env, "@webroot/assets"), "/var/www/html/assets");
        assert_eq!(interpolate(&env, "@webroot"), "/var/www/html");
        assert_eq!(interpolate(&env, "x/@webroot"), "x/@webroot");
    }

    #[cfg(unix)]
    #[test]
    fn normalizes_separators_and_trailing_slash() {
        assert_eq!(normalize_path("/srv//files/"), "/srv/files");
        assert_eq!(normalize_path("\\srv\\files\\\\"), "/srv/files");
        assert_eq!(normalize_path("/srv/./files/../data"), "/srv/data");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("a/../../b"), "../b");
    }

    #[cfg(unix)]
    #[test]
    fn resolve_root_substitutes_and_normalizes() {
        let r = resolver(StaticEnvironment::new().with_var("ROOT", "/srv/files/"));
        assert_eq!(r.resolve_root("$ROOT/uploads/"), "/srv/files/uploads");
        assert_eq!(r.resolve_root("${ROOT}"), "/srv/files");
        assert_eq!(r.resolve_root("uploads"), "/work/uploads");
    }

    #[cfg(unix)]
    #[test]
    fn resolve_root_is_recomputed_per_call() {
        let env = Arc::new(StaticEnvironment::new().with_var("TENANT", "alpha"));
        let r = PathResolver::new(env.clone());

        let first = r.resolve_root("/srv/$TENANT");
        assert_eq!(first, r.resolve_root("/srv/$TENANT"));
        assert_eq!(first, "/srv/alpha");

        env.set_var("TENANT", "beta");
        assert_eq!(r.resolve_root("/srv/$TENANT"), "/srv/beta");
    }

    #[test]
    fn resolve_url_has_exactly_one_trailing_slash() {
        let r = resolver(StaticEnvironment::new().with_var("CDN", "https://cdn.example.com"));
        assert_eq!(
            r.resolve_url("https://cdn.example.com/assets"),
            "https://cdn.example.com/assets/"
        );
        assert_eq!(r.resolve_url("$CDN/assets///"), "https://cdn.example.com/assets/");
        assert_eq!(r.resolve_url("/"), "/");
        assert_eq!(r.resolve_url(""), "");
        assert_eq!(r.resolve_url("   "), "");
    }
}
