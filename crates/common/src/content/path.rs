//! POSIX-style path algebra over `/`-separated strings.
//!
//! These functions are total: every input maps to an absolute,
//! normalized path, and nothing here ever touches the tree.

pub const ROOT: &str = "/";

/// Normalize a path.
///
/// - `""` and `"."` become `/`
/// - a missing leading slash is added
/// - runs of slashes collapse to one
/// - a trailing slash is stripped (except on the root)
pub fn normalize(path: &str) -> String {
    if path.is_empty() || path == "." {
        return ROOT.to_string();
    }

    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Resolve `target` against `current`, the way a shell `cd` would.
pub fn resolve(current: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize(target);
    }

    let current = normalize(current);
    match target {
        "." => return current,
        ".." => return parent(&current).unwrap_or_else(|| ROOT.to_string()),
        _ => {}
    }

    let mut segments: Vec<&str> = segments(&current).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            // popping past the root is a no-op
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    normalize(&segments.join("/"))
}

/// The non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Parent of a normalized path, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) | None => Some(ROOT.to_string()),
        Some(idx) => Some(path[..idx].to_string()),
    }
}

/// Final segment of a normalized path. The root's name is empty.
pub fn name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a child name onto a normalized directory path.
pub fn join(dir: &str, child: &str) -> String {
    if dir == ROOT {
        format!("/{}", child)
    } else {
        format!("{}/{}", dir, child)
    }
}
