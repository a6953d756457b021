pub const ENV_FILE_NAME: &str = ".env";
pub const ENV_CONTENT_TYPE: &str = "text/plain";

/// Object key for a project's env artifact: `<project>/.env`.
pub fn env_object_key(project_name: &str) -> String {
    join_key(&[project_name, ENV_FILE_NAME])
}

fn join_key(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .copied()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    clean_key(&joined)
}

// Lexical cleanup with the same rules as a filesystem path join, always using `/`.
fn clean_key(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
