use crate::error::{TdmsError, Result};

/// Split an object path such as `/'Group'/'Chan''nel'` into its unquoted
/// components (`["Group", "Chan'nel"]`). The root path `/` has none.
pub fn split_path(path: &str) -> Result<Vec<String>> {
    let invalid = || TdmsError::Unsupported(format!("malformed object path {:?}", path));
    let mut components = Vec::new();
    let mut chars = path.chars().peekable();

    if path == "/" {
        return Ok(components);
    }

    while let Some(c) = chars.next() {
        if c != '/' || chars.next() != Some('\'') {
            return Err(invalid());
        }
        let mut name = String::new();
        loop {
            match chars.next() {
                Some('\'') if chars.peek() == Some(&'\'') => {
                    chars.next();
                    name.push('\'');
                }
                Some('\'') => break,
                Some(other) => name.push(other),
                None => return Err(invalid()),
            }
        }
        components.push(name);
    }

    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components)
}

/// Build the path of a group from its name
pub fn group_path(group: &str) -> String {
    format!("/'{}'", group.replace('\'', "''"))
}

/// Build the path of a channel from its group and channel names
pub fn channel_path(group: &str, channel: &str) -> String {
    format!("{}/'{}'", group_path(group), channel.replace('\'', "''"))
}

/// Paths naming a group, in input order
pub fn group_paths<'a, I>(paths: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .filter(|p| matches!(split_path(p), Ok(c) if c.len() == 1))
        .collect()
}

/// Paths naming a channel directly under `group`, in input order
pub fn channel_paths<'a, I>(paths: I, group: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .filter(|p| matches!(split_path(p), Ok(c) if c.len() == 2 && c[0] == group))
        .collect()
}
