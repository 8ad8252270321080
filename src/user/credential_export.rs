use super::User;
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

pub fn export_file_name(username: &str) -> String {
    let safe: String = username
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{}_data.txt", safe)
}

/// `Admin` is `true` or `false`.
pub fn export_contents(user: &User, password: &str) -> String {
    format!(
        "Username: {}\nPassword: {}\nID: {}\nRegistered: {}\nAdmin: {}",
        user.username,
        password,
        user.id,
        user.registered.to_rfc3339(),
        user.is_admin()
    )
}

/// Writes the credentials text file of a freshly registered user into `dir`.
pub fn export_credentials(dir: &Path, user: &User, password: &str) -> io::Result<PathBuf> {
    let path = dir.join(export_file_name(&user.username));
    fs::write(&path, export_contents(user, password))?;
    Ok(path)
}
