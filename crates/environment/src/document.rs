use crate::{Error, Result};

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

static ENV_TEMPLATE: &str = include_str!("../templates/ovn.env");

const ENV_FILE_MODE: u32 = 0o644;

const INITIAL_NB: &str = "OVN_INITIAL_NB";
const INITIAL_SB: &str = "OVN_INITIAL_SB";
const NB_CONNECT: &str = "OVN_NB_CONNECT";
const SB_CONNECT: &str = "OVN_SB_CONNECT";
const LOCAL_IP: &str = "OVN_LOCAL_IP";

/// The generated environment consumed by the local OVN daemons.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnvironmentDocument {
    /// Address of the first registered Northbound member, bracketed if IPv6.
    pub initial_nb: String,

    /// Address of the first registered Southbound member, bracketed if IPv6.
    pub initial_sb: String,

    /// Comma-joined Northbound endpoints.
    pub nb_connect: String,

    /// Comma-joined Southbound endpoints.
    pub sb_connect: String,

    /// This node's address, bracketed if IPv6.
    pub local_ip: String,
}

impl EnvironmentDocument {
    /// Renders the document as file contents.
    #[must_use]
    pub fn render(&self) -> String {
        ENV_TEMPLATE
            .replace("{initial_nb}", &self.initial_nb)
            .replace("{initial_sb}", &self.initial_sb)
            .replace("{nb_connect}", &self.nb_connect)
            .replace("{sb_connect}", &self.sb_connect)
            .replace("{local_ip}", &self.local_ip)
    }

    /// Parses rendered file contents. Blank lines, comments and unknown keys
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is not `KEY=value` or a key is missing.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut initial_nb = None;
        let mut initial_sb = None;
        let mut nb_connect = None;
        let mut sb_connect = None;
        let mut local_ip = None;

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::MalformedLine(line.to_string()))?;
            let value = unquote(value.trim()).to_string();

            match key.trim() {
                INITIAL_NB => initial_nb = Some(value),
                INITIAL_SB => initial_sb = Some(value),
                NB_CONNECT => nb_connect = Some(value),
                SB_CONNECT => sb_connect = Some(value),
                LOCAL_IP => local_ip = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            initial_nb: initial_nb.ok_or(Error::MissingKey(INITIAL_NB))?,
            initial_sb: initial_sb.ok_or(Error::MissingKey(INITIAL_SB))?,
            nb_connect: nb_connect.ok_or(Error::MissingKey(NB_CONNECT))?,
            sb_connect: sb_connect.ok_or(Error::MissingKey(SB_CONNECT))?,
            local_ip: local_ip.ok_or(Error::MissingKey(LOCAL_IP))?,
        })
    }

    /// Reads and parses the environment file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| Error::Io("failed to read environment file", e))?;

        Self::parse(&contents)
    }

    /// Writes the document to `path`, replacing any previous file only once
    /// the new contents are fully on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, the temporary file or the rename
    /// fails. The previous file is left untouched in every case.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.render();

        let parent = path
            .parent()
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Io("failed to create environment directory", e))?;

        let tmp_path = temp_sibling(path)?;
        if let Err(e) = write_new_file(&tmp_path, contents.as_bytes()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(Error::Io("failed to replace environment file", e));
        }

        debug!("wrote {}", path.display());

        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

async fn write_new_file(path: &Path, contents: &[u8]) -> Result<()> {
    // A stale file from an interrupted write is discarded.
    match fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            return Err(Error::Io("failed to remove stale temporary file", e));
        }
        _ => {}
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(ENV_FILE_MODE)
        .open(path)
        .await
        .map_err(|e| Error::Io("failed to create temporary environment file", e))?;

    file.write_all(contents)
        .await
        .map_err(|e| Error::Io("failed to write temporary environment file", e))?;
    file.sync_all()
        .await
        .map_err(|e| Error::Io("failed to sync temporary environment file", e))?;

    // Not subject to the umask.
    fs::set_permissions(path, std::fs::Permissions::from_mode(ENV_FILE_MODE))
        .await
        .map_err(|e| Error::Io("failed to set environment file permissions", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn document() -> EnvironmentDocument {
        EnvironmentDocument {
            initial_nb: "[2001:db8::1]".to_string(),
            initial_sb: "[2001:db8::1]".to_string(),
            nb_connect: "ssl:[2001:db8::1]:6641,ssl:10.0.0.2:6641".to_string(),
            sb_connect: "ssl:[2001:db8::1]:6642,ssl:10.0.0.2:6642".to_string(),
            local_ip: "10.0.0.2".to_string(),
        }
    }

    #[test]
    fn test_render_layout() {
        let rendered = document().render();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(
            lines,
            vec![
                "# Generated by ovn-node, DO NOT EDIT.",
                "OVN_INITIAL_NB=\"[2001:db8::1]\"",
                "OVN_INITIAL_SB=\"[2001:db8::1]\"",
                "OVN_NB_CONNECT=\"ssl:[2001:db8::1]:6641,ssl:10.0.0.2:6641\"",
                "OVN_SB_CONNECT=\"ssl:[2001:db8::1]:6642,ssl:10.0.0.2:6642\"",
                "OVN_LOCAL_IP=\"10.0.0.2\"",
            ]
        );
    }

    #[test]
    fn test_parse_reads_back_rendered_document() {
        assert_eq!(
            EnvironmentDocument::parse(&document().render()).unwrap(),
            document()
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_documents() {
        assert!(matches!(
            EnvironmentDocument::parse("OVN_INITIAL_NB=\"10.0.0.1\"\n"),
            Err(Error::MissingKey(INITIAL_SB))
        ));
        assert!(matches!(
            EnvironmentDocument::parse("not an assignment"),
            Err(Error::MalformedLine(_))
        ));
    }

    #[tokio::test]
    async fn test_write_replaces_file_with_fixed_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("ovn.env");

        EnvironmentDocument::default().write_to(&path).await.unwrap();
        document().write_to(&path).await.unwrap();

        assert_eq!(
            EnvironmentDocument::read_from(&path).await.unwrap(),
            document()
        );

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, ENV_FILE_MODE);

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("ovn.env")]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ovn.env");
        document().write_to(&path).await.unwrap();

        // A directory in the way of the temporary file.
        std::fs::create_dir(dir.path().join(".ovn.env.tmp")).unwrap();

        assert!(
            EnvironmentDocument::default()
                .write_to(&path)
                .await
                .is_err()
        );
        assert_eq!(
            EnvironmentDocument::read_from(&path).await.unwrap(),
            document()
        );
    }
}
