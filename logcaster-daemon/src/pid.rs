//! PID file management.
//!
//! Prevents duplicate daemon instances and gives operators a stable
//! handle for signalling the running process.

use std::path::Path;

use anyhow::Result;

/// Write the current process PID to a file.
///
/// # Security
///
/// - Uses `create_new(true)` to atomically create file (prevents TOCTOU races)
/// - Verifies the created file is a regular file (prevents symlink attacks)
/// - Creates parent directory with restrictive permissions (0o700)
///
/// # Stale files
///
/// If the file already exists, the recorded PID is probed with signal 0.
/// A file left behind by a crashed instance (dead or unparseable PID) is
/// removed and creation is retried once.
///
/// # Errors
///
/// Returns an error if the recorded PID belongs to a live process or the
/// file cannot be written.
pub fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};

    if let Some(parent) = path.parent() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            let mut builder = fs::DirBuilder::new();
            builder.mode(0o700).recursive(true);
            builder.create(parent)?;
        }
        #[cfg(not(unix))]
        {
            fs::create_dir_all(parent)?;
        }
    }

    let pid = std::process::id();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            remove_stale_pid_file(path)?;
            OpenOptions::new().write(true).create_new(true).open(path)?
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata()?;
    if !metadata.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file (possible symlink attack)",
            path.display()
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        file.set_permissions(permissions)?;
    }

    writeln!(file, "{}", pid)?;

    tracing::info!(pid = pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove an existing PID file if its recorded process is gone.
///
/// Errors if the recorded PID belongs to a live process.
fn remove_stale_pid_file(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let recorded = content.trim();

    if let Ok(existing_pid) = recorded.parse::<u32>()
        && is_process_alive(existing_pid)
    {
        return Err(anyhow::anyhow!(
            "PID file {} already exists with PID: {}. Is another instance running?",
            path.display(),
            existing_pid
        ));
    }

    tracing::warn!(
        path = %path.display(),
        recorded = recorded,
        "removing stale PID file from a previous instance"
    );
    std::fs::remove_file(path)?;
    Ok(())
}

/// Check if a process with the given PID is alive.
#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use std::io::ErrorKind;

    // Send signal 0 to check if process exists
    // SAFETY: kill(2) with signal 0 is safe and does not affect the target process
    let result = unsafe { libc::kill(pid as libc::pid_t, 0) };

    if result == 0 {
        true
    } else {
        let err = std::io::Error::last_os_error();
        match err.kind() {
            ErrorKind::PermissionDenied => true, // Process exists but we can't signal it
            _ => false,
        }
    }
}

// Liveness cannot be probed here; treat any existing file as owned by a
// live instance.
#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}

/// Remove the PID file on daemon shutdown.
///
/// Logs a warning but does not fail if the file cannot be removed.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove PID file"
        );
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}
