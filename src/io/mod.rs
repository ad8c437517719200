// Filesystem plumbing shared by the wipe executors:
// write-through opens, delete-on-close fill files, disk-full
// classification and volume free-space lookup.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use sysinfo::Disks;
use uuid::Uuid;


/// Prefix for the temporary fill files written during free-space wipes
pub const FILL_FILE_PREFIX: &str = ".vanish-fill-";

#[cfg(unix)]
const DISK_FULL_CODES: [i32; 1] = [libc::ENOSPC];

// ERROR_DISK_FULL (112) and ERROR_HANDLE_DISK_FULL (39)
#[cfg(windows)]
const DISK_FULL_CODES: [i32; 2] = [112, 39];

/// Open an existing file for overwriting.
///
/// With `write_through` the handle bypasses OS write caching (O_SYNC on
/// unix, FILE_FLAG_WRITE_THROUGH on Windows) so each pass reaches stable
/// storage before the next one starts.
pub fn open_for_wipe(path: &Path, write_through: bool) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true);

    #[cfg(unix)]
    if write_through {
        use std::os::unix::fs::OpenOptionsExt;
        opts.custom_flags(libc::O_SYNC);
    }

    #[cfg(windows)]
    if write_through {
        use std::os::windows::fs::OpenOptionsExt;
        opts.custom_flags(winapi::um::winbase::FILE_FLAG_WRITE_THROUGH);
    }

    opts.open(path)
}

/// Create the temporary fill file used for free-space wiping.
///
/// The file vanishes as soon as the handle closes, even if the process
/// dies mid-wipe: on unix it is unlinked right after creation, on
/// Windows it is opened with FILE_FLAG_DELETE_ON_CLOSE.
#[cfg(unix)]
pub fn create_fill_file(dir: &Path, write_through: bool) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    let path = dir.join(format!("{}{}", FILL_FILE_PREFIX, random_name()));
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    if write_through {
        opts.custom_flags(libc::O_SYNC);
    }
    let file = opts.open(&path)?;
    std::fs::remove_file(&path)?;
    Ok(file)
}

#[cfg(windows)]
pub fn create_fill_file(dir: &Path, write_through: bool) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    use winapi::um::winbase::{FILE_FLAG_DELETE_ON_CLOSE, FILE_FLAG_WRITE_THROUGH};
    use winapi::um::winnt::FILE_ATTRIBUTE_TEMPORARY;

    let path = dir.join(format!("{}{}", FILL_FILE_PREFIX, random_name()));
    let mut flags = FILE_FLAG_DELETE_ON_CLOSE;
    if write_through {
        flags |= FILE_FLAG_WRITE_THROUGH;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .custom_flags(flags)
        .attributes(FILE_ATTRIBUTE_TEMPORARY)
        .open(&path)
}

/// Whether an I/O error means the volume ran out of space
pub fn is_disk_full(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::StorageFull {
        return true;
    }
    err.raw_os_error()
        .map(|code| DISK_FULL_CODES.contains(&code))
        .unwrap_or(false)
}

/// Drop the read-only attribute so the overwrite pass can open the file
pub fn clear_readonly(path: &Path) -> io::Result<()> {
    let metadata = std::fs::metadata(path)?;
    let mut perms = metadata.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Free bytes on the volume containing `path`.
///
/// Matches the longest mount point that prefixes the canonical path, so
/// nested mounts resolve to the innermost volume.
pub fn volume_free_space(path: &Path) -> io::Result<u64> {
    let canonical = path.canonicalize()?;
    let disks = Disks::new_with_refreshed_list();

    let mut best: Option<(usize, u64)> = None;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if canonical.starts_with(mount) {
            let depth = mount.as_os_str().len();
            if best.is_none_or(|(d, _)| depth > d) {
                best = Some((depth, disk.available_space()));
            }
        }
    }

    best.map(|(_, space)| space).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no mounted volume contains {}", canonical.display()),
        )
    })
}

/// Random hex name for fill files and pre-delete renames
pub fn random_name() -> String {
    Uuid::new_v4().simple().to_string()
}
