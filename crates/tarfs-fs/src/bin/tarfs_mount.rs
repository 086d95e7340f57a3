//! tarfs-mount: mount a (optionally compressed) tar archive via FUSE.
//!
//! The archive is exposed as a read-only directory tree without being
//! extracted to disk.
//!
//! # Usage
//!
//! ```bash
//! # Mounts at ./backup (derived from the archive name)
//! tarfs-mount backup.tar.gz --create-missing-mount
//!
//! # Explicit mount point
//! tarfs-mount backup.tar.gz --mountpoint /mnt/backup
//! ```

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use tarfs_format::TarArchive;
use tarfs_fs::fuse::{self, TarFuseFS};
use tarfs_fs::resolve_mount_point;

/// Mount a tar archive as a read-only filesystem.
///
/// Supports plain tar plus gzip/bzip2/xz compression, detected from the
/// archive filename suffix.
#[derive(Parser, Debug)]
#[command(name = "tarfs-mount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the tar archive (optionally .gz/.bz2/.xz compressed)
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Where to mount the filesystem (default: archive path minus extension)
    #[arg(short, long)]
    mountpoint: Option<PathBuf>,

    /// Create the mount point if it does not exist
    #[arg(long)]
    create_missing_mount: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable FUSE-level debug output
    #[arg(long)]
    debug_fuse: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    // Validate archive path
    if !args.archive.is_file() {
        error!("Archive not found: {}", args.archive.display());
        process::exit(1);
    }

    let mount_point = match resolve_mount_point(
        &args.archive,
        args.mountpoint.as_deref(),
        args.create_missing_mount,
    ) {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // Open and index the archive; any failure here aborts the mount.
    info!("Opening archive: {}", args.archive.display());
    let archive = match TarArchive::open(&args.archive) {
        Ok(a) => a,
        Err(e) => {
            error!("Failed to open archive: {}", e);
            process::exit(1);
        }
    };
    info!("Compression: {:?}", archive.compression());

    let fs = match TarFuseFS::new(archive) {
        Ok(fs) => fs,
        Err(e) => {
            error!("Failed to index archive: {}", e);
            process::exit(1);
        }
    };
    info!("Members: {}", fs.member_count());

    info!("Mounting at {}", mount_point.display());
    if let Err(e) = fuse::mount(fs, &mount_point, args.debug_fuse) {
        error!("Mount error: {}", e);
        process::exit(1);
    }
}
