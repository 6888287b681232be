use std::path::{Path, PathBuf};

pub const WAYPOINT_ROOT_ENV: &str = "WAYPOINT_ROOT";
pub const WAYPOINT_DB_PATH_ENV: &str = "WAYPOINT_DB_PATH";

pub fn default_root(home: &Path) -> PathBuf {
    home.join(".waypoint")
}

pub fn sqlite_path(waypoint_root: &Path) -> PathBuf {
    waypoint_root.join("waypoint.db")
}
